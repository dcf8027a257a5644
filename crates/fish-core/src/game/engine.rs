use crate::bot::{Ask, AskPolicy, PolicyContext, RandomAskPolicy};
use crate::game::error::{EngineError, IllegalAsk, Suspension};
use crate::game::listener::GameListener;
use crate::game::summary::{GameSummary, leading_seats};
use crate::game::turn_order::{ROUNDS, TurnOrder};
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::{Hand, SET_SIZE};
use crate::model::player::{PLAYER_COUNT, Participant, Seat};
use crate::model::rank::Rank;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::array;
use std::collections::VecDeque;
use tracing::{Level, event};

pub const INITIAL_HAND_SIZE: usize = 5;
pub const SETS_PER_ROUND: u8 = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    /// Waiting for the current seat to ask: `human_ask` or `bot_take_turn`.
    AwaitingAction,
    /// A completed set is waiting for `acknowledge_score_event`.
    ScorePending,
    RoundOver,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreEvent {
    pub seat: Seat,
    pub rank: Rank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskOutcome {
    pub asker: Seat,
    pub target: Seat,
    pub rank: Rank,
    pub success: bool,
    pub transferred: usize,
    /// Card drawn from the deck after a failed ask, if any were left.
    pub drawn: Option<Card>,
    /// Ranks the asker completed as a result of this ask.
    pub completed: Vec<Rank>,
}

/// Turn and round state machine for one game session.
///
/// All mutation happens inside the inbound calls; between them the engine
/// is paused in one of the [`Phase`]s.
pub struct Engine<L: GameListener = ()> {
    participants: [Participant; PLAYER_COUNT],
    deck: Deck,
    round_number: u8,
    turn_order: TurnOrder,
    current_index: usize,
    points_this_round: u8,
    pending: VecDeque<ScoreEvent>,
    scored_sets: Vec<(Seat, [Card; SET_SIZE])>,
    phase: Phase,
    deck_exhausted: bool,
    policy: Box<dyn AskPolicy>,
    rng: StdRng,
    seed: u64,
    listener: L,
}

impl<L: GameListener> Engine<L> {
    pub fn new(listener: L) -> Self {
        let seed: u64 = rand::random();
        Self::with_seed(listener, seed)
    }

    pub fn with_seed(listener: L, seed: u64) -> Self {
        Self {
            participants: array::from_fn(|i| {
                let seat = Seat::LOOP[i];
                Participant::new(seat, seat.default_name())
            }),
            deck: Deck::new(),
            round_number: 1,
            turn_order: TurnOrder::for_round(1).expect("round one has an order"),
            current_index: 0,
            points_this_round: 0,
            pending: VecDeque::new(),
            scored_sets: Vec::new(),
            phase: Phase::NotStarted,
            deck_exhausted: false,
            policy: Box::new(RandomAskPolicy),
            rng: StdRng::seed_from_u64(seed),
            seed,
            listener,
        }
    }

    /// Display names indexed by seat (Human, BotA, BotB, BotC).
    pub fn with_names(mut self, names: [String; PLAYER_COUNT]) -> Self {
        for (seat, name) in Seat::LOOP.into_iter().zip(names) {
            self.participants[seat.index()] = Participant::new(seat, name);
        }
        self
    }

    pub fn with_policy(mut self, policy: impl AskPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    // ---- inbound calls ----------------------------------------------------

    /// Resets scores and deals round one. Restarts a game in progress.
    pub fn start_game(&mut self) -> Result<(), EngineError> {
        if self.phase == Phase::ScorePending {
            return Err(EngineError::ActionWhileSuspended(Suspension::ScorePending));
        }
        for participant in &mut self.participants {
            participant.reset_score();
        }
        self.round_number = 1;
        self.notify_scores();
        let deck = Deck::shuffled(&mut self.rng);
        self.deal_round(deck);
        Ok(())
    }

    /// Deals the current round from a freshly shuffled deck. Only valid
    /// before the first round; later rounds go through
    /// [`advance_to_next_round`](Self::advance_to_next_round).
    pub fn setup_round(&mut self) -> Result<(), EngineError> {
        self.ensure_ready_for_setup()?;
        let deck = Deck::shuffled(&mut self.rng);
        self.deal_round(deck);
        Ok(())
    }

    /// Like [`setup_round`](Self::setup_round) but deals `deck` as given,
    /// without shuffling.
    pub fn setup_round_with_deck(&mut self, deck: Deck) -> Result<(), EngineError> {
        self.ensure_ready_for_setup()?;
        self.deal_round(deck);
        Ok(())
    }

    pub fn advance_to_next_round(&mut self) -> Result<(), EngineError> {
        if self.phase != Phase::RoundOver {
            return Err(EngineError::ActionWhileSuspended(self.suspension()));
        }
        self.round_number += 1;
        let deck = Deck::shuffled(&mut self.rng);
        self.deal_round(deck);
        Ok(())
    }

    pub fn human_ask(&mut self, target: Seat, rank: Rank) -> Result<AskOutcome, EngineError> {
        if self.phase != Phase::AwaitingAction {
            return Err(EngineError::ActionWhileSuspended(self.suspension()));
        }
        let asker = self.current_seat();
        if !asker.is_human() {
            return Err(EngineError::ActionWhileSuspended(Suspension::BotToAct(asker)));
        }
        self.resolve_ask(asker, Ask { target, rank })
    }

    /// Lets the current bot choose and resolve its ask. `Ok(None)` means the
    /// bot had no legal ask and its turn was skipped.
    pub fn bot_take_turn(&mut self) -> Result<Option<AskOutcome>, EngineError> {
        if self.phase != Phase::AwaitingAction {
            return Err(EngineError::ActionWhileSuspended(self.suspension()));
        }
        let asker = self.current_seat();
        if asker.is_human() {
            return Err(EngineError::ActionWhileSuspended(Suspension::HumanToAct));
        }

        let ctx = context_for(&self.participants, asker);
        let choice = self.policy.choose_ask(&ctx, &mut self.rng);
        match choice {
            Some(ask) => self.resolve_ask(asker, ask).map(Some),
            None => {
                self.skip_turn(asker);
                self.settle_turn();
                Ok(None)
            }
        }
    }

    /// Performs the deferred removal for the oldest pending set, credits the
    /// point and resumes play.
    pub fn acknowledge_score_event(&mut self) -> Result<ScoreEvent, EngineError> {
        let Some(scored) = self.pending.front().copied() else {
            return Err(EngineError::ActionWhileSuspended(self.suspension()));
        };
        let cards = self.participants[scored.seat.index()].award_set(scored.rank)?;
        self.pending.pop_front();
        self.scored_sets.push((scored.seat, cards));
        self.points_this_round += 1;

        event!(
            target: "fish_core::engine",
            Level::INFO,
            round = self.round_number,
            seat = %scored.seat,
            rank = %scored.rank,
            score = self.participants[scored.seat.index()].score(),
            points_this_round = self.points_this_round,
            "set collected"
        );

        self.notify_scores();
        self.after_action();
        Ok(scored)
    }

    // ---- queries ----------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round_number(&self) -> u8 {
        self.round_number
    }

    pub fn turn_order(&self) -> &TurnOrder {
        &self.turn_order
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_seat(&self) -> Seat {
        self.turn_order.seat_at(self.current_index)
    }

    pub fn points_this_round(&self) -> u8 {
        self.points_this_round
    }

    pub fn pending_score_event(&self) -> Option<ScoreEvent> {
        self.pending.front().copied()
    }

    pub fn pending_score_events(&self) -> impl Iterator<Item = &ScoreEvent> {
        self.pending.iter()
    }

    /// Sets removed from play this round, in the order they were collected.
    pub fn scored_sets(&self) -> &[(Seat, [Card; SET_SIZE])] {
        &self.scored_sets
    }

    pub fn participant(&self, seat: Seat) -> &Participant {
        &self.participants[seat.index()]
    }

    pub fn participants(&self) -> &[Participant; PLAYER_COUNT] {
        &self.participants
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        self.participants[seat.index()].hand()
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn scores(&self) -> [u32; PLAYER_COUNT] {
        array::from_fn(|i| self.participants[i].score())
    }

    pub fn is_round_over(&self) -> bool {
        matches!(self.phase, Phase::RoundOver | Phase::GameOver)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn winners(&self) -> Vec<Seat> {
        leading_seats(&self.participants)
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary::capture(self.round_number, self.is_game_over(), &self.participants)
    }

    /// The view a policy would get for `seat` right now.
    pub fn ask_context(&self, seat: Seat) -> PolicyContext<'_> {
        context_for(&self.participants, seat)
    }

    /// What the engine is currently waiting on.
    pub fn suspension(&self) -> Suspension {
        match self.phase {
            Phase::NotStarted => Suspension::NotStarted,
            Phase::ScorePending => Suspension::ScorePending,
            Phase::RoundOver => Suspension::RoundOver,
            Phase::GameOver => Suspension::GameOver,
            Phase::AwaitingAction => {
                let seat = self.current_seat();
                if seat.is_human() {
                    Suspension::HumanToAct
                } else {
                    Suspension::BotToAct(seat)
                }
            }
        }
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }

    // ---- internals --------------------------------------------------------

    fn ensure_ready_for_setup(&self) -> Result<(), EngineError> {
        match self.phase {
            Phase::NotStarted => Ok(()),
            Phase::AwaitingAction => Err(EngineError::ActionWhileSuspended(
                Suspension::RoundInProgress,
            )),
            _ => Err(EngineError::ActionWhileSuspended(self.suspension())),
        }
    }

    fn deal_round(&mut self, deck: Deck) {
        let order = TurnOrder::for_round(self.round_number).expect("round number within 1..=4");
        self.turn_order = order;
        self.current_index = 0;
        self.points_this_round = 0;
        self.pending.clear();
        self.scored_sets.clear();
        self.deck_exhausted = false;
        self.deck = deck;
        for participant in &mut self.participants {
            participant.hand_mut().clear();
        }

        self.listener.on_round_started(self.round_number, &order);

        'deal: for _ in 0..INITIAL_HAND_SIZE {
            for &seat in order.seats() {
                let Some(card) = self.draw_for(seat) else {
                    break 'deal;
                };
                self.listener.on_card_dealt(seat, card);
            }
        }

        event!(
            target: "fish_core::engine",
            Level::INFO,
            round = self.round_number,
            order = %order,
            deck_remaining = self.deck.len(),
            "round dealt"
        );

        for &seat in order.seats() {
            self.queue_completed_sets(seat);
        }
        self.after_action();
    }

    fn resolve_ask(&mut self, asker: Seat, ask: Ask) -> Result<AskOutcome, EngineError> {
        self.validate_ask(asker, ask)?;
        let Ask { target, rank } = ask;

        let taken = self.participants[target.index()]
            .hand_mut()
            .take_all_of_rank(rank);
        let transferred = taken.len();
        let success = transferred > 0;
        let mut drawn = None;

        if success {
            self.participants[asker.index()].hand_mut().add_cards(taken);
        } else {
            drawn = self.draw_for(asker);
            if let Some(card) = drawn {
                self.listener.on_card_drawn(asker, card);
            }
            self.current_index = TurnOrder::next_index(self.current_index);
        }

        self.listener
            .on_ask_resolved(asker, target, rank, success, transferred);

        if tracing::enabled!(Level::DEBUG) {
            event!(
                target: "fish_core::engine",
                Level::DEBUG,
                round = self.round_number,
                asker = %asker,
                target = %target,
                rank = %rank,
                success,
                transferred,
                drew = drawn.is_some(),
                deck_remaining = self.deck.len(),
            );
        }

        let completed = self.queue_completed_sets(asker);
        self.after_action();

        Ok(AskOutcome {
            asker,
            target,
            rank,
            success,
            transferred,
            drawn,
            completed,
        })
    }

    fn validate_ask(&self, asker: Seat, ask: Ask) -> Result<(), IllegalAsk> {
        if !self.participants[asker.index()].hand().has_rank(ask.rank) {
            return Err(IllegalAsk::RankNotHeld {
                asker,
                rank: ask.rank,
            });
        }
        if ask.target == asker {
            return Err(IllegalAsk::TargetIsSelf { asker });
        }
        if self.participants[ask.target.index()].hand().is_empty() {
            return Err(IllegalAsk::EmptyTargetHand { target: ask.target });
        }
        Ok(())
    }

    /// Draws one card into `seat`'s hand and reports the deck running out the
    /// first time it happens in a round.
    fn draw_for(&mut self, seat: Seat) -> Option<Card> {
        let card = self.deck.draw().ok()?;
        self.participants[seat.index()].hand_mut().add_card(card);
        if self.deck.is_empty() && !self.deck_exhausted {
            self.deck_exhausted = true;
            event!(
                target: "fish_core::engine",
                Level::INFO,
                round = self.round_number,
                "deck exhausted"
            );
            self.listener.on_deck_exhausted();
        }
        Some(card)
    }

    /// Queues a score event for every completed rank in `seat`'s hand that is
    /// not already pending. Returns the newly queued ranks.
    fn queue_completed_sets(&mut self, seat: Seat) -> Vec<Rank> {
        let mut queued = Vec::new();
        for rank in self.participants[seat.index()].hand().detect_completed_sets() {
            let scored = ScoreEvent { seat, rank };
            if !self.pending.contains(&scored) {
                self.pending.push_back(scored);
                queued.push(rank);
            }
        }
        queued
    }

    fn after_action(&mut self) {
        if let Some(head) = self.pending.front().copied() {
            self.phase = Phase::ScorePending;
            self.listener.on_set_scored(head.seat, head.rank);
        } else if self.points_this_round >= SETS_PER_ROUND {
            self.finish_round();
        } else {
            self.phase = Phase::AwaitingAction;
            self.settle_turn();
        }
    }

    /// Moves the turn past seats that cannot ask. An empty hand is refilled
    /// from the deck first.
    fn settle_turn(&mut self) {
        for _ in 0..PLAYER_COUNT * 2 {
            let seat = self.current_seat();
            if self.participants[seat.index()].hand().is_empty() {
                if let Some(card) = self.draw_for(seat) {
                    self.listener.on_card_drawn(seat, card);
                }
            }
            if self.has_legal_ask(seat) {
                return;
            }
            self.skip_turn(seat);
        }
    }

    fn skip_turn(&mut self, seat: Seat) {
        event!(
            target: "fish_core::engine",
            Level::DEBUG,
            round = self.round_number,
            seat = %seat,
            "turn skipped"
        );
        self.listener.on_turn_skipped(seat);
        self.current_index = TurnOrder::next_index(self.current_index);
    }

    fn has_legal_ask(&self, seat: Seat) -> bool {
        !self.participants[seat.index()].hand().is_empty()
            && self
                .participants
                .iter()
                .any(|p| p.seat() != seat && !p.hand().is_empty())
    }

    fn finish_round(&mut self) {
        self.phase = Phase::RoundOver;
        event!(
            target: "fish_core::engine",
            Level::INFO,
            round = self.round_number,
            scores = ?self.scores(),
            "round over"
        );
        self.listener.on_round_over(self.round_number);

        if self.round_number >= ROUNDS {
            self.phase = Phase::GameOver;
            let summary = self.summary();
            event!(
                target: "fish_core::engine",
                Level::INFO,
                winners = %summary.winner_line(),
                "game over"
            );
            let scores = self.scores();
            self.listener.on_game_over(&summary.winners, &scores);
        }
    }

    fn notify_scores(&mut self) {
        let scores = self.scores();
        let bots = Seat::BOTS.map(|seat| scores[seat.index()]);
        self.listener.on_scores_changed(scores[Seat::Human.index()], bots);
    }
}

fn context_for(participants: &[Participant; PLAYER_COUNT], seat: Seat) -> PolicyContext<'_> {
    let targets = participants
        .iter()
        .filter(|p| p.seat() != seat && !p.hand().is_empty())
        .map(Participant::seat)
        .collect();
    PolicyContext {
        seat,
        hand: participants[seat.index()].hand(),
        targets,
    }
}

#[cfg(test)]
mod tests {
    use super::{Engine, INITIAL_HAND_SIZE, Phase};
    use crate::game::error::{EngineError, Suspension};
    use crate::game::listener::EventLog;
    use crate::model::deck::{DECK_SIZE, Deck};
    use crate::model::player::Seat;

    #[test]
    fn fresh_engine_waits_for_start() {
        let engine = Engine::with_seed((), 1);
        assert_eq!(engine.phase(), Phase::NotStarted);
        assert_eq!(engine.round_number(), 1);
        assert_eq!(engine.suspension(), Suspension::NotStarted);
    }

    #[test]
    fn setup_round_deals_five_each() {
        let mut engine = Engine::with_seed(EventLog::new(), 3);
        engine.setup_round().expect("setup");
        for seat in Seat::LOOP {
            let held = engine.hand(seat).len();
            // completed sets stay in hand until acknowledged
            assert_eq!(held, INITIAL_HAND_SIZE, "{seat}");
        }
        assert_eq!(engine.deck().len(), DECK_SIZE - 4 * INITIAL_HAND_SIZE);
        assert_eq!(engine.current_seat(), Seat::Human);
        assert_eq!(engine.points_this_round(), 0);
    }

    #[test]
    fn setup_round_twice_is_rejected() {
        let mut engine = Engine::with_seed((), 3);
        engine.setup_round_with_deck(Deck::new()).expect("setup");
        assert_eq!(
            engine.setup_round(),
            Err(EngineError::ActionWhileSuspended(Suspension::RoundInProgress))
        );
    }

    #[test]
    fn advance_before_round_over_is_rejected() {
        let mut engine = Engine::with_seed((), 3);
        engine.start_game().expect("start");
        assert!(matches!(
            engine.advance_to_next_round(),
            Err(EngineError::ActionWhileSuspended(_))
        ));
        assert_eq!(engine.round_number(), 1);
    }

    #[test]
    fn same_seed_deals_same_hands() {
        let mut a = Engine::with_seed((), 77);
        let mut b = Engine::with_seed((), 77);
        a.start_game().expect("start a");
        b.start_game().expect("start b");
        for seat in Seat::LOOP {
            assert_eq!(a.hand(seat), b.hand(seat));
        }
    }
}
