use crate::game::turn_order::TurnOrder;
use crate::model::card::Card;
use crate::model::player::{PLAYER_COUNT, Seat};
use crate::model::rank::Rank;
use serde::Serialize;

/// Receives engine notifications. Every hook defaults to a no-op so hosts
/// only implement what they present.
pub trait GameListener {
    fn on_round_started(&mut self, _round: u8, _order: &TurnOrder) {}

    /// Once per card of the initial deal.
    fn on_card_dealt(&mut self, _seat: Seat, _card: Card) {}

    /// A card drawn after a failed ask or to refill an empty hand.
    fn on_card_drawn(&mut self, _seat: Seat, _card: Card) {}

    fn on_ask_resolved(
        &mut self,
        _asker: Seat,
        _target: Seat,
        _rank: Rank,
        _success: bool,
        _transferred: usize,
    ) {
    }

    /// The engine stays paused until the event is acknowledged.
    fn on_set_scored(&mut self, _seat: Seat, _rank: Rank) {}

    fn on_scores_changed(&mut self, _human: u32, _bots: [u32; 3]) {}

    fn on_deck_exhausted(&mut self) {}

    fn on_turn_skipped(&mut self, _seat: Seat) {}

    fn on_round_over(&mut self, _round: u8) {}

    fn on_game_over(&mut self, _winners: &[String], _final_scores: &[u32; PLAYER_COUNT]) {}
}

impl GameListener for () {}

impl<L: GameListener + ?Sized> GameListener for &mut L {
    fn on_round_started(&mut self, round: u8, order: &TurnOrder) {
        (**self).on_round_started(round, order);
    }

    fn on_card_dealt(&mut self, seat: Seat, card: Card) {
        (**self).on_card_dealt(seat, card);
    }

    fn on_card_drawn(&mut self, seat: Seat, card: Card) {
        (**self).on_card_drawn(seat, card);
    }

    fn on_ask_resolved(
        &mut self,
        asker: Seat,
        target: Seat,
        rank: Rank,
        success: bool,
        transferred: usize,
    ) {
        (**self).on_ask_resolved(asker, target, rank, success, transferred);
    }

    fn on_set_scored(&mut self, seat: Seat, rank: Rank) {
        (**self).on_set_scored(seat, rank);
    }

    fn on_scores_changed(&mut self, human: u32, bots: [u32; 3]) {
        (**self).on_scores_changed(human, bots);
    }

    fn on_deck_exhausted(&mut self) {
        (**self).on_deck_exhausted();
    }

    fn on_turn_skipped(&mut self, seat: Seat) {
        (**self).on_turn_skipped(seat);
    }

    fn on_round_over(&mut self, round: u8) {
        (**self).on_round_over(round);
    }

    fn on_game_over(&mut self, winners: &[String], final_scores: &[u32; PLAYER_COUNT]) {
        (**self).on_game_over(winners, final_scores);
    }
}

/// Typed form of the listener callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    RoundStarted {
        round: u8,
        order: TurnOrder,
    },
    CardDealt {
        seat: Seat,
        card: Card,
    },
    CardDrawn {
        seat: Seat,
        card: Card,
    },
    AskResolved {
        asker: Seat,
        target: Seat,
        rank: Rank,
        success: bool,
        transferred: usize,
    },
    SetScored {
        seat: Seat,
        rank: Rank,
    },
    ScoresChanged {
        human: u32,
        bots: [u32; 3],
    },
    DeckExhausted,
    TurnSkipped {
        seat: Seat,
    },
    RoundOver {
        round: u8,
    },
    GameOver {
        winners: Vec<String>,
        final_scores: [u32; PLAYER_COUNT],
    },
}

/// Listener that records every notification in order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn count_where(&self, predicate: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }

    pub fn last(&self) -> Option<&GameEvent> {
        self.events.last()
    }
}

impl GameListener for EventLog {
    fn on_round_started(&mut self, round: u8, order: &TurnOrder) {
        self.events.push(GameEvent::RoundStarted {
            round,
            order: *order,
        });
    }

    fn on_card_dealt(&mut self, seat: Seat, card: Card) {
        self.events.push(GameEvent::CardDealt { seat, card });
    }

    fn on_card_drawn(&mut self, seat: Seat, card: Card) {
        self.events.push(GameEvent::CardDrawn { seat, card });
    }

    fn on_ask_resolved(
        &mut self,
        asker: Seat,
        target: Seat,
        rank: Rank,
        success: bool,
        transferred: usize,
    ) {
        self.events.push(GameEvent::AskResolved {
            asker,
            target,
            rank,
            success,
            transferred,
        });
    }

    fn on_set_scored(&mut self, seat: Seat, rank: Rank) {
        self.events.push(GameEvent::SetScored { seat, rank });
    }

    fn on_scores_changed(&mut self, human: u32, bots: [u32; 3]) {
        self.events.push(GameEvent::ScoresChanged { human, bots });
    }

    fn on_deck_exhausted(&mut self) {
        self.events.push(GameEvent::DeckExhausted);
    }

    fn on_turn_skipped(&mut self, seat: Seat) {
        self.events.push(GameEvent::TurnSkipped { seat });
    }

    fn on_round_over(&mut self, round: u8) {
        self.events.push(GameEvent::RoundOver { round });
    }

    fn on_game_over(&mut self, winners: &[String], final_scores: &[u32; PLAYER_COUNT]) {
        self.events.push(GameEvent::GameOver {
            winners: winners.to_vec(),
            final_scores: *final_scores,
        });
    }
}
