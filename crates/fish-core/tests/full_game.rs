use fish_core::bot::{AskPolicy, RandomAskPolicy};
use fish_core::game::{
    AskOutcome, Engine, EventLog, GameEvent, GameListener, Phase, ROUNDS, SETS_PER_ROUND,
    TurnOrder,
};
use fish_core::model::deck::DECK_SIZE;
use fish_core::model::hand::SET_SIZE;
use fish_core::model::player::Seat;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;

const STEP_LIMIT: usize = 200_000;

fn assert_cards_conserved<L: GameListener>(engine: &Engine<L>) {
    let mut seen = HashSet::new();
    let mut count = engine.deck().len();
    seen.extend(engine.deck().cards().iter().copied());
    for seat in Seat::LOOP {
        count += engine.hand(seat).len();
        seen.extend(engine.hand(seat).iter().copied());
    }
    for (_, set) in engine.scored_sets() {
        count += SET_SIZE;
        seen.extend(set.iter().copied());
    }
    assert_eq!(count, DECK_SIZE, "card count drifted");
    assert_eq!(seen.len(), DECK_SIZE, "duplicate card in play");
    assert_eq!(
        usize::from(engine.points_this_round()),
        engine.scored_sets().len()
    );
}

/// Checks where the turn went after a resolved ask. Skips are excluded since
/// they legitimately move the turn further.
fn assert_turn_rule(before: usize, outcome: &AskOutcome, engine: &Engine<EventLog>, skips: usize) {
    if skips > 0 || engine.is_round_over() {
        return;
    }
    if outcome.success {
        assert_eq!(engine.current_index(), before, "success must keep the turn");
    } else {
        assert_eq!(
            engine.current_index(),
            TurnOrder::next_index(before),
            "a miss passes the turn"
        );
    }
}

fn skips_in(log: &EventLog, from: usize) -> usize {
    log.events()[from..]
        .iter()
        .filter(|e| matches!(e, GameEvent::TurnSkipped { .. }))
        .count()
}

/// Plays a whole game, answering for the human with random legal asks.
fn play_out(engine: &mut Engine<EventLog>, human_seed: u64) {
    let mut human_rng = StdRng::seed_from_u64(human_seed);
    let mut human = RandomAskPolicy;
    let mut last_points = 0;
    engine.start_game().expect("start");

    for _ in 0..STEP_LIMIT {
        assert_cards_conserved(engine);
        assert!(engine.points_this_round() <= SETS_PER_ROUND);
        assert!(engine.points_this_round() >= last_points);
        last_points = engine.points_this_round();

        let before = engine.current_index();
        let mark = engine.listener().len();
        match engine.phase() {
            Phase::ScorePending => {
                engine.acknowledge_score_event().expect("ack");
            }
            Phase::AwaitingAction if engine.current_seat().is_human() => {
                let ask = {
                    let ctx = engine.ask_context(Seat::Human);
                    human.choose_ask(&ctx, &mut human_rng)
                }
                .expect("human has a legal ask on their turn");
                let outcome = engine.human_ask(ask.target, ask.rank).expect("legal ask");
                let skips = skips_in(engine.listener(), mark);
                assert_turn_rule(before, &outcome, engine, skips);
            }
            Phase::AwaitingAction => {
                if let Some(outcome) = engine.bot_take_turn().expect("bot turn") {
                    let skips = skips_in(engine.listener(), mark);
                    assert_turn_rule(before, &outcome, engine, skips);
                }
            }
            Phase::RoundOver => {
                assert_eq!(engine.points_this_round(), SETS_PER_ROUND);
                engine.advance_to_next_round().expect("next round");
                last_points = 0;
            }
            Phase::GameOver => return,
            Phase::NotStarted => panic!("engine fell back to NotStarted"),
        }
    }
    panic!("game did not finish within {STEP_LIMIT} steps");
}

#[test]
fn seeded_game_runs_to_completion() {
    let mut engine = Engine::with_seed(EventLog::new(), 2024);
    play_out(&mut engine, 7);

    assert!(engine.is_game_over());
    assert_eq!(engine.round_number(), ROUNDS);
    let total: u32 = engine.scores().iter().sum();
    assert_eq!(total, u32::from(SETS_PER_ROUND) * u32::from(ROUNDS));

    let summary = engine.summary();
    assert!(summary.finished);
    assert!(!summary.winners.is_empty());
    let best = engine.scores().into_iter().max().unwrap_or_default();
    for winner in engine.winners() {
        assert_eq!(engine.participant(winner).score(), best);
    }

    match engine.listener().last() {
        Some(GameEvent::GameOver {
            winners,
            final_scores,
        }) => {
            assert_eq!(winners, &summary.winners);
            assert_eq!(final_scores, &engine.scores());
        }
        other => panic!("expected game over last, got {other:?}"),
    }
}

#[test]
fn every_round_follows_its_rotation() {
    let mut engine = Engine::with_seed(EventLog::new(), 99);
    play_out(&mut engine, 3);

    let starts: Vec<(u8, TurnOrder)> = engine
        .listener()
        .events()
        .iter()
        .filter_map(|e| match e {
            GameEvent::RoundStarted { round, order } => Some((*round, *order)),
            _ => None,
        })
        .collect();
    assert_eq!(starts.len(), usize::from(ROUNDS));
    for (expected_round, (round, order)) in (1..=ROUNDS).zip(starts) {
        assert_eq!(round, expected_round);
        assert_eq!(Some(order), TurnOrder::for_round(round));
    }

    let first_movers: Vec<Seat> = (1..=ROUNDS)
        .filter_map(TurnOrder::for_round)
        .map(|order| order.first())
        .collect();
    assert_eq!(
        first_movers,
        vec![Seat::Human, Seat::BotA, Seat::BotB, Seat::BotC]
    );

    let round_overs = engine
        .listener()
        .count_where(|e| matches!(e, GameEvent::RoundOver { .. }));
    assert_eq!(round_overs, usize::from(ROUNDS));
    let exhausted = engine
        .listener()
        .count_where(|e| matches!(e, GameEvent::DeckExhausted));
    assert!(exhausted <= usize::from(ROUNDS));
}

#[test]
fn same_seeds_replay_identically() {
    let mut first = Engine::with_seed(EventLog::new(), 31337);
    let mut second = Engine::with_seed(EventLog::new(), 31337);
    play_out(&mut first, 12);
    play_out(&mut second, 12);

    assert_eq!(first.scores(), second.scores());
    assert_eq!(first.listener().events(), second.listener().events());
}

#[test]
fn finished_game_rejects_further_play() {
    let mut engine = Engine::with_seed(EventLog::new(), 8);
    play_out(&mut engine, 8);

    assert!(engine.advance_to_next_round().is_err());
    assert!(engine.bot_take_turn().is_err());
    assert!(engine.acknowledge_score_event().is_err());
    assert!(engine.human_ask(Seat::BotA, fish_core::model::rank::Rank::Ace).is_err());
    assert_eq!(engine.round_number(), ROUNDS);

    engine.start_game().expect("restart");
    assert_eq!(engine.round_number(), 1);
    assert_eq!(engine.scores(), [0; 4]);
}
