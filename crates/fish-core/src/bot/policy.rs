use crate::model::hand::Hand;
use crate::model::player::Seat;
use crate::model::rank::Rank;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{Level, event};

/// A target + rank pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ask {
    pub target: Seat,
    pub rank: Rank,
}

/// Read-only view handed to a policy for one decision.
#[derive(Debug, Clone)]
pub struct PolicyContext<'a> {
    pub seat: Seat,
    pub hand: &'a Hand,
    /// Other participants currently holding at least one card.
    pub targets: Vec<Seat>,
}

impl PolicyContext<'_> {
    pub fn valid_ranks(&self) -> Vec<Rank> {
        self.hand.valid_ranks()
    }

    pub fn has_legal_ask(&self) -> bool {
        !self.targets.is_empty() && !self.hand.is_empty()
    }
}

/// Chooses a bot's ask. Returning `None` means the bot has no legal ask and
/// its turn is skipped.
pub trait AskPolicy: Send {
    fn choose_ask(&mut self, ctx: &PolicyContext<'_>, rng: &mut StdRng) -> Option<Ask>;
}

/// Uniform over valid targets, then uniform over held ranks.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomAskPolicy;

impl AskPolicy for RandomAskPolicy {
    fn choose_ask(&mut self, ctx: &PolicyContext<'_>, rng: &mut StdRng) -> Option<Ask> {
        let ranks = ctx.valid_ranks();
        let target = *ctx.targets.choose(rng)?;
        let rank = *ranks.choose(rng)?;
        let ask = Ask { target, rank };
        log_ask_decision(ctx, &ranks, ask);
        Some(ask)
    }
}

/// Replays a fixed list of asks, then falls back to random choices.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAskPolicy {
    script: Vec<Ask>,
    cursor: usize,
}

impl ScriptedAskPolicy {
    pub fn new(script: Vec<Ask>) -> Self {
        Self { script, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.script.len().saturating_sub(self.cursor)
    }
}

impl AskPolicy for ScriptedAskPolicy {
    fn choose_ask(&mut self, ctx: &PolicyContext<'_>, rng: &mut StdRng) -> Option<Ask> {
        if let Some(ask) = self.script.get(self.cursor).copied() {
            self.cursor += 1;
            return Some(ask);
        }
        RandomAskPolicy.choose_ask(ctx, rng)
    }
}

fn log_ask_decision(ctx: &PolicyContext<'_>, ranks: &[Rank], ask: Ask) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    let rank_preview = ranks
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(",");

    event!(
        target: "fish_core::bot",
        Level::DEBUG,
        seat = %ctx.seat,
        hand_size = ctx.hand.len(),
        targets = ctx.targets.len(),
        ranks = %rank_preview,
        chosen_target = %ask.target,
        chosen_rank = %ask.rank,
    );
}
