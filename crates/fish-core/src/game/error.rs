use crate::model::hand::HandError;
use crate::model::player::Seat;
use crate::model::rank::Rank;
use thiserror::Error;

/// Why an ask was refused. Refused asks never touch engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalAsk {
    #[error("{asker} cannot ask themselves")]
    TargetIsSelf { asker: Seat },
    #[error("{target} has no cards to ask for")]
    EmptyTargetHand { target: Seat },
    #[error("{asker} holds no {rank} to ask for")]
    RankNotHeld { asker: Seat, rank: Rank },
}

/// What the engine is waiting on when it refuses an inbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suspension {
    NotStarted,
    ScorePending,
    HumanToAct,
    BotToAct(Seat),
    RoundInProgress,
    RoundOver,
    GameOver,
}

impl core::fmt::Display for Suspension {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Suspension::NotStarted => f.write_str("the game has not started"),
            Suspension::ScorePending => f.write_str("a scored set awaits acknowledgement"),
            Suspension::HumanToAct => f.write_str("it is the human's turn"),
            Suspension::BotToAct(seat) => write!(f, "it is {seat}'s turn"),
            Suspension::RoundInProgress => f.write_str("the round is still in progress"),
            Suspension::RoundOver => f.write_str("the round is over"),
            Suspension::GameOver => f.write_str("the game is over"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("illegal ask: {0}")]
    IllegalAsk(#[from] IllegalAsk),
    /// Set bookkeeping fell out of sync with the hands. Not recoverable.
    #[error(transparent)]
    Hand(#[from] HandError),
    #[error("action rejected: {0}")]
    ActionWhileSuspended(Suspension),
}
