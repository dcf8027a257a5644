pub mod engine;
pub mod error;
pub mod listener;
pub mod summary;
pub mod turn_order;

pub use engine::{AskOutcome, Engine, INITIAL_HAND_SIZE, Phase, SETS_PER_ROUND, ScoreEvent};
pub use error::{EngineError, IllegalAsk, Suspension};
pub use listener::{EventLog, GameEvent, GameListener};
pub use summary::{GameSummary, ParticipantScore};
pub use turn_order::{ROUNDS, TurnOrder};
