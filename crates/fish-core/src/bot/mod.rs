mod policy;

pub use policy::{Ask, AskPolicy, PolicyContext, RandomAskPolicy, ScriptedAskPolicy};
