mod agent;
mod heuristic;
mod random;

pub use agent::Agent;
pub use heuristic::{completing_cell, AiConfig, HeuristicAgent, MoveReason, CENTER_CELLS};
pub use random::RandomAgent;
