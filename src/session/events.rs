use std::time::Duration;

use super::GameMode;
use crate::error::MoveError;
use crate::game::{GameStatus, Mark};

/// Who made a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Human,
    Computer,
}

/// State-change notifications sent from the session to its subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    MovePlayed {
        index: usize,
        mark: Mark,
        actor: Actor,
    },
    MoveRejected {
        index: usize,
        error: MoveError,
    },
    /// The computer will reply after `delay`.
    ComputerScheduled {
        delay: Duration,
    },
    /// A pending computer reply was dropped by a reset or mode change.
    ComputerCancelled,
    GameOver(GameStatus),
    Reset {
        mode: GameMode,
    },
}
