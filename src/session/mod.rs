//! Game session: turn order, mode, the delayed computer reply, and the
//! interface a front-end drives the game through.

mod events;
mod game_session;
mod mode;
mod schedule;

pub use events::{Actor, SessionEvent};
pub use game_session::{GameController, GameSession, SessionConfig, SessionSnapshot};
pub use mode::GameMode;
pub use schedule::ScheduledMove;
