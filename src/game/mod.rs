//! Core game logic: the 4x4 board, marks, the catalog of winning lines, and
//! the move/status state machine.

mod board;
mod lines;
mod mark;
mod state;

pub use board::{Board, Cell, CELLS, SIZE};
pub use lines::{find_winning_line, Line, LINES};
pub use mark::Mark;
pub use state::{GameState, GameStatus};
