use crate::game::{Board, Mark};

/// Universal interface for computer opponents.
pub trait Agent {
    /// Pick an empty cell for `mark` to play on `board`.
    /// Returns `None` only when the board has no empty cell.
    fn select_move(&mut self, board: &Board, mark: Mark) -> Option<usize>;

    /// Return the agent's display name.
    fn name(&self) -> &str;
}
