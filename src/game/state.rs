use serde::{Deserialize, Serialize};

use super::{find_winning_line, Board, Line, Mark};
use crate::error::{InvalidMove, MoveError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Waiting for the given mark to move.
    InProgress(Mark),
    Won { mark: Mark, line: Line },
    Draw,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress(_))
    }

    /// The mark to move, if the game is still running.
    pub fn current_mark(&self) -> Option<Mark> {
        match self {
            GameStatus::InProgress(mark) => Some(*mark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    status: GameStatus,
}

impl GameState {
    /// Create initial game state
    pub fn initial() -> Self {
        GameState {
            board: Board::new(),
            status: GameStatus::InProgress(Mark::X), // X starts
        }
    }

    /// Get reference to board
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Get the mark to move, `None` once the game is over
    pub fn current_mark(&self) -> Option<Mark> {
        self.status.current_mark()
    }

    /// Check if game is over
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Get list of legal cells (empty, game running)
    pub fn legal_moves(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.board.empty_cells()
    }

    /// Apply a move and return new state (immutable)
    pub fn apply_move(&self, index: usize) -> Result<GameState, MoveError> {
        let mut next = *self;
        next.apply_move_mut(index)?;
        Ok(next)
    }

    /// Apply move mutably. On error the state is unchanged.
    pub fn apply_move_mut(&mut self, index: usize) -> Result<GameStatus, MoveError> {
        let mark = match self.status {
            GameStatus::InProgress(mark) => mark,
            _ => return Err(InvalidMove::GameOver.into()),
        };

        self.board.place(index, mark)?;

        self.status = if let Some(line) = find_winning_line(&self.board, mark) {
            GameStatus::Won { mark, line }
        } else if self.board.is_full() {
            GameStatus::Draw
        } else {
            GameStatus::InProgress(mark.other())
        };

        Ok(self.status)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}
