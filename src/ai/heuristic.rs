use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::game::{Board, Cell, Mark, LINES};

use super::agent::Agent;

/// The middle 2x2 block of the grid.
pub const CENTER_CELLS: [usize; 4] = [5, 6, 9, 10];

/// Computer opponent settings, the `[ai]` table of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Fixed RNG seed for reproducible games; OS entropy when absent.
    pub seed: Option<u64>,
}

/// Which rule of the priority policy produced a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveReason {
    Win,
    Block,
    Center,
    Fallback,
}

/// Returns the empty cell that would complete a line for `mark`: the first
/// catalog line holding exactly three of `mark` and one empty cell.
pub fn completing_cell(board: &Board, mark: Mark) -> Option<usize> {
    let own_cell = mark.to_cell();

    LINES.iter().find_map(|line| {
        let mut own = 0;
        let mut empty = None;
        let mut empties = 0;
        for index in line.cells() {
            match board.get(index) {
                Some(c) if c == own_cell => own += 1,
                Some(Cell::Empty) => {
                    empties += 1;
                    empty = Some(index);
                }
                _ => {}
            }
        }
        if own == 3 && empties == 1 {
            empty
        } else {
            None
        }
    })
}

/// One-ply rule-based opponent: win, else block, else a random center cell,
/// else any random empty cell. Only the first threatening opponent line in
/// catalog order is blocked.
pub struct HeuristicAgent {
    rng: StdRng,
}

impl HeuristicAgent {
    pub fn new() -> Self {
        HeuristicAgent {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        HeuristicAgent {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded from config when a seed is given, OS entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::with_seed)
    }

    /// Apply the priority policy and report which rule fired.
    pub fn choose(&mut self, board: &Board, mark: Mark) -> Option<(usize, MoveReason)> {
        if let Some(index) = completing_cell(board, mark) {
            return Some((index, MoveReason::Win));
        }

        if let Some(index) = completing_cell(board, mark.other()) {
            return Some((index, MoveReason::Block));
        }

        let center: Vec<usize> = CENTER_CELLS
            .iter()
            .copied()
            .filter(|&index| board.get(index) == Some(Cell::Empty))
            .collect();
        if !center.is_empty() {
            let index = center[self.rng.random_range(0..center.len())];
            return Some((index, MoveReason::Center));
        }

        let empty = board.empty_cells();
        if empty.is_empty() {
            return None;
        }
        let index = empty[self.rng.random_range(0..empty.len())];
        Some((index, MoveReason::Fallback))
    }
}

impl Default for HeuristicAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for HeuristicAgent {
    #[instrument(level = "debug", skip(self, board))]
    fn select_move(&mut self, board: &Board, mark: Mark) -> Option<usize> {
        let (index, reason) = self.choose(board, mark)?;
        debug!(index, ?reason, "heuristic move selected");
        Some(index)
    }

    fn name(&self) -> &str {
        "Heuristic"
    }
}
