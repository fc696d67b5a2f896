//! The fixed catalog of winning lines and win detection over it.

use serde::{Deserialize, Serialize};

use super::{Board, Mark};

/// Four cell indices forming one winning pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line([usize; 4]);

impl Line {
    pub const fn new(cells: [usize; 4]) -> Self {
        Line(cells)
    }

    pub fn cells(&self) -> [usize; 4] {
        self.0
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }
}

/// Every winning line in catalog order: rows, then columns, then the
/// main diagonal and the anti-diagonal. Catalog order is the tie-break
/// wherever more than one line qualifies.
pub const LINES: [Line; 10] = [
    // Rows
    Line::new([0, 1, 2, 3]),
    Line::new([4, 5, 6, 7]),
    Line::new([8, 9, 10, 11]),
    Line::new([12, 13, 14, 15]),
    // Columns
    Line::new([0, 4, 8, 12]),
    Line::new([1, 5, 9, 13]),
    Line::new([2, 6, 10, 14]),
    Line::new([3, 7, 11, 15]),
    // Diagonals
    Line::new([0, 5, 10, 15]),
    Line::new([3, 6, 9, 12]),
];

/// Returns the first catalog line fully held by `mark`, if any.
pub fn find_winning_line(board: &Board, mark: Mark) -> Option<Line> {
    let cell = mark.to_cell();
    LINES
        .iter()
        .find(|line| line.0.iter().all(|&index| board.get(index) == Some(cell)))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cell, CELLS};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn board_with(marks: &[(usize, Mark)]) -> Board {
        let mut board = Board::new();
        for &(index, mark) in marks {
            board.place(index, mark).unwrap();
        }
        board
    }

    #[test]
    fn test_catalog_covers_every_cell() {
        for index in 0..CELLS {
            assert!(LINES.iter().any(|line| line.contains(index)));
        }
    }

    #[test]
    fn test_no_winner_empty_board() {
        let board = Board::new();
        assert_eq!(find_winning_line(&board, Mark::X), None);
        assert_eq!(find_winning_line(&board, Mark::O), None);
    }

    #[test]
    fn test_row_win() {
        let board = board_with(&[(4, Mark::X), (5, Mark::X), (6, Mark::X), (7, Mark::X)]);
        assert_eq!(find_winning_line(&board, Mark::X), Some(LINES[1]));
        assert_eq!(find_winning_line(&board, Mark::O), None);
    }

    #[test]
    fn test_column_win() {
        let board = board_with(&[(2, Mark::O), (6, Mark::O), (10, Mark::O), (14, Mark::O)]);
        assert_eq!(
            find_winning_line(&board, Mark::O).map(|l| l.cells()),
            Some([2, 6, 10, 14])
        );
    }

    #[test]
    fn test_anti_diagonal_win() {
        let board = board_with(&[(3, Mark::X), (6, Mark::X), (9, Mark::X), (12, Mark::X)]);
        assert_eq!(find_winning_line(&board, Mark::X), Some(LINES[9]));
    }

    #[test]
    fn test_three_is_not_a_win() {
        let board = board_with(&[(0, Mark::X), (5, Mark::X), (10, Mark::X), (15, Mark::O)]);
        assert_eq!(find_winning_line(&board, Mark::X), None);
    }

    #[test]
    fn test_catalog_order_breaks_ties() {
        // Row 0 and column 0 both complete; the row comes first.
        let board = board_with(&[
            (0, Mark::X),
            (1, Mark::X),
            (2, Mark::X),
            (3, Mark::X),
            (4, Mark::X),
            (8, Mark::X),
            (12, Mark::X),
        ]);
        assert_eq!(find_winning_line(&board, Mark::X), Some(LINES[0]));
    }

    #[test]
    fn test_random_boards_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let mut board = Board::new();
            for index in 0..CELLS {
                match rng.random_range(0..3) {
                    0 => {}
                    1 => board.place(index, Mark::X).unwrap(),
                    _ => board.place(index, Mark::O).unwrap(),
                }
            }
            for mark in [Mark::X, Mark::O] {
                let expected = LINES.iter().any(|line| {
                    line.cells()
                        .iter()
                        .all(|&i| board.get(i) == Some(mark.to_cell()))
                });
                let found = find_winning_line(&board, mark);
                assert_eq!(found.is_some(), expected);
                if let Some(line) = found {
                    assert!(line.cells().iter().all(|&i| board.get(i) != Some(Cell::Empty)));
                }
            }
        }
    }
}
