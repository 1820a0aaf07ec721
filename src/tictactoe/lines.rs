//! Winning lines and the moves that complete them

use super::{Cell, Player};

/// Winning line indices on the 3x3 board
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

/// Utility for analyzing winning lines in Tic-Tac-Toe
pub struct LineAnalyzer;

impl LineAnalyzer {
    /// Check if a player has three in a row, column or diagonal
    pub fn has_won(cells: &[Cell; 9], player: Player) -> bool {
        let target = player.to_cell();
        WINNING_LINES
            .iter()
            .any(|line| line.iter().all(|&idx| cells[idx] == target))
    }

    /// All positions that would immediately complete a line for `player`,
    /// ascending and without duplicates
    pub fn winning_moves(cells: &[Cell; 9], player: Player) -> Vec<usize> {
        let mut moves: Vec<usize> = WINNING_LINES
            .iter()
            .filter_map(|line| Self::winning_move_in_line(cells, player, line))
            .collect();
        moves.sort_unstable();
        moves.dedup();
        moves
    }

    /// Lowest-index position that completes a line for `player`
    pub fn first_winning_move(cells: &[Cell; 9], player: Player) -> Option<usize> {
        Self::winning_moves(cells, player).into_iter().next()
    }

    /// The empty cell of `line` when the other two hold `player`'s marks
    fn winning_move_in_line(cells: &[Cell; 9], player: Player, line: &[usize; 3]) -> Option<usize> {
        let own = line.iter().filter(|&&idx| cells[idx] == player.to_cell()).count();
        let mut empty = line.iter().copied().filter(|&idx| cells[idx] == Cell::Empty);
        match (own, empty.next(), empty.next()) {
            (2, Some(idx), None) => Some(idx),
            _ => None,
        }
    }
}
