//! ε-greedy action selection over a [`QTable`]

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result, encoding::StateKey, q_learning::q_table::QTable, tictactoe::BoardState,
};

/// How ties between equally valued greedy actions are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// First maximum at the lowest cell index (reproducible)
    #[default]
    LowestIndex,
    /// Uniform choice among the tied maxima
    Random,
}

/// ε-greedy policy restricted to the empty cells of a board
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EpsilonGreedy {
    pub tie_break: TieBreak,
}

impl EpsilonGreedy {
    pub fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }

    /// Pick an empty cell of `board`.
    ///
    /// With probability `epsilon` the choice is uniform over empty cells;
    /// otherwise the empty cell with the highest stored value wins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoLegalMove`] when the board has no empty cell.
    pub fn select<R: Rng + ?Sized>(
        &self,
        table: &QTable,
        board: &BoardState,
        epsilon: f64,
        rng: &mut R,
    ) -> Result<usize> {
        let legal = board.empty_positions();
        if legal.is_empty() {
            return Err(Error::NoLegalMove);
        }

        let epsilon = epsilon.clamp(0.0, 1.0);
        if epsilon > 0.0 && rng.random::<f64>() < epsilon {
            return legal.choose(rng).copied().ok_or(Error::NoLegalMove);
        }

        self.greedy(table, StateKey::encode(board), &legal, rng)
    }

    /// Highest-valued action among `legal`
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoLegalMove`] when `legal` is empty.
    pub fn greedy<R: Rng + ?Sized>(
        &self,
        table: &QTable,
        state: StateKey,
        legal: &[usize],
        rng: &mut R,
    ) -> Result<usize> {
        let row = table.row(state);
        let best = legal
            .iter()
            .map(|&action| row[action])
            .reduce(f64::max)
            .ok_or(Error::NoLegalMove)?;

        match self.tie_break {
            TieBreak::LowestIndex => legal
                .iter()
                .copied()
                .find(|&action| row[action] == best)
                .ok_or(Error::NoLegalMove),
            TieBreak::Random => {
                let tied: Vec<usize> = legal
                    .iter()
                    .copied()
                    .filter(|&action| row[action] == best)
                    .collect();
                tied.choose(rng).copied().ok_or(Error::NoLegalMove)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::q_learning::q_table::TableKind;

    #[test]
    fn full_board_has_no_legal_move() {
        let board = BoardState::from_string("XOX/XOO/OXX").unwrap();
        let table = QTable::new(TableKind::Sparse);
        let mut rng = StdRng::seed_from_u64(1);

        for epsilon in [0.0, 0.5, 1.0] {
            let result = EpsilonGreedy::default().select(&table, &board, epsilon, &mut rng);
            assert!(matches!(result, Err(Error::NoLegalMove)));
        }
    }

    #[test]
    fn greedy_prefers_highest_legal_value() {
        let board = BoardState::from_string("X...O....").unwrap();
        let key = StateKey::encode(&board);
        let mut table = QTable::new(TableKind::Sparse);
        // Occupied cell holds the largest value and must be ignored
        table.set(key, 0, 10.0);
        table.set(key, 7, 0.4);
        table.set(key, 3, 0.2);
        let mut rng = StdRng::seed_from_u64(3);

        let action = EpsilonGreedy::default()
            .select(&table, &board, 0.0, &mut rng)
            .unwrap();
        assert_eq!(action, 7);
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        let board = BoardState::from_string("XO.......").unwrap();
        let table = QTable::new(TableKind::Dense);
        let mut rng = StdRng::seed_from_u64(5);

        let action = EpsilonGreedy::default()
            .select(&table, &board, 0.0, &mut rng)
            .unwrap();
        assert_eq!(action, 2);
    }

    #[test]
    fn random_tie_break_stays_among_maxima() {
        let board = BoardState::new();
        let key = StateKey::encode(&board);
        let mut table = QTable::new(TableKind::Sparse);
        table.set(key, 2, 1.0);
        table.set(key, 6, 1.0);
        let policy = EpsilonGreedy::new(TieBreak::Random);
        let mut rng = StdRng::seed_from_u64(9);

        let mut seen = [false; 9];
        for _ in 0..200 {
            let action = policy.select(&table, &board, 0.0, &mut rng).unwrap();
            assert!(action == 2 || action == 6);
            seen[action] = true;
        }
        assert!(seen[2] && seen[6]);
    }

    #[test]
    fn exploration_never_picks_occupied_cells() {
        let board = BoardState::from_string("XO.OX....").unwrap();
        let table = QTable::new(TableKind::Sparse);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..500 {
            let action = EpsilonGreedy::default()
                .select(&table, &board, 1.0, &mut rng)
                .unwrap();
            assert!(board.is_empty(action));
        }
    }
}
