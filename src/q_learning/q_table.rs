//! Q-table implementation for tabular learning

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::encoding::StateKey;

/// Number of actions per state (one per cell)
pub const ACTION_COUNT: usize = 9;

/// Action values of one state
pub type ActionValues = [f64; ACTION_COUNT];

/// Storage layout of a [`QTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Fixed 19683 × 9 matrix allocated up front
    #[default]
    Dense,
    /// Rows created on first write
    Sparse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Rows {
    Dense(Vec<ActionValues>),
    Sparse(HashMap<StateKey, ActionValues>),
}

/// Q-table mapping (state, action) pairs to values
///
/// Unseen pairs read as 0.0 in both layouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QTable {
    rows: Rows,
}

impl QTable {
    /// Create a zero-initialized table
    pub fn new(kind: TableKind) -> Self {
        let rows = match kind {
            TableKind::Dense => Rows::Dense(vec![[0.0; ACTION_COUNT]; StateKey::COUNT]),
            TableKind::Sparse => Rows::Sparse(HashMap::new()),
        };
        Self { rows }
    }

    pub fn kind(&self) -> TableKind {
        match self.rows {
            Rows::Dense(_) => TableKind::Dense,
            Rows::Sparse(_) => TableKind::Sparse,
        }
    }

    /// All action values of a state
    pub fn row(&self, state: StateKey) -> ActionValues {
        match &self.rows {
            Rows::Dense(rows) => rows
                .get(state.index())
                .copied()
                .unwrap_or([0.0; ACTION_COUNT]),
            Rows::Sparse(rows) => rows.get(&state).copied().unwrap_or([0.0; ACTION_COUNT]),
        }
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: StateKey, action: usize) -> f64 {
        self.row(state).get(action).copied().unwrap_or(0.0)
    }

    /// Set Q-value for a state-action pair
    ///
    /// Actions outside the board are ignored, matching [`QTable::get`].
    pub fn set(&mut self, state: StateKey, action: usize, value: f64) {
        debug_assert!(value.is_finite(), "non-finite Q-value {value}");
        if action >= ACTION_COUNT {
            return;
        }
        match &mut self.rows {
            Rows::Dense(rows) => {
                if let Some(row) = rows.get_mut(state.index()) {
                    row[action] = value;
                }
            }
            Rows::Sparse(rows) => {
                rows.entry(state).or_insert([0.0; ACTION_COUNT])[action] = value;
            }
        }
    }

    /// Maximum value over the given on-board actions, 0.0 when there are none
    pub fn max_q(&self, state: StateKey, legal_actions: &[usize]) -> f64 {
        let row = self.row(state);
        legal_actions
            .iter()
            .filter_map(|&action| row.get(action).copied())
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    /// One-step TD update
    ///
    /// `next` is `None` for a terminal successor; otherwise it carries the
    /// successor key and its legal actions.
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    pub fn td_update(
        &mut self,
        state: StateKey,
        action: usize,
        reward: f64,
        next: Option<(StateKey, &[usize])>,
        alpha: f64,
        gamma: f64,
    ) -> f64 {
        let current_q = self.get(state, action);
        let td_target = match next {
            None => reward,
            Some((next_state, next_legal)) => reward + gamma * self.max_q(next_state, next_legal),
        };
        let new_q = current_q + alpha * (td_target - current_q);
        self.set(state, action, new_q);
        new_q
    }

    /// Backward Monte-Carlo pass over one episode
    ///
    /// `trajectory` is in chronological order; the last pair receives the full
    /// reward and each earlier pair a further factor of γ.
    pub fn monte_carlo_update(
        &mut self,
        trajectory: &[(StateKey, usize)],
        reward: f64,
        alpha: f64,
        gamma: f64,
    ) {
        let mut ret = reward;
        for &(state, action) in trajectory.iter().rev() {
            let current_q = self.get(state, action);
            self.set(state, action, current_q + alpha * (ret - current_q));
            ret *= gamma;
        }
    }

    /// Zero every value
    pub fn reset(&mut self) {
        match &mut self.rows {
            Rows::Dense(rows) => rows.iter_mut().for_each(|row| *row = [0.0; ACTION_COUNT]),
            Rows::Sparse(rows) => rows.clear(),
        }
    }

    /// Number of states with at least one non-zero value
    pub fn visited_states(&self) -> usize {
        let touched = |row: &ActionValues| row.iter().any(|&v| v != 0.0);
        match &self.rows {
            Rows::Dense(rows) => rows.iter().filter(|row| touched(row)).count(),
            Rows::Sparse(rows) => rows.values().filter(|row| touched(row)).count(),
        }
    }

    /// Whether every value is still zero
    pub fn is_blank(&self) -> bool {
        self.visited_states() == 0
    }

    /// Whether every stored value is finite; a loaded table must pass this
    pub fn is_well_formed(&self) -> bool {
        let finite = |row: &ActionValues| row.iter().all(|v| v.is_finite());
        match &self.rows {
            Rows::Dense(rows) => rows.len() == StateKey::COUNT && rows.iter().all(finite),
            Rows::Sparse(rows) => rows.values().all(finite),
        }
    }
}

impl Default for QTable {
    fn default() -> Self {
        Self::new(TableKind::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(digits: &str) -> StateKey {
        StateKey::parse_digits(digits).unwrap()
    }

    #[test]
    fn test_qtable_initialization() {
        for kind in [TableKind::Dense, TableKind::Sparse] {
            let qtable = QTable::new(kind);
            assert_eq!(qtable.get(key("000000000"), 0), 0.0);
            assert_eq!(qtable.row(key("212121000")), [0.0; ACTION_COUNT]);
            assert!(qtable.is_blank());
            assert_eq!(qtable.kind(), kind);
        }
    }

    #[test]
    fn test_qtable_set_get() {
        for kind in [TableKind::Dense, TableKind::Sparse] {
            let mut qtable = QTable::new(kind);
            let state = key("200000000");
            qtable.set(state, 4, 1.5);
            assert_eq!(qtable.get(state, 4), 1.5);
            assert_eq!(qtable.get(state, 3), 0.0);
            assert_eq!(qtable.visited_states(), 1);
        }
    }

    #[test]
    fn test_max_q_over_legal_actions_only() {
        let mut qtable = QTable::new(TableKind::Sparse);
        let state = key("000000000");
        qtable.set(state, 0, 0.5);
        qtable.set(state, 1, 1.5);
        qtable.set(state, 2, -0.8);

        assert_eq!(qtable.max_q(state, &[0, 1, 2]), 1.5);
        assert_eq!(qtable.max_q(state, &[0, 2]), 0.5);
        assert_eq!(qtable.max_q(state, &[2]), -0.8);
    }

    #[test]
    fn test_max_q_without_candidates_is_zero() {
        let mut qtable = QTable::new(TableKind::Dense);
        let state = key("000000000");
        qtable.set(state, 0, -1.0);
        assert_eq!(qtable.max_q(state, &[]), 0.0);
    }

    #[test]
    fn test_off_board_actions_are_ignored() {
        for kind in [TableKind::Dense, TableKind::Sparse] {
            let mut qtable = QTable::new(kind);
            let state = key("000000000");
            qtable.set(state, ACTION_COUNT, 2.0);
            qtable.set(state, 3, -0.5);

            assert_eq!(qtable.get(state, ACTION_COUNT), 0.0);
            assert_eq!(qtable.visited_states(), 1);
            assert_eq!(qtable.max_q(state, &[3, ACTION_COUNT, 42]), -0.5);
            assert_eq!(qtable.max_q(state, &[42]), 0.0);
        }
    }

    #[test]
    fn terminal_td_update_moves_halfway_to_reward() {
        let mut qtable = QTable::new(TableKind::Dense);
        let state = key("220110000");

        let first = qtable.td_update(state, 2, 1.0, None, 0.5, 0.9);
        assert!((first - 0.5).abs() < 1e-12);

        let second = qtable.td_update(state, 2, 1.0, None, 0.5, 0.9);
        assert!((second - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_td_update_bootstraps_from_successor() {
        let mut qtable = QTable::new(TableKind::Sparse);
        let state = key("000000000");
        let next_state = key("200000000");
        qtable.set(next_state, 1, 1.0);
        qtable.set(next_state, 2, 2.0);
        // Occupied cell 0 must be ignored even if it holds the largest value
        qtable.set(next_state, 0, 5.0);

        let next_legal = [1, 2, 3, 4, 5, 6, 7, 8];
        qtable.td_update(state, 4, 0.0, Some((next_state, &next_legal[..])), 0.5, 0.99);

        // Q(s,4) = 0.0 + 0.5 * (0.0 + 0.99 * 2.0 - 0.0) = 0.99
        assert!((qtable.get(state, 4) - 0.99).abs() < 1e-12);
    }

    #[test]
    fn monte_carlo_pass_discounts_earlier_moves() {
        let mut qtable = QTable::new(TableKind::Sparse);
        let s0 = key("000000000");
        let s1 = key("210000000");

        qtable.monte_carlo_update(&[(s0, 4), (s1, 8)], 1.0, 1.0, 0.9);

        assert!((qtable.get(s1, 8) - 1.0).abs() < 1e-12);
        assert!((qtable.get(s0, 4) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn values_stay_bounded_under_repeated_updates() {
        let mut qtable = QTable::new(TableKind::Dense);
        let s = key("000000000");
        let next = key("200000000");
        let legal: Vec<usize> = (1..9).collect();
        let gamma = 0.95;
        let bound = 1.0 / (1.0 - gamma) + 1e-9;

        for i in 0..10_000 {
            let reward = if i % 2 == 0 { 1.0 } else { -1.0 };
            qtable.td_update(s, 0, reward, Some((next, legal.as_slice())), 0.9, gamma);
            qtable.td_update(next, (i % 8) + 1, reward, Some((s, legal.as_slice())), 0.9, gamma);
        }

        for v in qtable.row(s).iter().chain(qtable.row(next).iter()) {
            assert!(v.is_finite());
            assert!(v.abs() <= bound);
        }
    }

    #[test]
    fn test_reset() {
        let mut qtable = QTable::new(TableKind::Dense);
        qtable.set(key("000000000"), 0, 1.0);
        qtable.reset();
        assert!(qtable.is_blank());
        assert!(qtable.is_well_formed());
    }
}
