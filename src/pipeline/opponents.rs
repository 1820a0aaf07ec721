//! Fixed-policy opponents for training and evaluation

use rand::{SeedableRng, random, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::Agent,
    tictactoe::{BoardState, LineAnalyzer},
};

/// Opponent selectable from configuration or the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OpponentKind {
    #[default]
    Random,
    Heuristic,
}

impl OpponentKind {
    /// Build the opponent, seeded when `seed` is given
    pub fn build(self, seed: Option<u64>) -> Box<dyn Agent> {
        match (self, seed) {
            (OpponentKind::Random, Some(seed)) => Box::new(RandomAgent::with_seed("random", seed)),
            (OpponentKind::Random, None) => Box::new(RandomAgent::new("random")),
            (OpponentKind::Heuristic, Some(seed)) => {
                Box::new(HeuristicAgent::with_seed("heuristic", seed))
            }
            (OpponentKind::Heuristic, None) => Box::new(HeuristicAgent::new("heuristic")),
        }
    }
}

fn random_empty(board: &BoardState, rng: &mut StdRng) -> Result<usize> {
    board
        .empty_positions()
        .choose(rng)
        .copied()
        .ok_or(Error::NoLegalMove)
}

/// Uniformly random mover
pub struct RandomAgent {
    name: String,
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rng: StdRng::seed_from_u64(random()),
        }
    }

    /// Create a random agent with a deterministic seed
    pub fn with_seed(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_move(&mut self, board: &BoardState) -> Result<usize> {
        random_empty(board, &mut self.rng)
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.rng = StdRng::seed_from_u64(seed);
        Ok(())
    }
}

/// Rule-based opponent
///
/// This agent will:
/// 1. Complete its own line if it can win immediately
/// 2. Otherwise block the other side's immediate win
/// 3. Otherwise play a uniformly random empty cell
pub struct HeuristicAgent {
    name: String,
    rng: StdRng,
}

impl HeuristicAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rng: StdRng::seed_from_u64(random()),
        }
    }

    pub fn with_seed(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Winning cell for the side to move, else a cell that blocks the other side
    pub fn tactical_move(board: &BoardState) -> Option<usize> {
        let me = board.to_move;
        LineAnalyzer::first_winning_move(&board.cells, me)
            .or_else(|| LineAnalyzer::first_winning_move(&board.cells, me.opponent()))
    }
}

impl Agent for HeuristicAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_move(&mut self, board: &BoardState) -> Result<usize> {
        match Self::tactical_move(board) {
            Some(position) => Ok(position),
            None => random_empty(board, &mut self.rng),
        }
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.rng = StdRng::seed_from_u64(seed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_agent_only_plays_empty_cells() {
        let board = BoardState::from_string("XOX.O.X..").unwrap();
        let mut agent = RandomAgent::with_seed("r", 1);
        for _ in 0..200 {
            assert!(board.is_empty(agent.select_move(&board).unwrap()));
        }
    }

    #[test]
    fn random_agent_fails_on_full_board() {
        let board = BoardState::from_string("XOX/XOO/OXX").unwrap();
        let mut agent = RandomAgent::with_seed("r", 1);
        assert!(matches!(agent.select_move(&board), Err(Error::NoLegalMove)));
    }

    #[test]
    fn heuristic_prefers_win_over_block() {
        // X to move: X can win at 2, O threatens 5
        let board = BoardState::from_string("XX.OO....").unwrap();
        let mut agent = HeuristicAgent::with_seed("h", 3);
        assert_eq!(agent.select_move(&board).unwrap(), 2);
    }

    #[test]
    fn heuristic_blocks_immediate_threat() {
        // O to move: X threatens the top row at 2, O has no win
        let board = BoardState::from_string("XX.O.....").unwrap();
        let mut agent = HeuristicAgent::with_seed("h", 3);
        assert_eq!(agent.select_move(&board).unwrap(), 2);
    }

    #[test]
    fn heuristic_falls_back_to_random() {
        let board = BoardState::new();
        assert_eq!(HeuristicAgent::tactical_move(&board), None);
        let mut agent = HeuristicAgent::with_seed("h", 5);
        assert!(agent.select_move(&board).unwrap() < 9);
    }

    #[test]
    fn opponent_kind_builds_named_agents() {
        assert_eq!(OpponentKind::Random.build(Some(1)).name(), "random");
        assert_eq!(OpponentKind::Heuristic.build(None).name(), "heuristic");
    }
}
