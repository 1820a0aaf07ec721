//! High-level game management

use serde::{Deserialize, Serialize};

use super::board::{BoardState, GameStatus, Player};

/// A move in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub position: usize,
    pub player: Player,
}

/// Outcome of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    Win(Player),
    Draw,
}

/// Outcome seen from one participant's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Perspective {
    Win,
    Loss,
    Draw,
}

impl GameOutcome {
    /// Convert a terminal status into an outcome; `None` while in progress
    pub fn from_status(status: GameStatus) -> Option<Self> {
        match status {
            GameStatus::Won(player) => Some(GameOutcome::Win(player)),
            GameStatus::Draw => Some(GameOutcome::Draw),
            GameStatus::InProgress => None,
        }
    }

    /// View the outcome from `role`'s side
    pub fn for_player(self, role: Player) -> Perspective {
        match self {
            GameOutcome::Win(winner) if winner == role => Perspective::Win,
            GameOutcome::Win(_) => Perspective::Loss,
            GameOutcome::Draw => Perspective::Draw,
        }
    }
}

/// A game in progress with its move history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub state: BoardState,
    pub moves: Vec<Move>,
    pub outcome: Option<GameOutcome>,
}

impl Game {
    /// Start a game from the empty board; X opens
    pub fn new() -> Self {
        Game {
            state: BoardState::new(),
            moves: Vec::with_capacity(9),
            outcome: None,
        }
    }

    /// Play a move for the side to move
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NoLegalMove`] once the game is over and
    /// [`crate::Error::InvalidMove`] for an occupied or out-of-range cell.
    pub fn play(&mut self, position: usize) -> Result<Option<GameOutcome>, crate::Error> {
        if self.outcome.is_some() {
            return Err(crate::Error::NoLegalMove);
        }

        let player = self.state.to_move;
        self.state = self.state.make_move(position)?;
        self.moves.push(Move { position, player });
        self.outcome = GameOutcome::from_status(self.state.status());

        Ok(self.outcome)
    }

    /// Last move played, if any
    pub fn last_move(&self) -> Option<Move> {
        self.moves.last().copied()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
