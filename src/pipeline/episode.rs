//! Single-game simulation between two agents

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::Agent,
    tictactoe::{Game, GameOutcome, Move, Perspective, Player},
};

/// Whether a game feeds the learning hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeMode {
    /// Learning hooks run; a malformed move aborts the episode
    Training,
    /// No learning; a malformed move forfeits the game for its author
    Evaluation,
}

/// Record of one finished game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    pub outcome: GameOutcome,
    /// Mark the learner played
    pub learner_role: Player,
    pub moves: Vec<Move>,
    /// Side that lost by proposing a malformed move
    pub forfeited_by: Option<Player>,
}

impl EpisodeReport {
    /// Outcome from the learner's side
    pub fn result(&self) -> Perspective {
        self.outcome.for_player(self.learner_role)
    }

    pub fn learner_started(&self) -> bool {
        self.learner_role == Player::X
    }

    pub fn length(&self) -> usize {
        self.moves.len()
    }
}

/// Plays one game between a learner and an opponent
#[derive(Debug, Clone, Copy)]
pub struct EpisodeSimulator {
    mode: EpisodeMode,
}

impl EpisodeSimulator {
    pub fn new(mode: EpisodeMode) -> Self {
        Self { mode }
    }

    pub fn training() -> Self {
        Self::new(EpisodeMode::Training)
    }

    pub fn evaluation() -> Self {
        Self::new(EpisodeMode::Evaluation)
    }

    pub fn mode(&self) -> EpisodeMode {
        self.mode
    }

    /// Play a full game from the empty board.
    ///
    /// X always opens, so `learner_starts` decides which mark the learner
    /// holds. Nobody is asked to move once the game is decided or the board
    /// is full.
    ///
    /// # Errors
    ///
    /// In training mode a malformed move returns [`Error::MalformedMove`] and
    /// the episode is discarded; errors from the agents propagate in both
    /// modes.
    pub fn play(
        &self,
        learner: &mut dyn Agent,
        opponent: &mut dyn Agent,
        learner_starts: bool,
    ) -> Result<EpisodeReport> {
        let learner_role = if learner_starts { Player::X } else { Player::O };
        learner.begin_episode(learner_role);
        opponent.begin_episode(learner_role.opponent());

        let training = self.mode == EpisodeMode::Training;
        let mut game = Game::new();
        let mut forfeited_by = None;

        let outcome = loop {
            if let Some(outcome) = game.outcome {
                break outcome;
            }

            let before = game.state;
            let side = before.to_move;
            let (mover, other): (&mut dyn Agent, &mut dyn Agent) = if side == learner_role {
                (&mut *learner, &mut *opponent)
            } else {
                (&mut *opponent, &mut *learner)
            };

            let position = mover.select_move(&before)?;
            match game.play(position) {
                Ok(_) => {}
                Err(Error::InvalidMove { position }) => {
                    let err = Error::MalformedMove {
                        agent: mover.name().to_string(),
                        position,
                    };
                    if training {
                        return Err(err);
                    }
                    warn!("{err}; game forfeited");
                    forfeited_by = Some(side);
                    break GameOutcome::Win(side.opponent());
                }
                Err(err) => return Err(err),
            }

            if training {
                mover.record_own_move(&before, position, &game.state)?;
            }
            other.observe_opponent_move(position);
        };

        let report = EpisodeReport {
            outcome,
            learner_role,
            moves: game.moves,
            forfeited_by,
        };

        if training {
            learner.finish_episode(report.result())?;
            opponent.finish_episode(outcome.for_player(learner_role.opponent()))?;
        }

        debug!(
            "{} ({}) vs {}: {:?} after {} moves",
            learner.name(),
            learner_role,
            opponent.name(),
            report.result(),
            report.length()
        );
        Ok(report)
    }
}
