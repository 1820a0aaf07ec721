//! Agent port - the one capability interface every participant implements
//!
//! The episode simulator and the evaluation harness only ever see
//! `&mut dyn Agent`, so a learning agent, the heuristic and the random mover
//! are interchangeable on either side of the board.

use crate::{
    Result,
    tictactoe::{BoardState, Perspective, Player},
};

/// Participant in a tic-tac-toe game
///
/// # Event Sequence
///
/// For each game the simulator calls:
/// 1. `begin_episode(role)` on both participants
/// 2. For each turn:
///    - `select_move(board)` on the side to move
///    - `record_own_move(before, position, after)` on that side (training only)
///    - `observe_opponent_move(position)` on the other side
/// 3. `finish_episode(result)` on both participants (training only)
///
/// # Examples
///
/// ```
/// use ttt_qlearn::{ports::Agent, tictactoe::BoardState};
///
/// struct FirstEmpty;
///
/// impl Agent for FirstEmpty {
///     fn name(&self) -> &str {
///         "first-empty"
///     }
///
///     fn select_move(&mut self, board: &BoardState) -> ttt_qlearn::Result<usize> {
///         board
///             .empty_positions()
///             .first()
///             .copied()
///             .ok_or(ttt_qlearn::Error::NoLegalMove)
///     }
/// }
/// ```
pub trait Agent: Send {
    /// Name used in logs and reports.
    fn name(&self) -> &str;

    /// Called once before the first move of a game.
    ///
    /// `role` is the mark this participant plays; X always opens.
    fn begin_episode(&mut self, _role: Player) {}

    /// Called after the other side has placed a mark at `position`.
    fn observe_opponent_move(&mut self, _position: usize) {}

    /// Choose an empty cell of `board`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NoLegalMove`] if the board has no empty cell.
    fn select_move(&mut self, board: &BoardState) -> Result<usize>;

    /// Learning hook run right after this participant's own move.
    ///
    /// Only called by training episodes. Non-learning participants keep the
    /// default no-op.
    fn record_own_move(
        &mut self,
        _before: &BoardState,
        _position: usize,
        _after: &BoardState,
    ) -> Result<()> {
        Ok(())
    }

    /// Learning hook run once a training episode reaches a terminal position.
    fn finish_episode(&mut self, _result: Perspective) -> Result<()> {
        Ok(())
    }

    /// Seed the participant's random number generator.
    ///
    /// Stateless participants can ignore it.
    fn set_rng_seed(&mut self, _seed: u64) -> Result<()> {
        Ok(())
    }
}
