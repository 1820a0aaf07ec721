//! Observer port - hooks into a training run
//!
//! Observers collect progress and metrics without coupling the training loop
//! to any particular output.

use crate::{
    Error, Result,
    pipeline::{episode::EpisodeReport, training::TrainingReport},
};

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// 1. `on_training_start(planned)` once; `planned` is `None` when the stop
///    condition has no fixed episode count
/// 2. For each episode, either `on_episode_end` or `on_episode_aborted`
/// 3. `on_training_end(report)` once
///
/// # Examples
///
/// ```
/// use ttt_qlearn::{pipeline::EpisodeReport, ports::Observer};
///
/// #[derive(Default)]
/// struct Counter {
///     episodes: usize,
/// }
///
/// impl Observer for Counter {
///     fn on_episode_end(
///         &mut self,
///         _episode: usize,
///         _report: &EpisodeReport,
///         _epsilon: f64,
///     ) -> ttt_qlearn::Result<()> {
///         self.episodes += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    fn on_training_start(&mut self, _planned_episodes: Option<usize>) -> Result<()> {
        Ok(())
    }

    /// Called after a completed episode with the exploration rate it ran at.
    fn on_episode_end(
        &mut self,
        _episode: usize,
        _report: &EpisodeReport,
        _epsilon: f64,
    ) -> Result<()> {
        Ok(())
    }

    /// Called when an episode was discarded because of `error`.
    fn on_episode_aborted(&mut self, _episode: usize, _error: &Error) -> Result<()> {
        Ok(())
    }

    fn on_training_end(&mut self, _report: &TrainingReport) -> Result<()> {
        Ok(())
    }
}
