//! Observer implementations for training runs

use std::collections::VecDeque;

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use super::{episode::EpisodeReport, training::TrainingReport};
use crate::{Error, Result, ports::Observer, tictactoe::Perspective};

fn template_error(e: impl std::fmt::Display) -> Error {
    Error::ProgressBarTemplate {
        message: e.to_string(),
    }
}

/// Progress bar observer - Shows training progress
///
/// Draws a bar when the episode count is known up front and a spinner for
/// time-bounded runs.
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    wins: usize,
    draws: usize,
    losses: usize,
    aborted: usize,
    epsilon: f64,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            wins: 0,
            draws: 0,
            losses: 0,
            aborted: 0,
            epsilon: 0.0,
        }
    }

    fn message(&self) -> String {
        format!(
            "W:{} D:{} L:{} A:{} eps {:.3}",
            self.wins, self.draws, self.losses, self.aborted, self.epsilon
        )
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, planned_episodes: Option<usize>) -> Result<()> {
        let pb = match planned_episodes {
            Some(total) => {
                let pb = ProgressBar::new(total as u64);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                        .map_err(template_error)?
                        .progress_chars("=>-"),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} [{elapsed_precise}] {pos} episodes ({msg})")
                        .map_err(template_error)?,
                );
                pb
            }
        };
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, report: &EpisodeReport, epsilon: f64) -> Result<()> {
        match report.result() {
            Perspective::Win => self.wins += 1,
            Perspective::Draw => self.draws += 1,
            Perspective::Loss => self.losses += 1,
        }
        self.epsilon = epsilon;

        if let Some(pb) = &self.progress_bar {
            pb.set_position(episode as u64 + 1);
            if episode.is_multiple_of(1000) {
                pb.set_message(self.message());
            }
        }
        Ok(())
    }

    fn on_episode_aborted(&mut self, episode: usize, _error: &Error) -> Result<()> {
        self.aborted += 1;
        if let Some(pb) = &self.progress_bar {
            pb.set_position(episode as u64 + 1);
        }
        Ok(())
    }

    fn on_training_end(&mut self, report: &TrainingReport) -> Result<()> {
        self.epsilon = report.final_epsilon;
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks training metrics
///
/// Besides the overall tally it keeps a window of the most recent results,
/// which shows how the learner is doing now rather than on average.
pub struct MetricsObserver {
    wins: usize,
    draws: usize,
    losses: usize,
    aborted: usize,
    total_moves: usize,
    window: usize,
    recent: VecDeque<Perspective>,
}

impl MetricsObserver {
    /// Create a new metrics observer with a recent-results window of 1000
    pub fn new() -> Self {
        Self::with_window(1000)
    }

    pub fn with_window(window: usize) -> Self {
        Self {
            wins: 0,
            draws: 0,
            losses: 0,
            aborted: 0,
            total_moves: 0,
            window: window.max(1),
            recent: VecDeque::with_capacity(window.max(1)),
        }
    }

    fn completed(&self) -> usize {
        self.wins + self.draws + self.losses
    }

    fn rate(count: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64
        }
    }

    /// Get current win rate
    pub fn win_rate(&self) -> f64 {
        Self::rate(self.wins, self.completed())
    }

    /// Get current draw rate
    pub fn draw_rate(&self) -> f64 {
        Self::rate(self.draws, self.completed())
    }

    /// Get current loss rate
    pub fn loss_rate(&self) -> f64 {
        Self::rate(self.losses, self.completed())
    }

    /// Share of non-losses among the most recent episodes
    pub fn recent_non_loss_rate(&self) -> f64 {
        let non_losses = self
            .recent
            .iter()
            .filter(|&&result| result != Perspective::Loss)
            .count();
        Self::rate(non_losses, self.recent.len())
    }

    /// Get average game length
    pub fn avg_game_length(&self) -> f64 {
        Self::rate(self.total_moves, self.completed())
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            completed: self.completed(),
            aborted: self.aborted,
            wins: self.wins,
            draws: self.draws,
            losses: self.losses,
            win_rate: self.win_rate(),
            draw_rate: self.draw_rate(),
            loss_rate: self.loss_rate(),
            recent_non_loss_rate: self.recent_non_loss_rate(),
            avg_game_length: self.avg_game_length(),
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub completed: usize,
    pub aborted: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,
    pub recent_non_loss_rate: f64,
    pub avg_game_length: f64,
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, _episode: usize, report: &EpisodeReport, _epsilon: f64) -> Result<()> {
        let result = report.result();
        match result {
            Perspective::Win => self.wins += 1,
            Perspective::Draw => self.draws += 1,
            Perspective::Loss => self.losses += 1,
        }
        self.total_moves += report.length();

        if self.recent.len() == self.window {
            self.recent.pop_front();
        }
        self.recent.push_back(result);
        Ok(())
    }

    fn on_episode_aborted(&mut self, _episode: usize, _error: &Error) -> Result<()> {
        self.aborted += 1;
        Ok(())
    }
}
