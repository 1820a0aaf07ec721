//! Training and evaluation pipeline
//!
//! This module provides:
//! - Single-game simulation with learning hooks
//! - The training loop with epsilon decay and stop conditions
//! - Paired evaluation against fixed opponents
//! - Observers for progress and metrics

pub mod episode;
pub mod evaluation;
pub mod observers;
pub mod opponents;
pub mod stop;
pub mod training;

pub use episode::{EpisodeMode, EpisodeReport, EpisodeSimulator};
pub use evaluation::{EvaluationResult, Evaluator, SideTally, play_pairs};
// Re-export observer implementations (adapters)
pub use observers::{MetricsObserver, MetricsSummary, ProgressObserver};
pub use opponents::{HeuristicAgent, OpponentKind, RandomAgent};
pub use stop::{StopAfterDuration, StopAfterIterations, StopCondition};
pub use training::{Trainer, TrainingReport};

pub use crate::ports::{Agent, Observer};
