//! Tabular Q-learning for tic-tac-toe
//!
//! This crate provides:
//! - Board representation, move validation and terminal detection
//! - A bijective state encoder and dense or sparse Q-tables
//! - An epsilon-greedy learning agent with temporal-difference and
//!   Monte-Carlo updates
//! - Training with epsilon decay, stop conditions and observers
//! - Paired evaluation against random and heuristic opponents
//! - Knowledge persistence through a repository port
//!
//! ```
//! use ttt_qlearn::{
//!     Preset, QLearningAgent,
//!     pipeline::{RandomAgent, StopAfterIterations, Trainer},
//! };
//!
//! let preset = Preset::RandomTd;
//! let mut agent = QLearningAgent::new(preset.agent_config().with_seed(7))?;
//! let mut opponent = RandomAgent::with_seed("random", 8);
//! let mut trainer = Trainer::new(preset.training_config().with_seed(7));
//!
//! let report = trainer.train(&mut agent, &mut opponent, &mut StopAfterIterations::new(100))?;
//! assert_eq!(report.episodes, 100);
//! # Ok::<(), ttt_qlearn::Error>(())
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod encoding;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod tictactoe;

pub use config::{AgentConfig, EvaluationConfig, Preset, RunConfig, TrainingConfig};
pub use encoding::StateKey;
pub use error::{Error, Result};
pub use q_learning::{Knowledge, QLearningAgent, QTable};
pub use tictactoe::{BoardState, Player};
