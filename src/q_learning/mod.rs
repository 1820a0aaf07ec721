//! Tabular Q-learning
//!
//! - [`q_table`]: value storage, dense or sparse, with the TD and
//!   Monte-Carlo update rules
//! - [`policy`]: ε-greedy action selection over legal cells
//! - [`agent`]: the learning participant tying table, policy and
//!   exploration schedule together
//! - [`knowledge`]: the persistable snapshot of a trained agent
//!
//! ## Usage Example
//!
//! ```
//! use ttt_qlearn::{config::Preset, ports::Agent, q_learning::QLearningAgent, tictactoe::BoardState};
//!
//! let mut agent = QLearningAgent::new(Preset::RandomTd.agent_config())?;
//! let position = agent.select_move(&BoardState::new())?;
//! assert!(position < 9);
//! # Ok::<(), ttt_qlearn::Error>(())
//! ```

pub mod agent;
pub mod knowledge;
pub mod policy;
pub mod q_table;

pub use agent::{Exploration, LoadOutcome, QLearningAgent};
pub use knowledge::Knowledge;
pub use policy::{EpsilonGreedy, TieBreak};
pub use q_table::{ACTION_COUNT, ActionValues, QTable, TableKind};
