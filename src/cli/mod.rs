//! Command-line interface for training and evaluating Q-learning agents

pub mod commands;
pub mod output;
