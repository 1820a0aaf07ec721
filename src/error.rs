//! Error types for the tic-tac-toe Q-learning crate

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid move: position {position} is out of bounds or already occupied")]
    InvalidMove { position: usize },

    #[error("no legal move available: the board is full or the game is over")]
    NoLegalMove,

    #[error("{agent} proposed malformed move at position {position}")]
    MalformedMove { agent: String, position: usize },

    #[error("board string has the wrong length: expected {expected} cells, got {got} in '{context}'")]
    InvalidBoardLength {
        expected: usize,
        got: usize,
        context: String,
    },

    #[error("invalid character '{character}' at position {position} in '{context}'")]
    InvalidCellCharacter {
        character: char,
        position: usize,
        context: String,
    },

    #[error("invalid piece counts: X={x_count}, O={o_count} (must differ by at most one)")]
    InvalidPieceCounts { x_count: usize, o_count: usize },

    #[error("state key {value} is outside the encodable range 0..19683")]
    InvalidStateKey { value: u32 },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("knowledge file {} not found", path.display())]
    KnowledgeNotFound { path: PathBuf },

    #[error("knowledge file {} is unreadable: {reason}", path.display())]
    KnowledgeCorrupt { path: PathBuf, reason: String },

    #[error("failed to save knowledge to {}: {reason}", path.display())]
    KnowledgeSaveFailed { path: PathBuf, reason: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    /// Whether this error ends only the current episode rather than the run.
    pub fn is_episode_local(&self) -> bool {
        matches!(
            self,
            Error::NoLegalMove | Error::MalformedMove { .. } | Error::InvalidMove { .. }
        )
    }
}
