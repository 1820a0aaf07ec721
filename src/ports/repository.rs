//! Repository port for knowledge persistence.
//!
//! This module defines the trait boundary between the learning core and the
//! storage used for learned value tables.

use std::path::Path;

use crate::{Result, q_learning::Knowledge};

/// Port for persisting and loading learned knowledge.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use ttt_qlearn::{
///     adapters::MsgPackRepository,
///     ports::KnowledgeRepository,
///     q_learning::{Knowledge, QTable},
/// };
///
/// let repo = MsgPackRepository::new();
/// let knowledge = Knowledge::new(QTable::default(), 0.01);
/// repo.save(&knowledge, Path::new("knowledge.msgpack"))?;
/// let restored = repo.load(Path::new("knowledge.msgpack"))?;
/// # Ok::<(), ttt_qlearn::Error>(())
/// ```
pub trait KnowledgeRepository {
    /// Save knowledge to persistent storage.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::KnowledgeSaveFailed`] if the location cannot be
    /// written or serialization fails.
    fn save(&self, knowledge: &Knowledge, path: &Path) -> Result<()>;

    /// Load knowledge from persistent storage.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::KnowledgeNotFound`] if nothing is stored at
    /// `path`, and [`crate::Error::KnowledgeCorrupt`] if the stored bytes
    /// cannot be decoded into well-formed knowledge.
    fn load(&self, path: &Path) -> Result<Knowledge>;
}
