//! MessagePack implementation of the knowledge repository.
//!
//! This adapter implements the KnowledgeRepository port using rmp_serde for
//! compact binary serialization.

use std::{
    fs::File,
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::Path,
};

use crate::{Result, error::Error, ports::KnowledgeRepository, q_learning::Knowledge};

/// MessagePack-based knowledge repository.
///
/// The file holds the value table followed by the trailing epsilon.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use ttt_qlearn::adapters::MsgPackRepository;
/// use ttt_qlearn::ports::KnowledgeRepository;
/// use ttt_qlearn::q_learning::{Knowledge, QTable, TableKind};
///
/// let repo = MsgPackRepository;
/// let knowledge = Knowledge::new(QTable::new(TableKind::Dense), 0.01);
///
/// repo.save(&knowledge, Path::new("trained.msgpack"))?;
/// let loaded = repo.load(Path::new("trained.msgpack"))?;
/// # Ok::<(), ttt_qlearn::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    /// Create a new MessagePack repository.
    pub fn new() -> Self {
        Self
    }
}

impl KnowledgeRepository for MsgPackRepository {
    fn save(&self, knowledge: &Knowledge, path: &Path) -> Result<()> {
        let save_failed = |reason: String| Error::KnowledgeSaveFailed {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::create(path).map_err(|e| save_failed(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        rmp_serde::encode::write(&mut writer, knowledge).map_err(|e| save_failed(e.to_string()))?;
        writer.flush().map_err(|e| save_failed(e.to_string()))?;

        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Knowledge> {
        let file = File::open(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => Error::KnowledgeNotFound {
                path: path.to_path_buf(),
            },
            _ => Error::KnowledgeCorrupt {
                path: path.to_path_buf(),
                reason: source.to_string(),
            },
        })?;

        let knowledge: Knowledge = rmp_serde::decode::from_read(BufReader::new(file)).map_err(
            |e| Error::KnowledgeCorrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        )?;
        knowledge.validate(path)?;

        Ok(knowledge)
    }
}
