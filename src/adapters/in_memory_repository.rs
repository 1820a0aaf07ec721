//! In-memory knowledge repository for testing.
//!
//! Stores MessagePack-encoded knowledge in a shared map, so tests exercise
//! the same encoding as the file adapter without touching the disk.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{Result, error::Error, ports::KnowledgeRepository, q_learning::Knowledge};

/// In-memory repository for testing.
///
/// # Examples
///
/// ```
/// use std::path::Path;
///
/// use ttt_qlearn::adapters::InMemoryRepository;
/// use ttt_qlearn::ports::KnowledgeRepository;
/// use ttt_qlearn::q_learning::{Knowledge, QTable, TableKind};
///
/// let repo = InMemoryRepository::new();
/// let knowledge = Knowledge::new(QTable::new(TableKind::Sparse), 0.2);
///
/// repo.save(&knowledge, Path::new("agent"))?;
/// let loaded = repo.load(Path::new("agent"))?;
/// assert_eq!(loaded.epsilon, 0.2);
/// # Ok::<(), ttt_qlearn::Error>(())
/// ```
///
/// # Thread Safety
///
/// Clones share the same underlying storage.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A poisoned map is still a valid map of byte blobs
        self.storage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn key(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }

    /// Number of stored snapshots.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    /// Check if a snapshot exists at the given path.
    pub fn contains(&self, path: &Path) -> bool {
        self.storage().contains_key(&Self::key(path))
    }

    /// Store raw bytes at `path`, bypassing encoding.
    pub fn insert_raw(&self, path: &Path, bytes: Vec<u8>) {
        self.storage().insert(Self::key(path), bytes);
    }
}

impl KnowledgeRepository for InMemoryRepository {
    fn save(&self, knowledge: &Knowledge, path: &Path) -> Result<()> {
        let bytes = rmp_serde::to_vec(knowledge).map_err(|e| Error::KnowledgeSaveFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        self.storage().insert(Self::key(path), bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Knowledge> {
        let storage = self.storage();
        let bytes = storage
            .get(&Self::key(path))
            .ok_or_else(|| Error::KnowledgeNotFound {
                path: path.to_path_buf(),
            })?;

        let knowledge: Knowledge =
            rmp_serde::from_slice(bytes).map_err(|e| Error::KnowledgeCorrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        knowledge.validate(path)?;
        Ok(knowledge)
    }
}
