//! Persistable snapshot of what an agent has learned

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, q_learning::q_table::QTable};

/// Value table plus the exploration rate it was saved with.
///
/// Field order is the on-disk order: the table first, then the trailing
/// epsilon. There is no version field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Knowledge {
    pub table: QTable,
    pub epsilon: f64,
}

impl Knowledge {
    pub fn new(table: QTable, epsilon: f64) -> Self {
        Self { table, epsilon }
    }

    /// Check a freshly decoded snapshot before an agent adopts it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KnowledgeCorrupt`] for a dense table of the wrong size,
    /// non-finite values, or an epsilon outside `[0, 1]`.
    pub fn validate(&self, path: &Path) -> Result<()> {
        if !self.table.is_well_formed() {
            return Err(Error::KnowledgeCorrupt {
                path: path.to_path_buf(),
                reason: "value table has the wrong shape or non-finite entries".to_string(),
            });
        }
        if !(self.epsilon.is_finite() && (0.0..=1.0).contains(&self.epsilon)) {
            return Err(Error::KnowledgeCorrupt {
                path: path.to_path_buf(),
                reason: format!("stored epsilon {} is outside [0, 1]", self.epsilon),
            });
        }
        Ok(())
    }
}
