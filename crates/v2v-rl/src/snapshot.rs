//! On-disk model snapshot

use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use v2v_core::{Result, V2VError};

use crate::codec::StateKey;
use crate::policy::PerformanceStats;
use crate::q_table::ActionValues;

/// Persisted Q-table, exploration rate, and informational stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub q_table: BTreeMap<StateKey, ActionValues>,
    pub epsilon: f64,
    #[serde(default)]
    pub stats: PerformanceStats,
}

impl ModelSnapshot {
    /// Reject values that parse but cannot be restored
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(V2VError::Deserialization(format!(
                "epsilon must be within [0, 1], got {}",
                self.epsilon
            )));
        }
        Ok(())
    }

    /// Parse and validate a snapshot from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| V2VError::Deserialization(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Read a snapshot file
    pub fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Write the snapshot next to `path` and rename it into place
    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer(&mut writer, self)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| V2VError::Io(e.error))?;
        Ok(())
    }
}
