//! Milestone table document (Garden.json)
//!
//! Garden.json carries more than milestones; everything outside
//! `crop_milestones` is preserved untouched through a load/save cycle.
//! Persistence is write-to-temp-then-rename so an interrupted run never
//! leaves a half-written table behind.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Milestone thresholds per crop, indexed by tier.
pub type MilestoneTable = BTreeMap<String, Vec<u64>>;

/// The Garden.json document: the milestone table plus whatever other
/// constants the file carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GardenDocument {
    pub crop_milestones: MilestoneTable,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Errors for table document I/O
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GardenDocument {
    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from file
    pub fn from_file(path: &Path) -> Result<Self, TableError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Write atomically to file (write-then-rename)
    pub fn write_to_file(&self, path: &Path) -> Result<(), TableError> {
        let json = self.to_json()?;

        // Write to temp file first
        let temp_path = temp_path_for(path);
        fs::write(&temp_path, &json)?;

        // Atomic rename
        fs::rename(&temp_path, path)?;

        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".new");
    path.with_file_name(name)
}
