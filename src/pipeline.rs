//! Milestone update pipeline
//!
//! One run is strictly linear: load the table, run the two merge passes,
//! diff against the pre-merge snapshot, persist atomically. No state
//! survives a run except the table file itself.

use std::path::Path;

use crate::delta::{self, SourceError};
use crate::merge::{self, MergeError, MergeOutcome};
use crate::table::{GardenDocument, TableError};

/// Errors for a milestone update run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("delta source: {0}")]
    Source(#[from] SourceError),

    #[error("table: {0}")]
    Table(#[from] TableError),

    #[error("merge: {0}")]
    Merge(#[from] MergeError),
}

/// Run a full milestone update: load, merge, persist.
///
/// The table file is only rewritten after both passes succeed, via the
/// document's write-then-rename protocol, so a failed run leaves it intact.
pub fn run_milestone_update(
    table_path: &Path,
    delta_path: &Path,
) -> Result<MergeOutcome, PipelineError> {
    let mut doc = GardenDocument::from_file(table_path)?;
    let deltas = delta::load_source(delta_path)?;

    let outcome = merge::merge(&mut doc.crop_milestones, &deltas)?;

    doc.write_to_file(table_path)?;
    Ok(outcome)
}
