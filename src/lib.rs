//! Garden Sync - maintenance commands for the garden constants repo
//!
//! This crate implements the two maintenance jobs run against the constants
//! directory:
//!
//! - merging crop milestone deltas into `constants/Garden.json`, with
//!   crop-name normalization, equivalence-group propagation and
//!   noise suppression for low-precision historical values
//! - refreshing cached contributor display names in
//!   `constants/ContributorList.json` against the Mojang profile API

pub mod contributors;
pub mod crop;
pub mod delta;
pub mod merge;
pub mod pipeline;
pub mod table;

pub use contributors::{ContributorList, MojangClient, NameLookup};
pub use delta::Delta;
pub use merge::{MergeError, MergeOutcome};
pub use pipeline::run_milestone_update;
pub use table::GardenDocument;
