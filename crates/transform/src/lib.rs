//! Restaurant listings cleaning library.
//!
//! Turns the raw listings file into the cleaned artifact:
//!
//! - Field normalization (rating, cost, Yes/No flags, votes)
//! - Whole-row deduplication
//! - Zone lookup from a reviewable YAML table
//! - Primary cuisine extraction
//!
//! It also hosts the read-only profiler for the raw file.

pub mod cuisine;
pub mod dedup;
pub mod normalize;
pub mod profile;
pub mod raw;
mod transformer;
pub mod zones;

// Re-exports
pub use profile::{profile, profile_path, ProfileReport};
pub use raw::RawTable;
pub use transformer::{CleanedTable, TransformReport, Transformer};
pub use zones::{ZoneResolver, ZoneTable};
