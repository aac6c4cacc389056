//! Warehouse loading for cleaned restaurant listings.
//!
//! # Architecture
//!
//! The [`Loader`] reads the cleaned artifact written by the transform
//! stage and:
//!
//! - Uploads it unchanged to object storage (S3)
//! - Extracts the location, restaurant, cuisine and restaurant-type dimensions
//! - Resolves surrogate keys and writes fact rows in batches
//!
//! Any [`storage::Warehouse`] works as the destination; the binary uses
//! PostgreSQL, dry runs and tests use the in-memory warehouse.

pub mod dimensions;
pub mod facts;
mod loader;
mod upload;

// Re-exports
pub use dimensions::{distinct, distinct_locations, Dimensions, KeyMap};
pub use facts::{build_facts, write_facts, FactBuild};
pub use loader::{LoadOptions, LoadReport, Loader};
pub use upload::upload_artifact;
