//! Common types shared by the listings ETL stages.
//!
//! Each stage boundary is a typed schema: the transformer produces
//! [`CleanedListing`] rows from [`RawListing`] rows, and the loader reads
//! the same [`CleanedListing`] type back from the cleaned artifact.

pub mod artifact;
pub mod error;
pub mod listing;
pub mod zone;

pub use error::{EtlError, EtlResult};
pub use listing::{columns, CleanedListing, RawListing};
pub use zone::Zone;
