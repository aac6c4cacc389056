//! Restaurant listings ETL service library.
//!
//! Configuration, stage runners and report rendering behind the `etl`
//! binary.

pub mod config;
pub mod pipeline;
pub mod report;
