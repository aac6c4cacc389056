//! Shared test utilities for the listings ETL workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Raw listings CSV fixtures
//! - Temporary artifact files
//! - A skip macro for tests that need the full dataset
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, write_temp_csv};
//! ```

pub mod fixtures;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use paths::*;

/// Macro to skip a test if the full raw dataset is not available.
///
/// # Usage
///
/// ```ignore
/// use test_utils::require_dataset;
///
/// #[test]
/// fn test_full_dataset() {
///     let path = require_dataset!("zomato.csv");
///     // Test code using path...
/// }
/// ```
///
/// If the file is not found, the test will print a skip message and return early.
#[macro_export]
macro_rules! require_dataset {
    ($name:expr) => {{
        match $crate::find_dataset($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: Dataset '{}' not found. Place it under data/raw/ or set TEST_DATA_DIR.",
                    $name
                );
                return;
            }
        }
    }};
}

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(4.1000001_f64, 4.1_f64, 0.001_f64); // passes
/// assert_approx_eq!(4.2_f64, 4.1_f64, 0.001_f64);       // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}
