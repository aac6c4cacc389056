//! Diagnostic profile of the raw listings file.
//!
//! Read-only: nothing here feeds the cleaned artifact.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::Serialize;
use tracing::instrument;

use etl_common::{columns, EtlResult};

use crate::cuisine::primary_cuisine;
use crate::dedup::count_duplicates;
use crate::raw::RawTable;

/// Label used for missing values in value counts.
pub const NULL_LABEL: &str = "<null>";

/// Null statistics for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnNulls {
    pub column: String,
    pub null_count: usize,
    /// Percentage of rows, rounded to one decimal
    pub null_pct: f64,
}

/// One entry of a value count table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Shape, nulls, and value distributions of the raw table.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub rows: usize,
    pub columns: usize,
    /// Column name and inferred type ("int", "float" or "text")
    pub column_types: Vec<(String, &'static str)>,
    /// Columns with at least one null, most nulls first
    pub nulls: Vec<ColumnNulls>,
    pub rate_values: Vec<ValueCount>,
    pub cost_values: Vec<ValueCount>,
    pub rest_types: Vec<ValueCount>,
    pub locations: Vec<String>,
    pub top_primary_cuisines: Vec<ValueCount>,
    pub duplicate_rows: usize,
}

/// Profile the raw file at `path`.
#[instrument]
pub fn profile_path(path: &Path) -> EtlResult<ProfileReport> {
    let table = RawTable::read_path(path)?;
    Ok(profile(&table))
}

/// Profile an in-memory raw table.
pub fn profile(table: &RawTable) -> ProfileReport {
    let rows = table.len();

    let column_types = table
        .headers()
        .iter()
        .map(|name| {
            let values = table.column(name).unwrap_or_default();
            (name.clone(), infer_type(&values))
        })
        .collect();

    let mut nulls: Vec<ColumnNulls> = table
        .headers()
        .iter()
        .filter_map(|name| {
            let null_count = table.column(name)?.iter().filter(|v| v.is_none()).count();
            (null_count > 0).then(|| ColumnNulls {
                column: name.clone(),
                null_count,
                null_pct: percentage(null_count, rows),
            })
        })
        .collect();
    nulls.sort_by(|a, b| b.null_count.cmp(&a.null_count).then_with(|| a.column.cmp(&b.column)));

    let column = |name: &str| table.column(name).unwrap_or_default();

    let locations: BTreeSet<String> = column(columns::LOCATION)
        .into_iter()
        .flatten()
        .map(String::from)
        .collect();

    let primaries: Vec<String> = column(columns::CUISINES)
        .into_iter()
        .filter_map(|c| primary_cuisine(c))
        .collect();
    let primaries: Vec<Option<&str>> = primaries.iter().map(|s| Some(s.as_str())).collect();

    ProfileReport {
        rows,
        columns: table.width(),
        column_types,
        nulls,
        rate_values: value_counts(&column(columns::RATE), Some(20), true),
        cost_values: value_counts(&column(columns::APPROX_COST), Some(15), true),
        rest_types: value_counts(&column(columns::REST_TYPE), None, true),
        locations: locations.into_iter().collect(),
        top_primary_cuisines: value_counts(&primaries, Some(20), false),
        duplicate_rows: count_duplicates(table.rows(), |row| row.clone()),
    }
}

/// Count distinct values, most frequent first, ties by value.
pub fn value_counts(
    values: &[Option<&str>],
    limit: Option<usize>,
    include_null: bool,
) -> Vec<ValueCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        match *value {
            Some(v) => *counts.entry(v).or_default() += 1,
            None if include_null => *counts.entry(NULL_LABEL).or_default() += 1,
            None => {}
        }
    }

    let mut counts: Vec<ValueCount> = counts
        .into_iter()
        .map(|(value, count)| ValueCount {
            value: value.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

    if let Some(limit) = limit {
        counts.truncate(limit);
    }
    counts
}

fn infer_type(values: &[Option<&str>]) -> &'static str {
    let present: Vec<&str> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        "text"
    } else if present.iter().all(|v| v.parse::<i64>().is_ok()) {
        "int"
    } else if present.iter().all(|v| v.parse::<f64>().is_ok()) {
        "float"
    } else {
        "text"
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 1000.0).round() / 10.0
}
