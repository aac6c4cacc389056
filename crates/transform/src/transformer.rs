//! The transform stage: raw table in, cleaned artifact out.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument, warn};

use etl_common::artifact::write_cleaned_path;
use etl_common::{CleanedListing, EtlResult, RawListing, Zone};

use crate::cuisine::primary_cuisine;
use crate::dedup::dedup_by_key;
use crate::normalize::{normalize_column, parse_cost, parse_flag, parse_rating, parse_votes};
use crate::raw::{RawColumns, RawTable};
use crate::zones::{ZoneResolver, ZoneTable};

/// Summary of a transform run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformReport {
    /// Rows read from the raw file
    pub rows_read: usize,
    /// Rows removed as exact duplicates
    pub duplicates_removed: usize,
    /// Rows in the cleaned output
    pub rows_written: usize,
    /// Cleaned rows per zone
    pub zone_distribution: BTreeMap<Zone, usize>,
    /// Neighbourhoods that fell back to `Other`, with row counts
    pub unmapped: Vec<(String, usize)>,
    /// Null count per cleaned column, only for columns with nulls
    pub null_counts: Vec<(String, usize)>,
    /// Size of the written artifact
    pub bytes_written: u64,
    /// Where the artifact was written
    pub output_path: Option<PathBuf>,
}

/// Cleaned rows plus the report describing how they were produced.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    pub rows: Vec<CleanedListing>,
    pub report: TransformReport,
}

/// A raw row with its normalized fields parsed.
struct NormalizedRow {
    cells: Vec<Option<String>>,
    rate: Option<f64>,
    cost: Option<f64>,
    online_order: Option<bool>,
    book_table: Option<bool>,
}

impl NormalizedRow {
    /// Whole-row duplicate key: every raw cell, with the normalized
    /// columns compared by their parsed values.
    fn dedup_key(&self, cols: &RawColumns) -> Vec<Option<String>> {
        let mut key = self.cells.clone();
        key[cols.rate] = self.rate.map(|v| v.to_string());
        key[cols.approx_cost] = self.cost.map(|v| v.to_string());
        key[cols.online_order] = self.online_order.map(|v| v.to_string());
        key[cols.book_table] = self.book_table.map(|v| v.to_string());
        key
    }
}

/// Cleans raw listings against a zone table.
pub struct Transformer {
    zones: ZoneTable,
}

impl Transformer {
    pub fn new(zones: ZoneTable) -> Self {
        Self { zones }
    }

    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    /// Read `raw_path`, clean it and write the artifact to `cleaned_path`.
    #[instrument(skip(self), fields(raw = %raw_path.display(), cleaned = %cleaned_path.display()))]
    pub fn run(&self, raw_path: &Path, cleaned_path: &Path) -> EtlResult<TransformReport> {
        let table = RawTable::read_path(raw_path)?;
        info!(rows = table.len(), columns = table.width(), "Loaded raw table");

        let CleanedTable { rows, mut report } = self.clean(table)?;

        report.bytes_written = write_cleaned_path(cleaned_path, &rows)?;
        report.output_path = Some(cleaned_path.to_path_buf());

        info!(
            rows = report.rows_written,
            bytes = report.bytes_written,
            "Wrote cleaned artifact"
        );
        Ok(report)
    }

    /// Clean a raw table in memory.
    ///
    /// Order of operations: normalize rating/cost/flags, drop duplicate
    /// rows, then derive zone and primary cuisine and project onto the
    /// cleaned schema.
    pub fn clean(&self, table: RawTable) -> EtlResult<CleanedTable> {
        let cols = RawColumns::resolve(&table)?;
        let rows_read = table.len();

        let rates = normalize_column(&column_at(&table, cols.rate), parse_rating);
        let costs = normalize_column(&column_at(&table, cols.approx_cost), parse_cost);
        let online = normalize_column(&column_at(&table, cols.online_order), parse_flag);
        let booking = normalize_column(&column_at(&table, cols.book_table), parse_flag);

        let normalized: Vec<NormalizedRow> = table
            .into_rows()
            .into_iter()
            .zip(rates)
            .zip(costs)
            .zip(online)
            .zip(booking)
            .map(|((((cells, rate), cost), online_order), book_table)| NormalizedRow {
                cells,
                rate,
                cost,
                online_order,
                book_table,
            })
            .collect();

        let deduped = dedup_by_key(normalized, |row| row.dedup_key(&cols));
        let duplicates_removed = rows_read - deduped.len();

        let mut resolver = ZoneResolver::new(&self.zones);
        let rows: Vec<CleanedListing> = deduped
            .into_iter()
            .map(|row| {
                let raw = cols.listing(&row.cells);
                let zone = resolver.resolve(raw.location.as_deref());
                build_cleaned(raw, &row, zone)
            })
            .collect();

        let unmapped = resolver.unmapped();
        if !unmapped.is_empty() {
            warn!(
                count = unmapped.len(),
                names = ?unmapped.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
                "Neighbourhoods without a zone mapping"
            );
        }

        let report = TransformReport {
            rows_read,
            duplicates_removed,
            rows_written: rows.len(),
            zone_distribution: resolver.distribution().clone(),
            unmapped,
            null_counts: null_counts(&rows),
            bytes_written: 0,
            output_path: None,
        };

        info!(
            rows_read,
            duplicates_removed,
            rows_written = report.rows_written,
            "Cleaned raw table"
        );

        Ok(CleanedTable { rows, report })
    }
}

fn column_at(table: &RawTable, idx: usize) -> Vec<Option<&str>> {
    table.rows().iter().map(|row| row[idx].as_deref()).collect()
}

fn build_cleaned(raw: RawListing, row: &NormalizedRow, zone: Zone) -> CleanedListing {
    let primary = primary_cuisine(raw.cuisines.as_deref());
    let votes = raw.votes.as_deref().and_then(parse_votes);

    CleanedListing {
        url: raw.url,
        address: raw.address,
        name: raw.name,
        online_order: row.online_order,
        book_table: row.book_table,
        rate: row.rate,
        votes,
        location: raw.location,
        rest_type: raw.rest_type,
        cuisines: raw.cuisines,
        approx_cost_for_two: row.cost,
        listed_in_type: raw.listed_in_type,
        listed_in_city: raw.listed_in_city,
        zone,
        primary_cuisine: primary,
    }
}

/// Null count per column, in artifact column order, skipping columns
/// without nulls.
fn null_counts(rows: &[CleanedListing]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for row in rows {
        for column in row.null_columns() {
            if let Some(pos) = CleanedListing::COLUMNS.iter().position(|c| *c == column) {
                *counts.entry(pos).or_default() += 1;
            }
        }
    }

    counts
        .into_iter()
        .map(|(pos, count)| (CleanedListing::COLUMNS[pos].to_string(), count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "name,online_order,book_table,rate,votes,location,rest_type,cuisines,approx_cost(for two people),menu_item";

    fn transformer() -> Transformer {
        Transformer::new(ZoneTable::builtin().unwrap())
    }

    fn table(rows: &[&str]) -> RawTable {
        let mut csv = String::from(HEADER);
        for row in rows {
            csv.push('\n');
            csv.push_str(row);
        }
        csv.push('\n');
        RawTable::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_duplicates_removed_before_derivation() {
        let row = "Spice Hub,Yes,No,4.1/5,10,Koramangala,Casual Dining,\"North Indian, Chinese\",\"1,200\",[]";
        let cleaned = transformer().clean(table(&[row, row])).unwrap();

        assert_eq!(cleaned.report.rows_read, 2);
        assert_eq!(cleaned.report.duplicates_removed, 1);
        assert_eq!(cleaned.rows.len(), 1);
    }

    #[test]
    fn test_normalized_encodings_count_as_duplicates() {
        let a = "Spice Hub,Yes,No,4.1/5,10,Koramangala,Cafe,Cafe,\"1,200\",[]";
        let b = "Spice Hub,Yes,No,4.1 /5,10,Koramangala,Cafe,Cafe,1200,[]";
        let cleaned = transformer().clean(table(&[a, b])).unwrap();
        assert_eq!(cleaned.rows.len(), 1);
    }

    #[test]
    fn test_dropped_columns_still_distinguish_rows() {
        let a = "Spice Hub,Yes,No,4.1/5,10,Koramangala,Cafe,Cafe,300,[a]";
        let b = "Spice Hub,Yes,No,4.1/5,10,Koramangala,Cafe,Cafe,300,[b]";
        let cleaned = transformer().clean(table(&[a, b])).unwrap();
        assert_eq!(cleaned.rows.len(), 2);
    }

    #[test]
    fn test_unparseable_fields_become_null() {
        let row = "Nook,Maybe,No,NEW,lots,BTM,Cafe,,free,[]";
        let cleaned = transformer().clean(table(&[row])).unwrap();
        let listing = &cleaned.rows[0];

        assert_eq!(listing.rate, None);
        assert_eq!(listing.online_order, None);
        assert_eq!(listing.book_table, Some(false));
        assert_eq!(listing.votes, None);
        assert_eq!(listing.approx_cost_for_two, None);
        assert_eq!(listing.primary_cuisine, None);
        assert_eq!(listing.zone, Zone::South);
    }

    #[test]
    fn test_zone_fallback_reported() {
        let a = "Nook,Yes,No,3.0/5,1,Nowhereville,Cafe,Cafe,300,[]";
        let b = "Nook,Yes,No,3.0/5,1,,Cafe,Cafe,300,[]";
        let cleaned = transformer().clean(table(&[a, b])).unwrap();

        assert!(cleaned.rows.iter().all(|r| r.zone == Zone::Other));
        assert_eq!(cleaned.report.unmapped, vec![("Nowhereville".to_string(), 1)]);
        assert_eq!(cleaned.report.zone_distribution.get(&Zone::Other), Some(&2));
    }

    #[test]
    fn test_null_counts_in_column_order() {
        let row = "Nook,Yes,No,NEW,1,BTM,,Cafe,300,[]";
        let cleaned = transformer().clean(table(&[row])).unwrap();
        let names: Vec<&str> = cleaned
            .report
            .null_counts
            .iter()
            .map(|(n, _)| n.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["url", "address", "rate", "rest_type", "listed_in_type", "listed_in_city"]
        );
    }
}
