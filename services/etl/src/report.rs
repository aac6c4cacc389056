//! Human-readable stage summaries printed to stdout.

use std::fmt::{self, Display, Formatter};

use etl_common::Zone;
use loader::LoadReport;
use transform::profile::ValueCount;
use transform::{ProfileReport, TransformReport};

fn section(f: &mut Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "\n{}\n{}", title, "-".repeat(title.len()))
}

fn value_table(f: &mut Formatter<'_>, values: &[ValueCount]) -> fmt::Result {
    for v in values {
        writeln!(f, "  {:<40} {:>8}", v.value, v.count)?;
    }
    Ok(())
}

/// Text form of a [`ProfileReport`].
pub struct ProfileSummary<'a>(pub &'a ProfileReport);

impl Display for ProfileSummary<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(f, "Shape: {} rows x {} columns", report.rows, report.columns)?;

        section(f, "Columns")?;
        for (name, kind) in &report.column_types {
            writeln!(f, "  {:<40} {}", name, kind)?;
        }

        section(f, "Null values")?;
        if report.nulls.is_empty() {
            writeln!(f, "  none")?;
        }
        for n in &report.nulls {
            writeln!(f, "  {:<40} {:>8} ({:.1}%)", n.column, n.null_count, n.null_pct)?;
        }

        section(f, "Rating values (top 20)")?;
        value_table(f, &report.rate_values)?;

        section(f, "Cost for two values (top 15)")?;
        value_table(f, &report.cost_values)?;

        section(f, "Restaurant types")?;
        value_table(f, &report.rest_types)?;

        section(f, &format!("Neighbourhoods ({} unique)", report.locations.len()))?;
        for location in &report.locations {
            writeln!(f, "  {}", location)?;
        }

        section(f, "Primary cuisines (top 20)")?;
        value_table(f, &report.top_primary_cuisines)?;

        writeln!(f, "\nDuplicate rows: {}", report.duplicate_rows)
    }
}

/// Text form of a [`TransformReport`].
pub struct TransformSummary<'a>(pub &'a TransformReport);

impl Display for TransformSummary<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(f, "Rows read:          {}", report.rows_read)?;
        writeln!(f, "Duplicates removed: {}", report.duplicates_removed)?;
        writeln!(f, "Rows written:       {}", report.rows_written)?;
        if let Some(path) = &report.output_path {
            writeln!(f, "Artifact:           {} ({} bytes)", path.display(), report.bytes_written)?;
        }

        section(f, "Zone distribution")?;
        for zone in Zone::ALL {
            let count = report.zone_distribution.get(&zone).copied().unwrap_or(0);
            writeln!(f, "  {:<10} {:>8}", zone, count)?;
        }

        if !report.unmapped.is_empty() {
            section(f, "Unmapped neighbourhoods (assigned Other)")?;
            for (name, count) in &report.unmapped {
                writeln!(f, "  {:<40} {:>8}", name, count)?;
            }
        }

        section(f, "Null counts after cleaning")?;
        if report.null_counts.is_empty() {
            writeln!(f, "  none")?;
        }
        for (column, count) in &report.null_counts {
            writeln!(f, "  {:<40} {:>8}", column, count)?;
        }
        Ok(())
    }
}

/// Text form of a [`LoadReport`].
pub struct LoadSummary<'a>(pub &'a LoadReport);

impl Display for LoadSummary<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let report = self.0;
        if report.dry_run {
            writeln!(f, "Dry run: nothing uploaded, warehouse held in memory")?;
        }
        writeln!(f, "Rows read: {} ({} bytes)", report.rows_read, report.artifact_bytes)?;
        if let Some(uri) = &report.uploaded_to {
            writeln!(f, "Uploaded:  {}", uri)?;
        }
        if report.truncated {
            writeln!(f, "Existing warehouse rows truncated")?;
        }

        section(f, "Rows inserted")?;
        for (table, count) in report.inserted.entries() {
            writeln!(f, "  {:<30} {:>8}", table, count)?;
        }
        writeln!(
            f,
            "\nRows excluded from facts (no restaurant name or neighbourhood): {}",
            report.facts_dropped
        )?;
        let elapsed = report.finished_at - report.started_at;
        writeln!(
            f,
            "Finished at {} in {} ms",
            report.finished_at.to_rfc3339(),
            elapsed.num_milliseconds()
        )
    }
}

pub fn render_profile(report: &ProfileReport) -> String {
    ProfileSummary(report).to_string()
}

pub fn render_transform(report: &TransformReport) -> String {
    TransformSummary(report).to_string()
}

pub fn render_load(report: &LoadReport) -> String {
    LoadSummary(report).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use storage::TableCounts;

    #[test]
    fn test_transform_lists_every_zone() {
        let mut zones = BTreeMap::new();
        zones.insert(Zone::South, 3);
        let report = TransformReport {
            rows_read: 4,
            duplicates_removed: 1,
            rows_written: 3,
            zone_distribution: zones,
            unmapped: vec![("Nowhereville".to_string(), 1)],
            ..Default::default()
        };

        let text = render_transform(&report);
        for zone in Zone::ALL {
            assert!(text.contains(zone.as_str()));
        }
        assert!(text.contains("Nowhereville"));
        assert!(text.contains("Duplicates removed: 1"));
    }

    #[test]
    fn test_profile_summary_sections() {
        let report = ProfileReport {
            rows: 2,
            columns: 1,
            column_types: vec![("name".to_string(), "text")],
            nulls: Vec::new(),
            rate_values: Vec::new(),
            cost_values: Vec::new(),
            rest_types: vec![ValueCount {
                value: "Cafe".to_string(),
                count: 2,
            }],
            locations: vec!["BTM".to_string()],
            top_primary_cuisines: Vec::new(),
            duplicate_rows: 0,
        };

        let text = render_profile(&report);
        assert_eq!(text, ProfileSummary(&report).to_string());
        assert!(text.starts_with("Shape: 2 rows x 1 columns\n"));
        assert!(text.contains("Null values\n-----------\n  none\n"));
        assert!(text.contains("Neighbourhoods (1 unique)"));
        assert!(text.ends_with("Duplicate rows: 0\n"));
    }

    #[test]
    fn test_load_dry_run_banner() {
        let now = Utc::now();
        let report = LoadReport {
            rows_read: 1,
            artifact_bytes: 10,
            uploaded_to: None,
            truncated: false,
            inserted: TableCounts {
                fact_restaurant_performance: 1,
                ..Default::default()
            },
            facts_dropped: 0,
            dry_run: true,
            started_at: now,
            finished_at: now,
        };

        let text = render_load(&report);
        assert!(text.starts_with("Dry run"));
        assert!(text.contains("fact_restaurant_performance"));
        assert!(!text.contains("Uploaded"));
    }
}
