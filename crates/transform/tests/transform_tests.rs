//! Transform stage tests against raw CSV fixtures.

use etl_common::artifact::{read_artifact_bytes, read_cleaned};
use etl_common::{EtlError, Zone};
use test_utils::{
    assert_approx_eq, raw_csv, require_dataset, temp_test_dir, write_temp_csv, BARE, NAMELESS,
    NOWHEREVILLE, NO_LOCATION, SPICE_HUB,
};
use transform::{RawTable, Transformer, ZoneTable};

fn transformer() -> Transformer {
    Transformer::new(ZoneTable::builtin().unwrap())
}

// ============================================================================
// End-to-end through the artifact
// ============================================================================

#[test]
fn test_spice_hub_scenario() {
    let dir = temp_test_dir();
    let raw = write_temp_csv(&dir, "raw.csv", &raw_csv(&[SPICE_HUB, SPICE_HUB]));
    let cleaned_path = dir.path().join("cleaned/zomato_cleaned.csv");

    let report = transformer().run(&raw, &cleaned_path).unwrap();
    assert_eq!(report.rows_read, 2);
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.rows_written, 1);
    assert!(report.bytes_written > 0);

    let bytes = read_artifact_bytes(&cleaned_path).unwrap();
    let rows = read_cleaned(bytes.as_slice()).unwrap();
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_approx_eq!(row.rate.unwrap(), 4.1, 1e-9);
    assert_eq!(row.approx_cost_for_two, Some(1200.0));
    assert_eq!(row.online_order, Some(true));
    assert_eq!(row.book_table, Some(false));
    assert_eq!(row.votes, Some(120));
    assert_eq!(row.zone, Zone::South);
    assert_eq!(row.primary_cuisine.as_deref(), Some("North Indian"));
    assert_eq!(row.listed_in_type.as_deref(), Some("Delivery"));
}

#[test]
fn test_dropped_columns_absent_from_artifact() {
    let dir = temp_test_dir();
    let raw = write_temp_csv(&dir, "raw.csv", &raw_csv(&[SPICE_HUB]));
    let cleaned_path = dir.path().join("cleaned.csv");

    transformer().run(&raw, &cleaned_path).unwrap();

    let text = std::fs::read_to_string(&cleaned_path).unwrap();
    let header = text.lines().next().unwrap();
    for dropped in ["phone", "dish_liked", "menu_item", "reviews_list"] {
        assert!(!header.split(',').any(|c| c == dropped), "{} still present", dropped);
    }
    assert!(header.ends_with("zone,primary_cuisine"));
}

#[test]
fn test_missing_raw_file() {
    let dir = temp_test_dir();
    let err = transformer()
        .run(&dir.path().join("absent.csv"), &dir.path().join("out.csv"))
        .unwrap_err();
    assert!(matches!(err, EtlError::MissingArtifact(_)));
    assert!(!dir.path().join("out.csv").exists());
}

#[test]
fn test_schema_drift_detected() {
    let dir = temp_test_dir();
    let raw = write_temp_csv(&dir, "raw.csv", "name,location\nSpice Hub,BTM\n");
    let err = transformer().run(&raw, &dir.path().join("out.csv")).unwrap_err();
    assert!(matches!(err, EtlError::MissingColumn(_)));
}

// ============================================================================
// Invariants over a mixed table
// ============================================================================

#[test]
fn test_invariants() {
    let csv = raw_csv(&[SPICE_HUB, NOWHEREVILLE, NAMELESS, NO_LOCATION, BARE, SPICE_HUB]);
    let table = RawTable::from_reader(csv.as_bytes()).unwrap();
    let before = table.len();

    let cleaned = transformer().clean(table).unwrap();
    assert!(cleaned.rows.len() <= before);
    assert_eq!(cleaned.rows.len(), 5);

    for row in &cleaned.rows {
        assert_eq!(row.primary_cuisine.is_none(), row.cuisines.is_none());
    }
}

#[test]
fn test_unmapped_and_missing_locations() {
    let csv = raw_csv(&[NOWHEREVILLE, NO_LOCATION]);
    let cleaned = transformer()
        .clean(RawTable::from_reader(csv.as_bytes()).unwrap())
        .unwrap();

    assert_eq!(cleaned.rows[0].zone, Zone::Other);
    assert_eq!(cleaned.rows[1].zone, Zone::Other);
    assert_eq!(cleaned.rows[1].location, None);
    assert_eq!(cleaned.report.unmapped, vec![("Nowhereville".to_string(), 1)]);
}

#[test]
fn test_sentinel_ratings() {
    let csv = raw_csv(&[NOWHEREVILLE, NO_LOCATION]);
    let cleaned = transformer()
        .clean(RawTable::from_reader(csv.as_bytes()).unwrap())
        .unwrap();
    assert!(cleaned.rows.iter().all(|r| r.rate.is_none()));
}

#[test]
fn test_custom_zone_table() {
    let mut zones = ZoneTable::builtin().unwrap();
    zones
        .extend(ZoneTable::from_yaml_str("North:\n  - Nowhereville\n").unwrap())
        .unwrap();

    let csv = raw_csv(&[NOWHEREVILLE]);
    let cleaned = Transformer::new(zones)
        .clean(RawTable::from_reader(csv.as_bytes()).unwrap())
        .unwrap();
    assert_eq!(cleaned.rows[0].zone, Zone::North);
    assert!(cleaned.report.unmapped.is_empty());
}

#[test]
fn test_dedup_idempotent() {
    let fixtures = [SPICE_HUB, SPICE_HUB, BARE, NOWHEREVILLE, BARE];
    let first = transformer()
        .clean(RawTable::from_reader(raw_csv(&fixtures).as_bytes()).unwrap())
        .unwrap();
    assert_eq!(first.report.duplicates_removed, 2);

    // Raw rows behind the surviving listings, in output order.
    let survivors: Vec<&str> = first
        .rows
        .iter()
        .map(|row| {
            let url = row.url.as_deref().unwrap();
            *fixtures.iter().find(|f| f.starts_with(url)).unwrap()
        })
        .collect();
    assert_eq!(survivors, vec![SPICE_HUB, BARE, NOWHEREVILLE]);

    let second = transformer()
        .clean(RawTable::from_reader(raw_csv(&survivors).as_bytes()).unwrap())
        .unwrap();
    assert_eq!(second.report.duplicates_removed, 0);
    assert_eq!(second.rows, first.rows);
}

// ============================================================================
// Full dataset (skipped when not present)
// ============================================================================

#[test]
fn test_full_dataset() {
    let path = require_dataset!("zomato.csv");
    let table = RawTable::read_path(&path).unwrap();
    let before = table.len();

    let cleaned = transformer().clean(table).unwrap();
    assert!(cleaned.rows.len() <= before);
    assert!(cleaned.rows.iter().all(|r| r.rate.map_or(true, |v| (0.0..=5.0).contains(&v))));
}
