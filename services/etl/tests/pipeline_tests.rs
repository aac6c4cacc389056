//! Tests for the stage runners behind the `etl` subcommands.
//!
//! Load tests use dry runs, so no S3 bucket or PostgreSQL server is needed.

use etl_common::{EtlError, Zone};
use etl_service::config::EtlConfig;
use etl_service::pipeline::{self, LoadFlags, ZoneSource};
use etl_service::report;
use test_utils::{raw_csv, temp_test_dir, write_temp_csv, NOWHEREVILLE, SPICE_HUB};

// ============================================================================
// Zone table sources
// ============================================================================

#[test]
fn test_zone_file_extends_builtin() {
    let dir = temp_test_dir();
    let zones = write_temp_csv(&dir, "zones.yaml", "West:\n  - Nowhereville\n");

    let table = pipeline::zone_table(ZoneSource::Extend(&zones)).unwrap();
    assert_eq!(table.resolve(Some("Nowhereville")), Zone::West);
    assert_eq!(table.resolve(Some("Koramangala")), Zone::South);
}

#[test]
fn test_zone_file_replaces_builtin() {
    let dir = temp_test_dir();
    let zones = write_temp_csv(&dir, "zones.yaml", "West:\n  - Nowhereville\n");

    let table = pipeline::zone_table(ZoneSource::Replace(&zones)).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.resolve(Some("Koramangala")), Zone::Other);
}

#[test]
fn test_conflicting_zone_file() {
    let dir = temp_test_dir();
    let zones = write_temp_csv(&dir, "zones.yaml", "North:\n  - Koramangala\n");

    let err = pipeline::zone_table(ZoneSource::Extend(&zones)).unwrap_err();
    assert!(matches!(err, EtlError::InvalidConfig(_)));
}

// ============================================================================
// Transform then load
// ============================================================================

#[tokio::test]
async fn test_transform_then_dry_run_load() {
    let dir = temp_test_dir();
    let raw = write_temp_csv(&dir, "raw.csv", &raw_csv(&[SPICE_HUB, SPICE_HUB, NOWHEREVILLE]));
    let cleaned = dir.path().join("cleaned/zomato_cleaned.csv");

    let transform = pipeline::transform(&raw, &cleaned, ZoneSource::Builtin).unwrap();
    assert_eq!(transform.rows_written, 2);
    assert!(report::render_transform(&transform).contains("Nowhereville"));

    let flags = LoadFlags {
        dry_run: true,
        ..Default::default()
    };
    let load = pipeline::load(&EtlConfig::default(), &cleaned, flags)
        .await
        .unwrap();
    assert!(load.uploaded_to.is_none());
    assert_eq!(load.inserted.dim_location, 2);
    assert_eq!(load.inserted.fact_restaurant_performance, 2);
    assert!(report::render_load(&load).contains("Dry run"));
}

#[tokio::test]
async fn test_load_missing_artifact_before_connecting() {
    let dir = temp_test_dir();
    let mut config = EtlConfig::default();
    // Unroutable; reaching it would fail with a database error instead.
    config.warehouse.host = "203.0.113.1".to_string();

    let err = pipeline::load(&config, &dir.path().join("absent.csv"), LoadFlags::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EtlError::MissingArtifact(_)));
    assert_eq!(err.exit_code(), 3);
}

// ============================================================================
// Profile
// ============================================================================

#[test]
fn test_profile_renders_text_and_json() {
    let dir = temp_test_dir();
    let raw = write_temp_csv(&dir, "raw.csv", &raw_csv(&[SPICE_HUB, SPICE_HUB, NOWHEREVILLE]));

    let profile = pipeline::profile(&raw).unwrap();
    assert_eq!(profile.duplicate_rows, 1);

    let text = report::render_profile(&profile);
    assert!(text.starts_with("Shape: 3 rows x 17 columns"));
    assert!(text.contains("Duplicate rows: 1"));

    let json: serde_json::Value = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["rows"], 3);
    assert_eq!(json["duplicate_rows"], 1);
}
