//! Reading and writing the cleaned listings artifact.
//!
//! The transformer writes and the loader reads through these functions,
//! so both sides agree on the column set of [`CleanedListing`].

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use crate::{CleanedListing, EtlError, EtlResult};

/// Serialize cleaned rows as CSV with a header row.
///
/// The header is written even when there are no rows.
pub fn write_cleaned<W: Write>(writer: W, rows: &[CleanedListing]) -> EtlResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(CleanedListing::COLUMNS)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write cleaned rows to `path`, creating parent directories.
///
/// Returns the size of the written file in bytes.
pub fn write_cleaned_path(path: &Path, rows: &[CleanedListing]) -> EtlResult<u64> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = fs::File::create(path)?;
    write_cleaned(std::io::BufWriter::new(file), rows)?;
    Ok(fs::metadata(path)?.len())
}

/// Parse cleaned rows from CSV.
pub fn read_cleaned<R: Read>(reader: R) -> EtlResult<Vec<CleanedListing>> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for column in CleanedListing::COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(EtlError::MissingColumn(column.to_string()));
        }
    }

    let mut rows = Vec::new();
    for record in csv_reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

/// Read an artifact's raw bytes, failing with `MissingArtifact` when the
/// file does not exist.
pub fn read_artifact_bytes(path: &Path) -> EtlResult<Vec<u8>> {
    if !path.exists() {
        return Err(EtlError::MissingArtifact(path.display().to_string()));
    }
    Ok(fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Zone;

    fn row(name: Option<&str>, rate: Option<f64>) -> CleanedListing {
        CleanedListing {
            url: None,
            address: Some("12, 1st Cross, Koramangala".to_string()),
            name: name.map(String::from),
            online_order: Some(true),
            book_table: Some(false),
            rate,
            votes: Some(42),
            location: Some("Koramangala".to_string()),
            rest_type: Some("Casual Dining".to_string()),
            cuisines: Some("North Indian, Chinese".to_string()),
            approx_cost_for_two: Some(1200.0),
            listed_in_type: Some("Delivery".to_string()),
            listed_in_city: None,
            zone: Zone::South,
            primary_cuisine: Some("North Indian".to_string()),
        }
    }

    #[test]
    fn test_header_written_for_empty_table() {
        let mut out = Vec::new();
        write_cleaned(&mut out, &[]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.trim_end(), CleanedListing::COLUMNS.join(","));
    }

    #[test]
    fn test_nulls_survive_the_artifact() {
        let rows = vec![row(Some("Spice Hub"), Some(4.1)), row(None, None)];
        let mut out = Vec::new();
        write_cleaned(&mut out, &rows).unwrap();

        let parsed = read_cleaned(out.as_slice()).unwrap();
        assert_eq!(parsed, rows);
        assert_eq!(parsed[1].name, None);
        assert_eq!(parsed[1].rate, None);
    }

    #[test]
    fn test_missing_column_detected() {
        let csv = "name,zone\nSpice Hub,South\n";
        let err = read_cleaned(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, EtlError::MissingColumn(_)));
    }

    #[test]
    fn test_missing_artifact() {
        let err = read_artifact_bytes(Path::new("/nonexistent/cleaned.csv")).unwrap_err();
        assert!(matches!(err, EtlError::MissingArtifact(_)));
    }
}
