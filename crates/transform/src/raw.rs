//! Raw listings table: every column of the source file, as text.

use std::io::Read;
use std::path::Path;

use etl_common::{columns, EtlError, EtlResult, RawListing};

/// Cell contents read as missing, in addition to the empty string.
const NULL_MARKERS: [&str; 11] = [
    "NA", "N/A", "n/a", "#N/A", "NULL", "null", "NaN", "nan", "None", "<NA>", "-NaN",
];

/// The raw table, kept whole so duplicate detection can compare every
/// column, including the ones later dropped.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Read a raw CSV file.
    pub fn read_path(path: &Path) -> EtlResult<Self> {
        if !path.exists() {
            return Err(EtlError::MissingArtifact(path.display().to_string()));
        }
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Read a raw CSV from any reader. Short rows are padded with nulls;
    /// rows wider than the header are an error.
    pub fn from_reader<R: Read>(reader: R) -> EtlResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(String::from).collect();
        let width = headers.len();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            if record.len() > width {
                let line = record.position().map_or(0, |p| p.line());
                return Err(EtlError::Csv(format!(
                    "line {}: expected {} fields, saw {}",
                    line,
                    width,
                    record.len()
                )));
            }
            let mut cells: Vec<Option<String>> = record.iter().map(cell_value).collect();
            cells.resize(width, None);
            rows.push(cells);
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<Option<String>>> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// All values of one column, or `None` if the column is absent.
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_deref()).collect())
    }
}

fn cell_value(raw: &str) -> Option<String> {
    if raw.is_empty() || NULL_MARKERS.contains(&raw) {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Positions of the known columns within a raw table's header.
#[derive(Debug, Clone)]
pub struct RawColumns {
    pub url: Option<usize>,
    pub address: Option<usize>,
    pub name: usize,
    pub online_order: usize,
    pub book_table: usize,
    pub rate: usize,
    pub votes: usize,
    pub location: usize,
    pub rest_type: usize,
    pub cuisines: usize,
    pub approx_cost: usize,
    pub listed_in_type: Option<usize>,
    pub listed_in_city: Option<usize>,
}

impl RawColumns {
    /// Resolve column positions, failing on the first missing required column.
    pub fn resolve(table: &RawTable) -> EtlResult<Self> {
        let required = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| EtlError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            url: table.column_index(columns::URL),
            address: table.column_index(columns::ADDRESS),
            name: required(columns::NAME)?,
            online_order: required(columns::ONLINE_ORDER)?,
            book_table: required(columns::BOOK_TABLE)?,
            rate: required(columns::RATE)?,
            votes: required(columns::VOTES)?,
            location: required(columns::LOCATION)?,
            rest_type: required(columns::REST_TYPE)?,
            cuisines: required(columns::CUISINES)?,
            approx_cost: required(columns::APPROX_COST)?,
            listed_in_type: table.column_index(columns::LISTED_IN_TYPE),
            listed_in_city: table.column_index(columns::LISTED_IN_CITY),
        })
    }

    /// Project a raw row onto the typed raw schema.
    pub fn listing(&self, cells: &[Option<String>]) -> RawListing {
        let get = |idx: usize| cells.get(idx).cloned().flatten();
        let get_opt = |idx: Option<usize>| idx.and_then(get);

        RawListing {
            url: get_opt(self.url),
            address: get_opt(self.address),
            name: get(self.name),
            online_order: get(self.online_order),
            book_table: get(self.book_table),
            rate: get(self.rate),
            votes: get(self.votes),
            location: get(self.location),
            rest_type: get(self.rest_type),
            cuisines: get(self.cuisines),
            approx_cost: get(self.approx_cost),
            listed_in_type: get_opt(self.listed_in_type),
            listed_in_city: get_opt(self.listed_in_city),
        }
    }
}
