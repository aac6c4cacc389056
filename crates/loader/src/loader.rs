//! The load stage: upload the cleaned artifact and populate the warehouse.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use etl_common::artifact::{read_artifact_bytes, read_cleaned};
use etl_common::{EtlError, EtlResult};
use storage::{ObjectStorage, TableCounts, Warehouse};

use crate::dimensions::Dimensions;
use crate::facts::{build_facts, write_facts};
use crate::upload::upload_artifact;

/// Options for a load run.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Object key the artifact is uploaded to
    pub object_key: String,
    /// Empty all five tables before inserting
    pub truncate: bool,
    /// Skip the upload
    pub dry_run: bool,
    /// Fact rows per insert statement
    pub fact_batch_size: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            object_key: "zomato/cleaned/zomato_cleaned.csv".to_string(),
            truncate: false,
            dry_run: false,
            fact_batch_size: 1000,
        }
    }
}

/// Result of a load run.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Cleaned rows read from the artifact
    pub rows_read: usize,
    /// Size of the artifact in bytes
    pub artifact_bytes: u64,
    /// Where the artifact was uploaded, `None` on a dry run
    pub uploaded_to: Option<String>,
    /// Whether existing warehouse rows were truncated first
    pub truncated: bool,
    /// Rows inserted per table
    pub inserted: TableCounts,
    /// Cleaned rows with no restaurant or location key
    pub facts_dropped: usize,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Loads a cleaned artifact into object storage and the warehouse.
pub struct Loader {
    /// Object storage client for the artifact upload
    storage: Arc<ObjectStorage>,
    /// Star-schema destination
    warehouse: Arc<dyn Warehouse>,
    options: LoadOptions,
}

impl Loader {
    pub fn new(
        storage: Arc<ObjectStorage>,
        warehouse: Arc<dyn Warehouse>,
        options: LoadOptions,
    ) -> Self {
        Self {
            storage,
            warehouse,
            options,
        }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Run the load stage against the artifact at `cleaned_path`.
    ///
    /// A missing artifact fails before anything is uploaded or written.
    #[instrument(skip(self), fields(path = %cleaned_path.display(), dry_run = self.options.dry_run))]
    pub async fn run(&self, cleaned_path: &Path) -> EtlResult<LoadReport> {
        let started_at = Utc::now();

        let data = read_artifact_bytes(cleaned_path)?;
        let artifact_bytes = data.len() as u64;
        let rows = read_cleaned(data.as_slice())?;
        info!(rows = rows.len(), bytes = artifact_bytes, "Read cleaned artifact");

        let uploaded_to = if self.options.dry_run {
            None
        } else {
            Some(upload_artifact(&self.storage, &self.options.object_key, data).await?)
        };

        let warehouse = self.warehouse.as_ref();
        warehouse.ensure_schema().await?;
        let truncated = self.prepare_warehouse(warehouse).await?;

        let dims = Dimensions::persist(warehouse, &rows).await?;
        let build = build_facts(&rows, &dims);
        if build.dropped > 0 {
            warn!(
                dropped = build.dropped,
                "Rows without a restaurant name or neighbourhood excluded from facts"
            );
        }
        let facts_written = write_facts(warehouse, &build.facts, self.options.fact_batch_size).await?;

        let inserted = TableCounts {
            dim_location: dims.locations.len() as u64,
            dim_restaurant: dims.restaurants.len() as u64,
            dim_cuisine: dims.cuisines.len() as u64,
            dim_restaurant_type: dims.restaurant_types.len() as u64,
            fact_restaurant_performance: facts_written,
        };
        info!(
            facts = facts_written,
            total = inserted.total(),
            "Warehouse load complete"
        );

        Ok(LoadReport {
            rows_read: rows.len(),
            artifact_bytes,
            uploaded_to,
            truncated,
            inserted,
            facts_dropped: build.dropped,
            dry_run: self.options.dry_run,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Empty the warehouse when asked to, otherwise require it to be empty.
    ///
    /// Returns whether a truncate ran.
    async fn prepare_warehouse(&self, warehouse: &dyn Warehouse) -> EtlResult<bool> {
        if self.options.truncate {
            warehouse.truncate().await?;
            info!("Truncated warehouse tables");
            return Ok(true);
        }

        let counts = warehouse.counts().await?;
        if !counts.is_empty() {
            let populated: Vec<String> = counts
                .entries()
                .iter()
                .filter(|(_, count)| *count > 0)
                .map(|(table, count)| format!("{}={}", table, count))
                .collect();
            return Err(EtlError::WarehouseNotEmpty(populated.join(", ")));
        }

        Ok(false)
    }
}
