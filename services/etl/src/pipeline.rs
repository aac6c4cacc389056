//! Stage runners shared by the CLI subcommands.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use etl_common::{EtlError, EtlResult};
use loader::{LoadOptions, LoadReport, Loader};
use storage::{MemoryWarehouse, ObjectStorage, PgWarehouse, Warehouse};
use transform::{ProfileReport, TransformReport, Transformer, ZoneTable};

use crate::config::EtlConfig;

/// How an external zone file combines with the built-in table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneSource<'a> {
    Builtin,
    Extend(&'a Path),
    Replace(&'a Path),
}

/// Build the zone table for a transform run.
pub fn zone_table(source: ZoneSource<'_>) -> EtlResult<ZoneTable> {
    match source {
        ZoneSource::Builtin => ZoneTable::builtin(),
        ZoneSource::Extend(path) => {
            let mut table = ZoneTable::builtin()?;
            table.extend(ZoneTable::from_yaml_file(path)?)?;
            Ok(table)
        }
        ZoneSource::Replace(path) => ZoneTable::from_yaml_file(path),
    }
}

pub fn profile(raw_path: &Path) -> EtlResult<ProfileReport> {
    transform::profile_path(raw_path)
}

pub fn transform(
    raw_path: &Path,
    cleaned_path: &Path,
    zones: ZoneSource<'_>,
) -> EtlResult<TransformReport> {
    let table = zone_table(zones)?;
    info!(entries = table.len(), "Loaded zone table");
    Transformer::new(table).run(raw_path, cleaned_path)
}

/// Flags of the load subcommand.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadFlags {
    pub truncate: bool,
    pub dry_run: bool,
}

/// Run the load stage.
///
/// A dry run loads into an in-memory warehouse and never touches S3 or
/// PostgreSQL.
pub async fn load(config: &EtlConfig, cleaned_path: &Path, flags: LoadFlags) -> EtlResult<LoadReport> {
    let options = LoadOptions {
        object_key: config.object_key.clone(),
        truncate: flags.truncate,
        dry_run: flags.dry_run,
        fact_batch_size: config.fact_batch_size,
    };

    let (storage, warehouse): (ObjectStorage, Arc<dyn Warehouse>) = if flags.dry_run {
        info!("Dry run: using in-memory warehouse");
        (
            ObjectStorage::in_memory(&config.storage.bucket),
            Arc::new(MemoryWarehouse::new()),
        )
    } else {
        // Missing artifact must fail before any connection is opened.
        if !cleaned_path.exists() {
            return Err(EtlError::MissingArtifact(cleaned_path.display().to_string()));
        }
        let storage = ObjectStorage::new(&config.storage)?;
        let warehouse = PgWarehouse::connect(&config.warehouse).await?;
        (storage, Arc::new(warehouse))
    };

    Loader::new(Arc::new(storage), warehouse, options)
        .run(cleaned_path)
        .await
}
