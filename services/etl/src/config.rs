//! ETL configuration.

use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use etl_common::{EtlError, EtlResult};
use storage::{ObjectStorageConfig, WarehouseConfig};

/// Top-level ETL configuration, built once at start-up.
#[derive(Debug, Clone, Serialize)]
pub struct EtlConfig {
    /// Raw listings CSV
    pub raw_path: PathBuf,

    /// Cleaned artifact written by transform and read by load
    pub cleaned_path: PathBuf,

    /// Object storage configuration
    pub storage: ObjectStorageConfig,

    /// Object key of the uploaded artifact
    pub object_key: String,

    /// Warehouse connection
    pub warehouse: WarehouseConfig,

    /// Fact rows per insert statement
    pub fact_batch_size: usize,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            raw_path: PathBuf::from("data/raw/zomato.csv"),
            cleaned_path: PathBuf::from("data/cleaned/zomato_cleaned.csv"),
            storage: ObjectStorageConfig::default(),
            object_key: "zomato/cleaned/zomato_cleaned.csv".to_string(),
            warehouse: WarehouseConfig::default(),
            fact_batch_size: 1000,
        }
    }
}

impl EtlConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> EtlResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup, falling back to defaults
    /// for unset keys.
    pub fn from_lookup<F>(lookup: F) -> EtlResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage = ObjectStorageConfig {
            endpoint: var("AWS_ENDPOINT_URL"),
            bucket: var("AWS_S3_BUCKET").unwrap_or(defaults.storage.bucket),
            access_key_id: var("AWS_ACCESS_KEY_ID"),
            secret_access_key: var("AWS_SECRET_ACCESS_KEY"),
            region: var("AWS_REGION").unwrap_or(defaults.storage.region),
            allow_http: match var("AWS_ALLOW_HTTP") {
                Some(v) => parse_bool("AWS_ALLOW_HTTP", &v)?,
                None => defaults.storage.allow_http,
            },
        };

        let warehouse = WarehouseConfig {
            host: var("RDS_HOST").unwrap_or(defaults.warehouse.host),
            port: parse_var("RDS_PORT", var("RDS_PORT"), defaults.warehouse.port)?,
            dbname: var("RDS_DBNAME").unwrap_or(defaults.warehouse.dbname),
            user: var("RDS_USER").unwrap_or(defaults.warehouse.user),
            password: lookup("RDS_PASSWORD").unwrap_or_default(),
        };

        let fact_batch_size = parse_var(
            "ETL_FACT_BATCH_SIZE",
            var("ETL_FACT_BATCH_SIZE"),
            defaults.fact_batch_size,
        )?;
        if fact_batch_size == 0 {
            return Err(EtlError::InvalidConfig(
                "ETL_FACT_BATCH_SIZE must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            raw_path: var("ETL_RAW_PATH").map(PathBuf::from).unwrap_or(defaults.raw_path),
            cleaned_path: var("ETL_CLEANED_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cleaned_path),
            storage,
            object_key: var("AWS_S3_KEY").unwrap_or(defaults.object_key),
            warehouse,
            fact_batch_size,
        })
    }
}

fn parse_var<T: FromStr>(key: &str, value: Option<String>, default: T) -> EtlResult<T> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| EtlError::InvalidConfig(format!("{} is not a valid number: '{}'", key, v))),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, value: &str) -> EtlResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(EtlError::InvalidConfig(format!(
            "{} must be true or false: '{}'",
            key, value
        ))),
    }
}
