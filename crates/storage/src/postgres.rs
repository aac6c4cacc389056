//! PostgreSQL warehouse.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use tracing::{debug, info, instrument};

use etl_common::{EtlError, EtlResult};

use crate::warehouse::{
    CuisineDim, FactRow, LocationDim, RestaurantDim, RestaurantTypeDim, TableCounts, Warehouse,
};

/// Connection parameters for the warehouse database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "zomatodb".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
        }
    }
}

impl WarehouseConfig {
    /// `host:port/dbname`, without credentials, for logs.
    pub fn display_target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.dbname)
    }

    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.dbname)
            .username(&self.user)
            .password(&self.password)
    }
}

/// Warehouse backed by a PostgreSQL connection pool.
pub struct PgWarehouse {
    pool: PgPool,
}

impl PgWarehouse {
    /// Connect and verify the connection with a trivial query.
    pub async fn connect(config: &WarehouseConfig) -> EtlResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(config.connect_options())
            .await
            .map_err(|e| EtlError::DatabaseError(format!("Connection failed: {}", e)))?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(|e| EtlError::DatabaseError(format!("Connection check failed: {}", e)))?;

        info!(target_db = %config.display_target(), "Connected to warehouse");
        Ok(Self { pool })
    }

    async fn count(&self, table: &str) -> EtlResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| EtlError::DatabaseError(format!("Count failed: {}", e)))?;
        Ok(count as u64)
    }
}

/// Map `(key, natural key)` pairs returned by an insert back onto the
/// input order.
fn align_keys(
    natural_keys: &[&str],
    returned: Vec<(i64, String)>,
    table: &str,
) -> EtlResult<Vec<i64>> {
    let by_name: HashMap<String, i64> = returned.into_iter().map(|(id, name)| (name, id)).collect();

    natural_keys
        .iter()
        .map(|name| {
            by_name.get(*name).copied().ok_or_else(|| {
                EtlError::DatabaseError(format!("{}: no key returned for '{}'", table, name))
            })
        })
        .collect()
}

#[async_trait]
impl Warehouse for PgWarehouse {
    async fn ensure_schema(&self) -> EtlResult<()> {
        // Split SQL statements and execute them individually
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| EtlError::DatabaseError(format!("Schema setup failed: {}", e)))?;
            }
        }

        Ok(())
    }

    async fn counts(&self) -> EtlResult<TableCounts> {
        Ok(TableCounts {
            dim_location: self.count("dim_location").await?,
            dim_restaurant: self.count("dim_restaurant").await?,
            dim_cuisine: self.count("dim_cuisine").await?,
            dim_restaurant_type: self.count("dim_restaurant_type").await?,
            fact_restaurant_performance: self.count("fact_restaurant_performance").await?,
        })
    }

    #[instrument(skip(self))]
    async fn truncate(&self) -> EtlResult<()> {
        sqlx::query(
            "TRUNCATE fact_restaurant_performance, dim_location, dim_restaurant, \
             dim_cuisine, dim_restaurant_type RESTART IDENTITY CASCADE",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| EtlError::DatabaseError(format!("Truncate failed: {}", e)))?;

        Ok(())
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn insert_locations(&self, rows: &[LocationDim]) -> EtlResult<Vec<i64>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let neighbourhoods: Vec<String> = rows.iter().map(|r| r.neighbourhood.clone()).collect();
        let zones: Vec<String> = rows.iter().map(|r| r.zone.to_string()).collect();

        let returned = sqlx::query_as::<_, (i64, String)>(
            "INSERT INTO dim_location (neighbourhood, zone) \
             SELECT * FROM UNNEST($1::text[], $2::text[]) \
             RETURNING location_id, neighbourhood",
        )
        .bind(&neighbourhoods)
        .bind(&zones)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EtlError::DatabaseError(format!("Insert failed: {}", e)))?;

        let keys: Vec<&str> = neighbourhoods.iter().map(String::as_str).collect();
        align_keys(&keys, returned, "dim_location")
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn insert_restaurants(&self, rows: &[RestaurantDim]) -> EtlResult<Vec<i64>> {
        let names: Vec<String> = rows.iter().map(|r| r.name.clone()).collect();
        self.insert_names("dim_restaurant", "restaurant_id", "name", names).await
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn insert_cuisines(&self, rows: &[CuisineDim]) -> EtlResult<Vec<i64>> {
        let names: Vec<String> = rows.iter().map(|r| r.cuisine_name.clone()).collect();
        self.insert_names("dim_cuisine", "cuisine_id", "cuisine_name", names).await
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn insert_restaurant_types(&self, rows: &[RestaurantTypeDim]) -> EtlResult<Vec<i64>> {
        let names: Vec<String> = rows.iter().map(|r| r.type_name.clone()).collect();
        self.insert_names("dim_restaurant_type", "rest_type_id", "type_name", names).await
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn insert_facts(&self, rows: &[FactRow]) -> EtlResult<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "INSERT INTO fact_restaurant_performance (\
                restaurant_id, location_id, cuisine_id, rest_type_id, \
                rating, votes, avg_cost_for_two, online_order_flag, book_table_flag\
             ) SELECT * FROM UNNEST(\
                $1::bigint[], $2::bigint[], $3::bigint[], $4::bigint[], \
                $5::float8[], $6::bigint[], $7::float8[], $8::bool[], $9::bool[]\
             )",
        )
        .bind(rows.iter().map(|r| r.restaurant_id).collect::<Vec<i64>>())
        .bind(rows.iter().map(|r| r.location_id).collect::<Vec<i64>>())
        .bind(rows.iter().map(|r| r.cuisine_id).collect::<Vec<Option<i64>>>())
        .bind(rows.iter().map(|r| r.rest_type_id).collect::<Vec<Option<i64>>>())
        .bind(rows.iter().map(|r| r.rating).collect::<Vec<Option<f64>>>())
        .bind(rows.iter().map(|r| r.votes).collect::<Vec<Option<i64>>>())
        .bind(rows.iter().map(|r| r.avg_cost_for_two).collect::<Vec<Option<f64>>>())
        .bind(rows.iter().map(|r| r.online_order_flag).collect::<Vec<Option<bool>>>())
        .bind(rows.iter().map(|r| r.book_table_flag).collect::<Vec<Option<bool>>>())
        .execute(&self.pool)
        .await
        .map_err(|e| EtlError::DatabaseError(format!("Insert failed: {}", e)))?;

        debug!(inserted = result.rows_affected(), "Inserted fact batch");
        Ok(result.rows_affected())
    }
}

impl PgWarehouse {
    /// Insert into a single-column name dimension.
    async fn insert_names(
        &self,
        table: &str,
        key_column: &str,
        name_column: &str,
        names: Vec<String>,
    ) -> EtlResult<Vec<i64>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "INSERT INTO {table} ({name_column}) SELECT * FROM UNNEST($1::text[]) \
             RETURNING {key_column}, {name_column}"
        );
        let returned = sqlx::query_as::<_, (i64, String)>(&sql)
            .bind(&names)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| EtlError::DatabaseError(format!("Insert into {} failed: {}", table, e)))?;

        let keys: Vec<&str> = names.iter().map(String::as_str).collect();
        align_keys(&keys, returned, table)
    }
}

/// Star schema DDL.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS dim_location (
    location_id BIGSERIAL PRIMARY KEY,
    neighbourhood TEXT NOT NULL,
    zone VARCHAR(20) NOT NULL
);

CREATE TABLE IF NOT EXISTS dim_restaurant (
    restaurant_id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS dim_cuisine (
    cuisine_id BIGSERIAL PRIMARY KEY,
    cuisine_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS dim_restaurant_type (
    rest_type_id BIGSERIAL PRIMARY KEY,
    type_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS fact_restaurant_performance (
    fact_id BIGSERIAL PRIMARY KEY,
    restaurant_id BIGINT NOT NULL REFERENCES dim_restaurant(restaurant_id),
    location_id BIGINT NOT NULL REFERENCES dim_location(location_id),
    cuisine_id BIGINT REFERENCES dim_cuisine(cuisine_id),
    rest_type_id BIGINT REFERENCES dim_restaurant_type(rest_type_id),
    rating DOUBLE PRECISION,
    votes BIGINT,
    avg_cost_for_two DOUBLE PRECISION,
    online_order_flag BOOLEAN,
    book_table_flag BOOLEAN
);

CREATE INDEX IF NOT EXISTS idx_fact_restaurant ON fact_restaurant_performance(restaurant_id);
CREATE INDEX IF NOT EXISTS idx_fact_location ON fact_restaurant_performance(location_id)
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_keys_follows_input_order() {
        let returned = vec![(2, "b".to_string()), (1, "a".to_string())];
        let keys = align_keys(&["a", "b"], returned, "dim_test").unwrap();
        assert_eq!(keys, vec![1, 2]);
    }

    #[test]
    fn test_align_keys_missing_name() {
        let returned = vec![(1, "a".to_string())];
        let err = align_keys(&["a", "b"], returned, "dim_test").unwrap_err();
        assert!(err.to_string().contains("dim_test"));
    }

    #[test]
    fn test_schema_has_five_tables() {
        let creates = SCHEMA_SQL.matches("CREATE TABLE IF NOT EXISTS").count();
        assert_eq!(creates, 5);
    }

    #[test]
    fn test_display_target_hides_password() {
        let config = WarehouseConfig {
            password: "hunter2".to_string(),
            ..Default::default()
        };
        assert_eq!(config.display_target(), "localhost:5432/zomatodb");
        assert!(!config.display_target().contains("hunter2"));
    }
}
