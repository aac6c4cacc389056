//! In-process warehouse for dry runs and tests.

use std::sync::Mutex;

use async_trait::async_trait;

use etl_common::{EtlError, EtlResult};

use crate::warehouse::{
    CuisineDim, FactRow, LocationDim, RestaurantDim, RestaurantTypeDim, TableCounts, Warehouse,
};

#[derive(Default)]
struct Tables {
    locations: Vec<LocationDim>,
    restaurants: Vec<RestaurantDim>,
    cuisines: Vec<CuisineDim>,
    restaurant_types: Vec<RestaurantTypeDim>,
    facts: Vec<FactRow>,
    schema_ready: bool,
}

/// Append rows and return 1-based keys continuing from the table's length.
fn append<T: Clone>(table: &mut Vec<T>, rows: &[T]) -> Vec<i64> {
    let start = table.len() as i64 + 1;
    table.extend_from_slice(rows);
    (start..start + rows.len() as i64).collect()
}

/// Warehouse that keeps every table in memory.
///
/// Keys are assigned sequentially from 1 per table, the way a fresh
/// `BIGSERIAL` column would.
#[derive(Default)]
pub struct MemoryWarehouse {
    tables: Mutex<Tables>,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> EtlResult<std::sync::MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| EtlError::InternalError("memory warehouse lock poisoned".to_string()))
    }

    fn require_schema(tables: &Tables) -> EtlResult<()> {
        if tables.schema_ready {
            Ok(())
        } else {
            Err(EtlError::DatabaseError(
                "relation does not exist; schema not created".to_string(),
            ))
        }
    }

    pub fn locations(&self) -> Vec<LocationDim> {
        self.lock().map(|t| t.locations.clone()).unwrap_or_default()
    }

    pub fn restaurants(&self) -> Vec<RestaurantDim> {
        self.lock().map(|t| t.restaurants.clone()).unwrap_or_default()
    }

    pub fn cuisines(&self) -> Vec<CuisineDim> {
        self.lock().map(|t| t.cuisines.clone()).unwrap_or_default()
    }

    pub fn restaurant_types(&self) -> Vec<RestaurantTypeDim> {
        self.lock().map(|t| t.restaurant_types.clone()).unwrap_or_default()
    }

    pub fn facts(&self) -> Vec<FactRow> {
        self.lock().map(|t| t.facts.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Warehouse for MemoryWarehouse {
    async fn ensure_schema(&self) -> EtlResult<()> {
        self.lock()?.schema_ready = true;
        Ok(())
    }

    async fn counts(&self) -> EtlResult<TableCounts> {
        let tables = self.lock()?;
        Self::require_schema(&tables)?;
        Ok(TableCounts {
            dim_location: tables.locations.len() as u64,
            dim_restaurant: tables.restaurants.len() as u64,
            dim_cuisine: tables.cuisines.len() as u64,
            dim_restaurant_type: tables.restaurant_types.len() as u64,
            fact_restaurant_performance: tables.facts.len() as u64,
        })
    }

    async fn truncate(&self) -> EtlResult<()> {
        let mut tables = self.lock()?;
        Self::require_schema(&tables)?;
        *tables = Tables {
            schema_ready: true,
            ..Tables::default()
        };
        Ok(())
    }

    async fn insert_locations(&self, rows: &[LocationDim]) -> EtlResult<Vec<i64>> {
        let mut tables = self.lock()?;
        Self::require_schema(&tables)?;
        Ok(append(&mut tables.locations, rows))
    }

    async fn insert_restaurants(&self, rows: &[RestaurantDim]) -> EtlResult<Vec<i64>> {
        let mut tables = self.lock()?;
        Self::require_schema(&tables)?;
        Ok(append(&mut tables.restaurants, rows))
    }

    async fn insert_cuisines(&self, rows: &[CuisineDim]) -> EtlResult<Vec<i64>> {
        let mut tables = self.lock()?;
        Self::require_schema(&tables)?;
        Ok(append(&mut tables.cuisines, rows))
    }

    async fn insert_restaurant_types(&self, rows: &[RestaurantTypeDim]) -> EtlResult<Vec<i64>> {
        let mut tables = self.lock()?;
        Self::require_schema(&tables)?;
        Ok(append(&mut tables.restaurant_types, rows))
    }

    async fn insert_facts(&self, rows: &[FactRow]) -> EtlResult<u64> {
        let mut tables = self.lock()?;
        Self::require_schema(&tables)?;

        let bound = |key: i64, len: usize| key >= 1 && key <= len as i64;
        for fact in rows {
            let valid = bound(fact.restaurant_id, tables.restaurants.len())
                && bound(fact.location_id, tables.locations.len())
                && fact.cuisine_id.map_or(true, |k| bound(k, tables.cuisines.len()))
                && fact
                    .rest_type_id
                    .map_or(true, |k| bound(k, tables.restaurant_types.len()));
            if !valid {
                return Err(EtlError::DatabaseError(format!(
                    "foreign key violation inserting fact {:?}",
                    fact
                )));
            }
        }

        tables.facts.extend_from_slice(rows);
        Ok(rows.len() as u64)
    }
}
