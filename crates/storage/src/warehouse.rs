//! Star-schema warehouse rows and the sink trait the loader writes through.

use async_trait::async_trait;
use serde::Serialize;

use etl_common::{EtlResult, Zone};

/// Names of the warehouse tables.
pub mod tables {
    pub const DIM_LOCATION: &str = "dim_location";
    pub const DIM_RESTAURANT: &str = "dim_restaurant";
    pub const DIM_CUISINE: &str = "dim_cuisine";
    pub const DIM_RESTAURANT_TYPE: &str = "dim_restaurant_type";
    pub const FACT_RESTAURANT_PERFORMANCE: &str = "fact_restaurant_performance";
}

/// A `dim_location` row, keyed naturally by neighbourhood and zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationDim {
    pub neighbourhood: String,
    pub zone: Zone,
}

/// A `dim_restaurant` row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RestaurantDim {
    pub name: String,
}

/// A `dim_cuisine` row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CuisineDim {
    pub cuisine_name: String,
}

/// A `dim_restaurant_type` row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RestaurantTypeDim {
    pub type_name: String,
}

/// A `fact_restaurant_performance` row.
///
/// Restaurant and location keys are mandatory; cuisine and type may be
/// unresolved.
#[derive(Debug, Clone, PartialEq)]
pub struct FactRow {
    pub restaurant_id: i64,
    pub location_id: i64,
    pub cuisine_id: Option<i64>,
    pub rest_type_id: Option<i64>,
    pub rating: Option<f64>,
    pub votes: Option<i64>,
    pub avg_cost_for_two: Option<f64>,
    pub online_order_flag: Option<bool>,
    pub book_table_flag: Option<bool>,
}

/// Row count of each warehouse table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub dim_location: u64,
    pub dim_restaurant: u64,
    pub dim_cuisine: u64,
    pub dim_restaurant_type: u64,
    pub fact_restaurant_performance: u64,
}

impl TableCounts {
    pub fn total(&self) -> u64 {
        self.dim_location
            + self.dim_restaurant
            + self.dim_cuisine
            + self.dim_restaurant_type
            + self.fact_restaurant_performance
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// `(table, count)` pairs in load order.
    pub fn entries(&self) -> [(&'static str, u64); 5] {
        [
            (tables::DIM_LOCATION, self.dim_location),
            (tables::DIM_RESTAURANT, self.dim_restaurant),
            (tables::DIM_CUISINE, self.dim_cuisine),
            (tables::DIM_RESTAURANT_TYPE, self.dim_restaurant_type),
            (tables::FACT_RESTAURANT_PERFORMANCE, self.fact_restaurant_performance),
        ]
    }
}

/// Destination for dimension and fact rows.
///
/// Every insert appends. Dimension inserts return the surrogate key of
/// each row, in input order.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Create the five tables if they do not exist.
    async fn ensure_schema(&self) -> EtlResult<()>;

    /// Current row counts.
    async fn counts(&self) -> EtlResult<TableCounts>;

    /// Remove all rows and restart key sequences.
    async fn truncate(&self) -> EtlResult<()>;

    async fn insert_locations(&self, rows: &[LocationDim]) -> EtlResult<Vec<i64>>;

    async fn insert_restaurants(&self, rows: &[RestaurantDim]) -> EtlResult<Vec<i64>>;

    async fn insert_cuisines(&self, rows: &[CuisineDim]) -> EtlResult<Vec<i64>>;

    async fn insert_restaurant_types(&self, rows: &[RestaurantTypeDim]) -> EtlResult<Vec<i64>>;

    /// Append fact rows, returning how many were written.
    async fn insert_facts(&self, rows: &[FactRow]) -> EtlResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_total() {
        let counts = TableCounts {
            dim_location: 1,
            dim_restaurant: 2,
            dim_cuisine: 3,
            dim_restaurant_type: 4,
            fact_restaurant_performance: 5,
        };
        assert_eq!(counts.total(), 15);
        assert!(!counts.is_empty());
        assert!(TableCounts::default().is_empty());
        assert_eq!(counts.entries()[4], ("fact_restaurant_performance", 5));
    }
}
