//! Storage backends for the listings ETL.
//!
//! Provides:
//! - Object storage (S3 compatible) for the cleaned artifact
//! - The star-schema warehouse, in PostgreSQL or in memory

pub mod memory;
pub mod object_store;
pub mod postgres;
pub mod warehouse;

pub use self::object_store::{ObjectStorage, ObjectStorageConfig};
pub use memory::MemoryWarehouse;
pub use postgres::{PgWarehouse, WarehouseConfig};
pub use warehouse::{
    CuisineDim, FactRow, LocationDim, RestaurantDim, RestaurantTypeDim, TableCounts, Warehouse,
};
