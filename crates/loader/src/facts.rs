//! Fact row construction and batched writes.

use tracing::debug;

use etl_common::{CleanedListing, EtlResult};
use storage::{FactRow, Warehouse};

use crate::dimensions::Dimensions;

/// Facts joined from the cleaned rows.
#[derive(Debug, Clone, Default)]
pub struct FactBuild {
    pub facts: Vec<FactRow>,
    /// Rows whose restaurant name or neighbourhood has no key.
    pub dropped: usize,
}

/// Join cleaned rows against the dimension keys.
pub fn build_facts(rows: &[CleanedListing], dims: &Dimensions) -> FactBuild {
    let mut build = FactBuild::default();

    for row in rows {
        let restaurant_id = dims.restaurants.get(row.name.as_deref());
        let location_id = dims.locations.get(row.location.as_deref());

        let (Some(restaurant_id), Some(location_id)) = (restaurant_id, location_id) else {
            build.dropped += 1;
            continue;
        };

        build.facts.push(FactRow {
            restaurant_id,
            location_id,
            cuisine_id: dims.cuisines.get(row.primary_cuisine.as_deref()),
            rest_type_id: dims.restaurant_types.get(row.rest_type.as_deref()),
            rating: row.rate,
            votes: row.votes,
            avg_cost_for_two: row.approx_cost_for_two,
            online_order_flag: row.online_order,
            book_table_flag: row.book_table,
        });
    }

    build
}

/// Insert facts in chunks of `batch_size`, returning the total written.
pub async fn write_facts(
    warehouse: &dyn Warehouse,
    facts: &[FactRow],
    batch_size: usize,
) -> EtlResult<u64> {
    let mut written = 0;
    for (index, batch) in facts.chunks(batch_size.max(1)).enumerate() {
        written += warehouse.insert_facts(batch).await?;
        debug!(batch = index, rows = batch.len(), "Wrote fact batch");
    }
    Ok(written)
}
