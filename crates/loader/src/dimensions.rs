//! Dimension extraction and surrogate key resolution.

use std::collections::{HashMap, HashSet};

use tracing::info;

use etl_common::{CleanedListing, EtlError, EtlResult};
use storage::{CuisineDim, LocationDim, RestaurantDim, RestaurantTypeDim, Warehouse};

/// Natural key to surrogate key lookup for one dimension.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    keys: HashMap<String, i64>,
}

impl KeyMap {
    /// Pair natural keys with the surrogate keys returned by the warehouse.
    pub fn from_inserted(natural: &[String], surrogate: Vec<i64>) -> EtlResult<Self> {
        if natural.len() != surrogate.len() {
            return Err(EtlError::InternalError(format!(
                "warehouse returned {} keys for {} rows",
                surrogate.len(),
                natural.len()
            )));
        }

        Ok(Self {
            keys: natural.iter().cloned().zip(surrogate).collect(),
        })
    }

    pub fn get(&self, natural: Option<&str>) -> Option<i64> {
        natural.and_then(|n| self.keys.get(n).copied())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Distinct non-null values in first-seen order.
pub fn distinct<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .flatten()
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Distinct locations, one per neighbourhood, in first-seen order.
pub fn distinct_locations(rows: &[CleanedListing]) -> Vec<LocationDim> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(|row| {
            let neighbourhood = row.location.as_deref()?;
            seen.insert(neighbourhood).then(|| LocationDim {
                neighbourhood: neighbourhood.to_string(),
                zone: row.zone,
            })
        })
        .collect()
}

/// Key maps for the four dimensions of one load.
#[derive(Debug, Clone, Default)]
pub struct Dimensions {
    pub locations: KeyMap,
    pub restaurants: KeyMap,
    pub cuisines: KeyMap,
    pub restaurant_types: KeyMap,
}

impl Dimensions {
    /// Extract every dimension from the cleaned rows, insert them and
    /// collect the assigned keys.
    pub async fn persist(warehouse: &dyn Warehouse, rows: &[CleanedListing]) -> EtlResult<Self> {
        let locations = distinct_locations(rows);
        let neighbourhoods: Vec<String> =
            locations.iter().map(|l| l.neighbourhood.clone()).collect();
        let location_keys = warehouse.insert_locations(&locations).await?;

        let names = distinct(rows.iter().map(|r| r.name.as_deref()));
        let restaurant_rows: Vec<RestaurantDim> = names
            .iter()
            .map(|name| RestaurantDim { name: name.clone() })
            .collect();
        let restaurant_keys = warehouse.insert_restaurants(&restaurant_rows).await?;

        let cuisines = distinct(rows.iter().map(|r| r.primary_cuisine.as_deref()));
        let cuisine_rows: Vec<CuisineDim> = cuisines
            .iter()
            .map(|c| CuisineDim { cuisine_name: c.clone() })
            .collect();
        let cuisine_keys = warehouse.insert_cuisines(&cuisine_rows).await?;

        let types = distinct(rows.iter().map(|r| r.rest_type.as_deref()));
        let type_rows: Vec<RestaurantTypeDim> = types
            .iter()
            .map(|t| RestaurantTypeDim { type_name: t.clone() })
            .collect();
        let type_keys = warehouse.insert_restaurant_types(&type_rows).await?;

        info!(
            locations = neighbourhoods.len(),
            restaurants = names.len(),
            cuisines = cuisines.len(),
            restaurant_types = types.len(),
            "Inserted dimensions"
        );

        Ok(Self {
            locations: KeyMap::from_inserted(&neighbourhoods, location_keys)?,
            restaurants: KeyMap::from_inserted(&names, restaurant_keys)?,
            cuisines: KeyMap::from_inserted(&cuisines, cuisine_keys)?,
            restaurant_types: KeyMap::from_inserted(&types, type_keys)?,
        })
    }
}
