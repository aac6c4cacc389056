//! Typed row schemas for the raw and cleaned listing tables.

use serde::{Deserialize, Serialize};

use crate::Zone;

/// Column names of the raw listings file.
pub mod columns {
    pub const URL: &str = "url";
    pub const ADDRESS: &str = "address";
    pub const NAME: &str = "name";
    pub const ONLINE_ORDER: &str = "online_order";
    pub const BOOK_TABLE: &str = "book_table";
    pub const RATE: &str = "rate";
    pub const VOTES: &str = "votes";
    pub const PHONE: &str = "phone";
    pub const LOCATION: &str = "location";
    pub const REST_TYPE: &str = "rest_type";
    pub const DISH_LIKED: &str = "dish_liked";
    pub const CUISINES: &str = "cuisines";
    pub const APPROX_COST: &str = "approx_cost(for two people)";
    pub const REVIEWS_LIST: &str = "reviews_list";
    pub const MENU_ITEM: &str = "menu_item";
    pub const LISTED_IN_TYPE: &str = "listed_in(type)";
    pub const LISTED_IN_CITY: &str = "listed_in(city)";

    /// Columns the transformer cannot run without.
    pub const REQUIRED: [&str; 9] = [
        NAME,
        ONLINE_ORDER,
        BOOK_TABLE,
        RATE,
        VOTES,
        LOCATION,
        REST_TYPE,
        CUISINES,
        APPROX_COST,
    ];

    /// Descriptive columns that never reach the cleaned artifact.
    pub const DROPPED: [&str; 4] = [REVIEWS_LIST, MENU_ITEM, DISH_LIKED, PHONE];
}

/// One row of the raw listings file, restricted to the columns the
/// pipeline reads. Empty cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListing {
    pub url: Option<String>,
    pub address: Option<String>,
    pub name: Option<String>,
    pub online_order: Option<String>,
    pub book_table: Option<String>,
    pub rate: Option<String>,
    pub votes: Option<String>,
    pub location: Option<String>,
    pub rest_type: Option<String>,
    pub cuisines: Option<String>,
    pub approx_cost: Option<String>,
    pub listed_in_type: Option<String>,
    pub listed_in_city: Option<String>,
}

/// One row of the cleaned artifact.
///
/// Field order is the artifact's column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedListing {
    pub url: Option<String>,
    pub address: Option<String>,
    pub name: Option<String>,
    pub online_order: Option<bool>,
    pub book_table: Option<bool>,
    pub rate: Option<f64>,
    pub votes: Option<i64>,
    pub location: Option<String>,
    pub rest_type: Option<String>,
    pub cuisines: Option<String>,
    pub approx_cost_for_two: Option<f64>,
    pub listed_in_type: Option<String>,
    pub listed_in_city: Option<String>,
    pub zone: Zone,
    pub primary_cuisine: Option<String>,
}

impl CleanedListing {
    /// Column names in artifact order.
    pub const COLUMNS: [&'static str; 15] = [
        "url",
        "address",
        "name",
        "online_order",
        "book_table",
        "rate",
        "votes",
        "location",
        "rest_type",
        "cuisines",
        "approx_cost_for_two",
        "listed_in_type",
        "listed_in_city",
        "zone",
        "primary_cuisine",
    ];

    /// Names of the columns that are null in this row.
    pub fn null_columns(&self) -> Vec<&'static str> {
        let flags = [
            self.url.is_none(),
            self.address.is_none(),
            self.name.is_none(),
            self.online_order.is_none(),
            self.book_table.is_none(),
            self.rate.is_none(),
            self.votes.is_none(),
            self.location.is_none(),
            self.rest_type.is_none(),
            self.cuisines.is_none(),
            self.approx_cost_for_two.is_none(),
            self.listed_in_type.is_none(),
            self.listed_in_city.is_none(),
            false,
            self.primary_cuisine.is_none(),
        ];

        Self::COLUMNS
            .iter()
            .zip(flags)
            .filter_map(|(name, is_null)| is_null.then_some(*name))
            .collect()
    }
}
