//! Raw listings fixtures.
//!
//! Rows follow the column layout of [`RAW_HEADER`], which mirrors the
//! source dump including the descriptive columns that get dropped.

/// Header of the raw listings file.
pub const RAW_HEADER: &str = "url,address,name,online_order,book_table,rate,votes,phone,location,rest_type,dish_liked,cuisines,approx_cost(for two people),reviews_list,menu_item,listed_in(type),listed_in(city)";

/// The canonical listing: Koramangala, rated 4.1, cost 1,200.
pub const SPICE_HUB: &str = "https://example.com/spice-hub,\"80 Feet Road, Koramangala\",Spice Hub,Yes,No,4.1/5,120,080 4000 0000,Koramangala,Casual Dining,\"Biryani, Kebab\",\"North Indian, Chinese\",\"1,200\",\"[('Rated 4.0', 'Good food')]\",[],Delivery,Koramangala";

/// A listing in a neighbourhood absent from the zone table.
pub const NOWHEREVILLE: &str = "https://example.com/lost-cafe,\"1 Main St\",Lost Cafe,No,No,NEW,0,,Nowhereville,Cafe,,Cafe,400,[],[],Cafes,Nowhereville";

/// A listing without a restaurant name.
pub const NAMELESS: &str = "https://example.com/unknown,\"2 Church Street\",,Yes,Yes,3.8/5,55,,Church Street,Bar,,\"Continental, Italian\",\"2,000\",[],[],Drinks & nightlife,MG Road";

/// A listing without a neighbourhood.
pub const NO_LOCATION: &str = "https://example.com/drifter,,Drifter Dhaba,Yes,No,-,3,,,Quick Bites,,North Indian,250,[],[],Delivery,";

/// A listing without cuisines or restaurant type.
pub const BARE: &str = "https://example.com/bare,\"Indiranagar\",Bare Kitchen,No,No,3.2/5,9,,Indiranagar,,,,600,[],[],Dine-out,Indiranagar";

/// Build a raw CSV document from fixture rows.
pub fn raw_csv(rows: &[&str]) -> String {
    let mut csv = String::from(RAW_HEADER);
    for row in rows {
        csv.push('\n');
        csv.push_str(row);
    }
    csv.push('\n');
    csv
}
