pub mod connection;
pub mod listings;

pub use connection::{init_db, seed_db, Database};
pub use listings::{count_listings, get_listing, query_listings, ListingQuery};
