pub mod listing;
pub mod map;

pub use listing::listing_page;
pub use map::{map_page, MapPageVm};
