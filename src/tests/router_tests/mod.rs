mod listing_tests;
mod map_tests;
