// src/map/mod.rs
//
// Listing map layer: listings in, clustered markers out.
//
//   records -> geo_point -> cluster -> markers (-> capability) -> selection / viewport

pub mod capability;
pub mod cluster;
pub mod controller;
pub mod geo_point;
pub mod markers;
pub mod script;
pub mod selection;
pub mod viewport;

pub use capability::{MapCapability, MarkerHandle};
pub use controller::MapController;
pub use script::ScriptMap;
