// src/map/capability.rs

use crate::map::geo_point::LatLng;
use crate::map::viewport::{Bounds, Insets};
use serde::Serialize;

/// Opaque handle to a marker living on the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MarkerHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualKind {
    /// A single listing.
    Dot,
    /// Several listings sharing one position.
    Badge,
}

/// Everything the map needs to draw one marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerContent {
    pub kind: VisualKind,
    pub color: &'static str,
    /// Diameter in CSS pixels.
    pub size: u32,
    pub label: Option<String>,
}

/// The map surface, treated as a black box.
///
/// Implementations draw and forget; none of these calls report failure. Click
/// and hover events are delivered back by the host as marker handles, see
/// `MapController::handle_click` and `MapController::handle_hover`.
pub trait MapCapability {
    fn create_marker(&mut self, position: LatLng, content: &MarkerContent, title: &str)
        -> MarkerHandle;
    fn remove_marker(&mut self, handle: MarkerHandle);

    fn add_click_listener(&mut self, handle: MarkerHandle);
    fn add_hover_listener(&mut self, handle: MarkerHandle);
    fn set_marker_scale(&mut self, handle: MarkerHandle, scale: f64);

    fn fit_bounds(&mut self, bounds: &Bounds, insets: &Insets);
    fn set_center(&mut self, point: LatLng);
    fn set_zoom(&mut self, level: f64);
    fn zoom(&self) -> f64;
    fn pan_to(&mut self, point: LatLng);

    /// Raises the zoom to `level` if the map is currently further out.
    ///
    /// Surfaces whose zoom is only known on the client override this so the
    /// comparison happens there.
    fn zoom_at_least(&mut self, level: f64) {
        if self.zoom() < level {
            self.set_zoom(level);
        }
    }
}
