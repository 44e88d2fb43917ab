// src/map/viewport.rs

use crate::map::capability::MapCapability;
use crate::map::geo_point::LatLng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Running south-west / north-east box over marker anchors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn around(point: LatLng) -> Self {
        Self {
            south: point.lat,
            west: point.lng,
            north: point.lat,
            east: point.lng,
        }
    }

    pub fn extend(&mut self, point: LatLng) {
        self.south = self.south.min(point.lat);
        self.north = self.north.max(point.lat);
        self.west = self.west.min(point.lng);
        self.east = self.east.max(point.lng);
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }
}

/// Accumulates anchors into a `Bounds`, tracking how many went in.
#[derive(Debug, Default)]
pub struct BoundsAccumulator {
    bounds: Option<Bounds>,
    count: usize,
}

impl BoundsAccumulator {
    pub fn extend(&mut self, point: LatLng) {
        match self.bounds.as_mut() {
            Some(b) => b.extend(point),
            None => self.bounds = Some(Bounds::around(point)),
        }
        self.count += 1;
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// Screen padding in CSS pixels kept free when fitting bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Insets {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    /// Zoom used when exactly one marker is on the map.
    pub single_point_zoom: f64,
    /// Minimum zoom when a cluster panel is opened.
    pub cluster_inspect_zoom: f64,
    /// Padding around the fitted markers.
    pub fit_padding: u32,
    /// Width of the listing panel overlaid on the map's left edge.
    pub list_panel_width: u32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            single_point_zoom: 15.0,
            cluster_inspect_zoom: 17.0,
            fit_padding: 48,
            list_panel_width: 360,
        }
    }
}

/// What the fitter asked the map to do on the last pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ViewportAction {
    FitBounds { bounds: Bounds, insets: Insets },
    CenterOn { point: LatLng, zoom: f64 },
    None,
}

pub struct ViewportFitter {
    settings: ViewportSettings,
}

impl ViewportFitter {
    pub fn new(settings: ViewportSettings) -> Self {
        Self { settings }
    }

    /// Insets that keep markers clear of the list panel.
    pub fn insets(&self) -> Insets {
        let pad = self.settings.fit_padding;
        Insets {
            top: pad,
            right: pad,
            bottom: pad,
            left: pad + self.settings.list_panel_width,
        }
    }

    pub fn fit<M: MapCapability>(&self, acc: &BoundsAccumulator, map: &mut M) -> ViewportAction {
        let action = match (acc.count(), acc.bounds()) {
            (0, _) | (_, None) => ViewportAction::None,
            (1, Some(b)) => ViewportAction::CenterOn {
                point: b.center(),
                zoom: self.settings.single_point_zoom,
            },
            (_, Some(b)) => ViewportAction::FitBounds {
                bounds: b,
                insets: self.insets(),
            },
        };

        match &action {
            ViewportAction::FitBounds { bounds, insets } => map.fit_bounds(bounds, insets),
            ViewportAction::CenterOn { point, zoom } => {
                map.set_center(*point);
                map.set_zoom(*zoom);
            }
            ViewportAction::None => {}
        }

        action
    }

    /// Brings an opened cluster into view without ever zooming out.
    pub fn focus_cluster<M: MapCapability>(&self, anchor: LatLng, map: &mut M) {
        let floor = self.settings.cluster_inspect_zoom;
        debug!(lat = anchor.lat, lng = anchor.lng, floor, "focusing cluster");

        map.pan_to(anchor);
        map.zoom_at_least(floor);
    }
}
