// src/map/markers.rs

use crate::domain::listing::ListingKind;
use crate::map::capability::{MapCapability, MarkerContent, MarkerHandle, VisualKind};
use crate::map::cluster::Cluster;
use crate::map::viewport::{BoundsAccumulator, ViewportAction, ViewportFitter};
use tracing::debug;

pub const COLOR_CLUSTER: &str = "#d4a017";
pub const COLOR_FOR_RENT: &str = "#2563eb";
pub const COLOR_FOR_SALE: &str = "#dc2626";

const DOT_SIZE: u32 = 14;
const BADGE_SIZE: u32 = 34;

pub const HOVER_SCALE: f64 = 1.2;
pub const REST_SCALE: f64 = 1.0;

/// A live marker on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Index of the cluster in the pass that created this marker.
    pub bound_cluster: usize,
    pub content: MarkerContent,
    pub map_handle: MarkerHandle,
}

/// All markers currently on the map. Only the lifecycle manager mutates it.
#[derive(Debug, Default)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    pub fn count(&self) -> usize {
        self.markers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn find(&self, handle: MarkerHandle) -> Option<&Marker> {
        self.markers.iter().find(|m| m.map_handle == handle)
    }
}

/// Visual parameters for a cluster's marker.
pub fn marker_content(cluster: &Cluster) -> MarkerContent {
    if cluster.is_multiple() {
        return MarkerContent {
            kind: VisualKind::Badge,
            color: COLOR_CLUSTER,
            size: BADGE_SIZE,
            label: Some(cluster.size().to_string()),
        };
    }

    let color = match cluster.members()[0].listing_kind {
        ListingKind::ForRent => COLOR_FOR_RENT,
        ListingKind::ForSale => COLOR_FOR_SALE,
    };
    MarkerContent {
        kind: VisualKind::Dot,
        color,
        size: DOT_SIZE,
        label: None,
    }
}

fn marker_title(cluster: &Cluster) -> String {
    if cluster.is_multiple() {
        format!("{} listings", cluster.size())
    } else {
        cluster.members()[0].display_title.clone()
    }
}

/// What one reconcile pass left on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    pub markers: usize,
    /// Listings represented by those markers.
    pub points: usize,
    pub viewport: ViewportAction,
}

impl ReconcileOutcome {
    /// Host should show an empty-state message instead of a map.
    pub fn is_empty(&self) -> bool {
        self.points == 0
    }
}

pub struct MarkerLifecycleManager {
    markers: MarkerSet,
    fitter: ViewportFitter,
}

impl MarkerLifecycleManager {
    pub fn new(fitter: ViewportFitter) -> Self {
        Self {
            markers: MarkerSet::default(),
            fitter,
        }
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn fitter(&self) -> &ViewportFitter {
        &self.fitter
    }

    /// Tears down every marker and builds one per cluster.
    ///
    /// No diffing: the whole set is rebuilt each pass, so calling this twice
    /// with the same clusters leaves the same markers behind.
    pub fn reconcile<M: MapCapability>(&mut self, clusters: &[Cluster], map: &mut M) -> ReconcileOutcome {
        self.clear(map);

        let mut bounds = BoundsAccumulator::default();
        let mut points = 0;

        for (index, cluster) in clusters.iter().enumerate() {
            let anchor = cluster.anchor();
            bounds.extend(anchor);
            points += cluster.size();

            let content = marker_content(cluster);
            let handle = map.create_marker(anchor, &content, &marker_title(cluster));
            map.add_click_listener(handle);
            map.add_hover_listener(handle);

            self.markers.markers.push(Marker {
                bound_cluster: index,
                content,
                map_handle: handle,
            });
        }

        let viewport = self.fitter.fit(&bounds, map);

        debug!(
            markers = self.markers.count(),
            points,
            ?viewport,
            "markers reconciled"
        );

        ReconcileOutcome {
            markers: self.markers.count(),
            points,
            viewport,
        }
    }

    /// Removes every owned marker from the map.
    pub fn clear<M: MapCapability>(&mut self, map: &mut M) {
        for marker in self.markers.markers.drain(..) {
            map.remove_marker(marker.map_handle);
        }
    }

    /// Hover affordance: scales the marker, nothing else.
    pub fn hover<M: MapCapability>(&self, handle: MarkerHandle, entered: bool, map: &mut M) -> bool {
        let Some(marker) = self.markers.find(handle) else {
            return false;
        };
        let scale = if entered { HOVER_SCALE } else { REST_SCALE };
        debug!(handle = handle.0, kind = ?marker.content.kind, scale, "marker hover");
        map.set_marker_scale(handle, scale);
        true
    }
}
