// src/map/controller.rs

use crate::domain::listing::{Language, ListingRecord};
use crate::map::capability::{MapCapability, MarkerHandle};
use crate::map::cluster::{cluster_points, Cluster};
use crate::map::geo_point::extract_geo_points;
use crate::map::markers::{MarkerLifecycleManager, ReconcileOutcome};
use crate::map::selection::{decide_action, ClickAction, PanelView, SelectionState};
use crate::map::viewport::{ViewportFitter, ViewportSettings};
use tracing::{debug, info};

/// One interactive listings map.
///
/// Owns the map surface, the markers on it, and the cluster selection. The
/// navigator is called with a listing id whenever a single-listing marker is
/// clicked.
pub struct MapController<M, N>
where
    M: MapCapability,
    N: FnMut(i64),
{
    map: M,
    map_ready: bool,
    markers: MarkerLifecycleManager,
    clusters: Vec<Cluster>,
    missing_coordinates: usize,
    selection: SelectionState,
    navigate: N,
}

impl<M, N> MapController<M, N>
where
    M: MapCapability,
    N: FnMut(i64),
{
    pub fn new(map: M, settings: ViewportSettings, navigate: N) -> Self {
        Self {
            map,
            map_ready: false,
            markers: MarkerLifecycleManager::new(ViewportFitter::new(settings)),
            clusters: Vec::new(),
            missing_coordinates: 0,
            selection: SelectionState::Closed,
            navigate,
        }
    }

    /// Readiness callback from the map. Only the first call does anything.
    pub fn on_map_ready(&mut self) -> Option<ReconcileOutcome> {
        if self.map_ready {
            return None;
        }
        self.map_ready = true;
        info!(clusters = self.clusters.len(), "map ready");
        Some(self.reconcile())
    }

    /// Replaces the dataset with a fresh query result.
    ///
    /// Closes any open panel and, once the map is ready, rebuilds every marker.
    pub fn set_listings(&mut self, records: &[ListingRecord], language: Language) -> Option<ReconcileOutcome> {
        let extraction = extract_geo_points(records, language);
        self.missing_coordinates = extraction.missing_coordinates;
        self.clusters = cluster_points(&extraction.points);
        self.selection.reset();

        debug!(
            records = records.len(),
            points = extraction.points.len(),
            clusters = self.clusters.len(),
            "listings clustered"
        );

        if !self.map_ready {
            return None;
        }
        Some(self.reconcile())
    }

    fn reconcile(&mut self) -> ReconcileOutcome {
        self.markers.reconcile(&self.clusters, &mut self.map)
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// The cluster behind a live marker.
    pub fn cluster_for(&self, handle: MarkerHandle) -> Option<&Cluster> {
        let index = self.markers.markers().find(handle)?.bound_cluster;
        self.clusters.get(index)
    }

    /// Every live marker with the key of the cluster it stands for.
    pub fn marker_keys(&self) -> Vec<(MarkerHandle, String)> {
        self.markers
            .markers()
            .iter()
            .filter_map(|m| {
                let cluster = self.clusters.get(m.bound_cluster)?;
                Some((m.map_handle, cluster.key()))
            })
            .collect()
    }

    pub fn point_count(&self) -> usize {
        self.clusters.iter().map(Cluster::size).sum()
    }

    pub fn missing_coordinates(&self) -> usize {
        self.missing_coordinates
    }

    /// Routes a marker click. `None` if the map isn't ready or the handle is stale.
    pub fn handle_click(&mut self, handle: MarkerHandle) -> Option<ClickAction> {
        if !self.map_ready {
            return None;
        }
        let index = self.markers.markers().find(handle)?.bound_cluster;
        let cluster = self.clusters.get(index)?;

        let action = decide_action(cluster);
        match action {
            ClickAction::NavigateTo(id) => {
                debug!(listing = id, "navigating to listing");
                (self.navigate)(id);
            }
            ClickAction::OpenPanel => {
                let anchor = cluster.anchor();
                self.selection.open(cluster.clone());
                self.markers.fitter().focus_cluster(anchor, &mut self.map);
            }
        }
        Some(action)
    }

    /// Hover feedback for a live marker. `false` if nothing was scaled.
    pub fn handle_hover(&mut self, handle: MarkerHandle, entered: bool) -> bool {
        self.map_ready && self.markers.hover(handle, entered, &mut self.map)
    }

    /// Reopens a cluster panel at a given member, as carried across requests.
    ///
    /// `key` must match the cluster now at `cluster_index`; if the data moved
    /// underneath, the selection stays closed. Only multi-listing clusters can
    /// be open.
    pub fn restore_selection(&mut self, cluster_index: usize, member: usize, key: &str) -> bool {
        let Some(cluster) = self.clusters.get(cluster_index) else {
            return false;
        };
        if !cluster.is_multiple() {
            return false;
        }
        if cluster.key() != key {
            debug!(cluster = cluster_index, expected = key, "selection is stale");
            return false;
        }

        let anchor = cluster.anchor();
        self.selection.open(cluster.clone());
        for _ in 0..(member % cluster.size()) {
            self.selection.next();
        }
        if self.map_ready {
            self.markers.fitter().focus_cluster(anchor, &mut self.map);
        }
        true
    }

    /// Index of the open cluster in the current pass.
    pub fn open_cluster_index(&self) -> Option<usize> {
        let open = self.selection.open_cluster()?;
        self.clusters.iter().position(|c| c == open)
    }

    pub fn next(&mut self) {
        self.selection.next();
    }

    pub fn prev(&mut self) {
        self.selection.prev();
    }

    pub fn dismiss(&mut self) {
        if self.selection.is_open() {
            debug!("cluster panel closed");
        }
        self.selection.dismiss();
    }

    pub fn panel(&self) -> Option<PanelView<'_>> {
        self.selection.panel()
    }

    pub fn map(&self) -> &M {
        &self.map
    }
}
