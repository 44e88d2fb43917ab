// src/map/selection.rs

use crate::map::cluster::Cluster;
use crate::map::geo_point::GeoPoint;

/// What a marker click should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    /// Go straight to the listing's detail view.
    NavigateTo(i64),
    /// Show the paging panel for a multi-listing cluster.
    OpenPanel,
}

pub fn decide_action(cluster: &Cluster) -> ClickAction {
    if cluster.is_multiple() {
        ClickAction::OpenPanel
    } else {
        ClickAction::NavigateTo(cluster.members()[0].id)
    }
}

/// Which cluster panel is open, and which member it shows.
///
/// The open cluster is a copy of the one clicked. Cluster identity does not
/// survive a new clustering pass, so any dataset change must `reset` this.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectionState {
    #[default]
    Closed,
    Open { cluster: Cluster, index: usize },
}

impl SelectionState {
    pub fn open(&mut self, cluster: Cluster) {
        *self = SelectionState::Open { cluster, index: 0 };
    }

    pub fn next(&mut self) {
        if let SelectionState::Open { cluster, index } = self {
            *index = (*index + 1) % cluster.size();
        }
    }

    pub fn prev(&mut self) {
        if let SelectionState::Open { cluster, index } = self {
            let size = cluster.size();
            *index = (*index + size - 1) % size;
        }
    }

    pub fn dismiss(&mut self) {
        *self = SelectionState::Closed;
    }

    /// Dataset changed; whatever was open no longer exists.
    pub fn reset(&mut self) {
        self.dismiss();
    }

    pub fn is_open(&self) -> bool {
        matches!(self, SelectionState::Open { .. })
    }

    pub fn open_cluster(&self) -> Option<&Cluster> {
        match self {
            SelectionState::Open { cluster, .. } => Some(cluster),
            SelectionState::Closed => None,
        }
    }

    /// Zero when closed.
    pub fn active_index(&self) -> usize {
        match self {
            SelectionState::Open { index, .. } => *index,
            SelectionState::Closed => 0,
        }
    }

    pub fn active_member(&self) -> Option<&GeoPoint> {
        match self {
            SelectionState::Open { cluster, index } => cluster.members().get(*index),
            SelectionState::Closed => None,
        }
    }

    pub fn panel(&self) -> Option<PanelView<'_>> {
        let cluster = self.open_cluster()?;
        Some(PanelView {
            member: self.active_member()?,
            index: self.active_index(),
            size: cluster.size(),
        })
    }
}

/// The open selection, shaped for the panel template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelView<'a> {
    pub member: &'a GeoPoint,
    pub index: usize,
    pub size: usize,
}

impl PanelView<'_> {
    /// 1-based position for display, e.g. "2 / 4".
    pub fn position_label(&self) -> String {
        format!("{} / {}", self.index + 1, self.size)
    }
}
