// src/map/script.rs

use crate::map::capability::{MapCapability, MarkerContent, MarkerHandle};
use crate::map::geo_point::LatLng;
use crate::map::viewport::{Bounds, Insets};
use serde::Serialize;
use std::collections::BTreeSet;

/// One recorded call against the map surface.
///
/// The map page embeds the command log as JSON and a small client shim replays
/// it against the browser map, so the wire names are part of the page contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MapCommand {
    CreateMarker {
        handle: MarkerHandle,
        position: LatLng,
        content: MarkerContent,
        title: String,
    },
    RemoveMarker {
        handle: MarkerHandle,
    },
    ListenClick {
        handle: MarkerHandle,
    },
    ListenHover {
        handle: MarkerHandle,
    },
    ScaleMarker {
        handle: MarkerHandle,
        scale: f64,
    },
    FitBounds {
        bounds: Bounds,
        insets: Insets,
    },
    SetCenter {
        point: LatLng,
    },
    SetZoom {
        level: f64,
    },
    /// Zoom in to `level` unless the client map is already closer.
    ZoomAtLeast {
        level: f64,
    },
    PanTo {
        point: LatLng,
    },
}

/// A map surface that only records what it was asked to do.
///
/// Handles are allocated sequentially, so the same listing query always
/// yields the same handles. Click routing relies on that.
#[derive(Debug)]
pub struct ScriptMap {
    commands: Vec<MapCommand>,
    live: BTreeSet<MarkerHandle>,
    next_handle: u64,
    zoom: f64,
}

impl ScriptMap {
    pub fn new(initial_zoom: f64) -> Self {
        Self {
            commands: Vec::new(),
            live: BTreeSet::new(),
            next_handle: 1,
            zoom: initial_zoom,
        }
    }

    pub fn commands(&self) -> &[MapCommand] {
        &self.commands
    }
}

#[cfg(test)]
impl ScriptMap {
    /// Drops the recorded log, keeping markers and zoom.
    pub fn take_commands(&mut self) -> Vec<MapCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn live_markers(&self) -> usize {
        self.live.len()
    }
}

impl MapCapability for ScriptMap {
    fn create_marker(
        &mut self,
        position: LatLng,
        content: &MarkerContent,
        title: &str,
    ) -> MarkerHandle {
        let handle = MarkerHandle(self.next_handle);
        self.next_handle += 1;
        self.live.insert(handle);

        self.commands.push(MapCommand::CreateMarker {
            handle,
            position,
            content: content.clone(),
            title: title.to_string(),
        });
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        if self.live.remove(&handle) {
            self.commands.push(MapCommand::RemoveMarker { handle });
        }
    }

    fn add_click_listener(&mut self, handle: MarkerHandle) {
        self.commands.push(MapCommand::ListenClick { handle });
    }

    fn add_hover_listener(&mut self, handle: MarkerHandle) {
        self.commands.push(MapCommand::ListenHover { handle });
    }

    fn set_marker_scale(&mut self, handle: MarkerHandle, scale: f64) {
        self.commands.push(MapCommand::ScaleMarker { handle, scale });
    }

    fn fit_bounds(&mut self, bounds: &Bounds, insets: &Insets) {
        self.commands.push(MapCommand::FitBounds {
            bounds: *bounds,
            insets: *insets,
        });
    }

    fn set_center(&mut self, point: LatLng) {
        self.commands.push(MapCommand::SetCenter { point });
    }

    fn set_zoom(&mut self, level: f64) {
        self.zoom = level;
        self.commands.push(MapCommand::SetZoom { level });
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn pan_to(&mut self, point: LatLng) {
        self.commands.push(MapCommand::PanTo { point });
    }

    // The browser may have fitted or been zoomed past `level`, so the floor
    // is always sent and the client compares against its real zoom.
    fn zoom_at_least(&mut self, level: f64) {
        self.zoom = self.zoom.max(level);
        self.commands.push(MapCommand::ZoomAtLeast { level });
    }
}
