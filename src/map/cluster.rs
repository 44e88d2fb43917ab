// src/map/cluster.rs

use crate::map::geo_point::{GeoPoint, LatLng};
use serde::Serialize;

/// Coordinate delta under which two listings share a marker.
///
/// 0.001° is roughly 111 m of latitude. This is a flat-earth box test, not a
/// haversine distance: the east-west extent shrinks with cos(latitude), which
/// is acceptable at city scale.
pub const PROXIMITY_EPSILON_DEGREES: f64 = 0.001;

/// A group of co-located points, in discovery order. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    members: Vec<GeoPoint>,
}

impl Cluster {
    fn seeded(seed: GeoPoint) -> Self {
        Self {
            members: vec![seed],
        }
    }

    /// Marker position: the first member's coordinates.
    pub fn anchor(&self) -> LatLng {
        self.members[0].position()
    }

    pub fn members(&self) -> &[GeoPoint] {
        &self.members
    }

    /// Number of listings behind the marker. Always at least one.
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_multiple(&self) -> bool {
        self.members.len() > 1
    }

    pub fn member_ids(&self) -> Vec<i64> {
        self.members.iter().map(|m| m.id).collect()
    }

    /// Member ids in order, e.g. `"3-2-1"`.
    ///
    /// Positions and marker handles are only meaningful within one pass, so a
    /// cluster referenced from an earlier page is matched on this instead.
    pub fn key(&self) -> String {
        self.members
            .iter()
            .map(|m| m.id.to_string())
            .collect::<Vec<_>>()
            .join("-")
    }
}

fn is_near(a: &GeoPoint, b: &GeoPoint) -> bool {
    (a.latitude - b.latitude).abs() < PROXIMITY_EPSILON_DEGREES
        && (a.longitude - b.longitude).abs() < PROXIMITY_EPSILON_DEGREES
}

/// Groups points into clusters.
///
/// Each unvisited point seeds a cluster and absorbs every other unvisited point
/// within epsilon of that seed. Membership is measured against the seed only,
/// so the grouping is not transitive and depends on input order.
pub fn cluster_points(points: &[GeoPoint]) -> Vec<Cluster> {
    let mut used = vec![false; points.len()];
    let mut clusters = Vec::new();

    for (i, seed) in points.iter().enumerate() {
        if used[i] {
            continue;
        }
        used[i] = true;

        let mut cluster = Cluster::seeded(seed.clone());
        for (j, other) in points.iter().enumerate() {
            if used[j] {
                continue;
            }
            if is_near(seed, other) {
                cluster.members.push(other.clone());
                used[j] = true;
            }
        }

        clusters.push(cluster);
    }

    clusters
}
