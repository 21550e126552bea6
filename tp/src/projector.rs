//! Projection of raw optimization responses into display-ready results

use tracing::debug;

use crate::backend::OptimizeRouteResponse;
use crate::domain::{OptimizeResult, OptimizeStats, Place};

/// Normalize a raw optimization response
///
/// Meters become kilometers and seconds become minutes; a missing total stays
/// missing. `stops` counts the canonical sequence as returned.
pub fn project(raw: OptimizeRouteResponse) -> OptimizeResult {
    debug!(
        places = raw.optimized_places.len(),
        total_distance = ?raw.total_distance,
        total_time = ?raw.total_time,
        "project: called"
    );
    let stats = OptimizeStats {
        distance_km: raw.total_distance.map(|meters| meters / 1000.0),
        duration_min: raw.total_time.map(|seconds| seconds / 60.0),
        stops: Some(raw.optimized_places.len()),
    };

    OptimizeResult {
        ordered_places: raw.optimized_places,
        stats: Some(stats),
        start: raw.start,
        end: raw.end,
    }
}

impl OptimizeResult {
    /// Places to show in the result view, repeats removed (first occurrence wins)
    ///
    /// Cosmetic only: `ordered_places` is left as is for applying the route.
    pub fn display_places(&self) -> Vec<&Place> {
        let mut shown: Vec<&Place> = Vec::with_capacity(self.ordered_places.len());
        for place in &self.ordered_places {
            if !shown.iter().any(|p| p.same_place(place)) {
                shown.push(place);
            }
        }
        shown
    }
}
