//! Reconciliation of incoming place sets into the itinerary
//!
//! De-duplication is by exact coordinates only. A place re-fetched under a new
//! id but on identical coordinates counts as already present; two places a
//! float rounding error apart do not.

use tracing::debug;

use crate::domain::{Place, PlacesData};

/// Places from `incoming` that are not already in `existing`, in incoming order
///
/// Entries repeating an earlier incoming entry's coordinates are dropped as well,
/// so appending the result never introduces a duplicate.
pub fn dedup(existing: &[Place], incoming: Vec<Place>) -> Vec<Place> {
    debug!(existing = existing.len(), incoming = incoming.len(), "dedup: called");
    let mut accepted: Vec<Place> = Vec::with_capacity(incoming.len());
    for place in incoming {
        let known = existing.iter().any(|p| p.same_coordinates(&place));
        let repeated = accepted.iter().any(|p| p.same_coordinates(&place));
        if known || repeated {
            debug!(name = %place.name, lat = place.latitude, lon = place.longitude, "dedup: dropping duplicate");
            continue;
        }
        accepted.push(place);
    }
    debug!(accepted = accepted.len(), "dedup: done");
    accepted
}

/// Append semantics: prior places followed by the de-duplicated incoming ones
///
/// `start`/`end` of `None` mean "no opinion" and keep the prior anchors.
/// Returns the merged itinerary and the number of places actually added.
pub fn append(prior: &PlacesData, incoming: Vec<Place>, start: Option<Place>, end: Option<Place>) -> (PlacesData, usize) {
    let deduped = dedup(&prior.places, incoming);
    let added = deduped.len();

    let mut places = Vec::with_capacity(prior.places.len() + added);
    places.extend(prior.places.iter().cloned());
    places.extend(deduped);

    let merged = PlacesData {
        places,
        start: start.or_else(|| prior.start.clone()),
        end: end.or_else(|| prior.end.clone()),
    };
    (merged, added)
}

/// Move the entry at `from` to position `to`, as a drag-and-drop would
///
/// Returns `None` when either index is out of range or they are equal.
pub fn move_place(places: &[Place], from: usize, to: usize) -> Option<Vec<Place>> {
    debug!(from, to, len = places.len(), "move_place: called");
    if from == to || from >= places.len() || to >= places.len() {
        return None;
    }
    let mut next = places.to_vec();
    let moved = next.remove(from);
    next.insert(to, moved);
    Some(next)
}
