//! Domain types for the trip planner
//!
//! Places, the itinerary snapshot, optimization results and the tri-state
//! field used to decode backend payloads.

mod field;
mod optimize;
mod place;

pub use field::Field;
pub use optimize::{Algorithm, OptimizeResult, OptimizeStats};
pub use place::{Place, PlacesData, Role};
