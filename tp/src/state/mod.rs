//! Session state with actor pattern
//!
//! SessionStore owns the itinerary and the last optimization result and
//! processes messages via channels. It is the only place either is mutated.

mod manager;
mod messages;

pub use manager::{SessionStore, StoreEvent};
pub use messages::{Snapshot, StateError, StateResponse, StoreCommand};
