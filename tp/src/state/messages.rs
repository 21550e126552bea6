//! Session store messages
//!
//! Commands and responses for the actor pattern.

use thiserror::Error;
use tokio::sync::oneshot;

use crate::domain::{OptimizeResult, Place, PlacesData};

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Channel error")]
    ChannelError,
}

/// Response from store operations
pub type StateResponse<T> = Result<T, StateError>;

/// Consistent copy of everything the store holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub data: PlacesData,
    pub result: Option<OptimizeResult>,
}

/// Commands sent to the SessionStore actor
#[derive(Debug)]
pub enum StoreCommand {
    /// Backend is truth: overwrite places and anchors
    Replace {
        data: PlacesData,
        reply: oneshot::Sender<StateResponse<PlacesData>>,
    },
    /// Merge unconfirmed suggestions after the current places
    Append {
        places: Vec<Place>,
        start: Option<Place>,
        end: Option<Place>,
        reply: oneshot::Sender<StateResponse<(PlacesData, usize)>>,
    },
    /// Optimistic local reorder, anchors untouched
    Reorder {
        places: Vec<Place>,
        reply: oneshot::Sender<StateResponse<PlacesData>>,
    },
    SetOptimizeResult {
        result: Option<OptimizeResult>,
        reply: oneshot::Sender<StateResponse<()>>,
    },
    /// Apply the held result as the new itinerary and clear it
    ApplyOptimizeResult {
        reply: oneshot::Sender<StateResponse<Option<PlacesData>>>,
    },
    Snapshot {
        reply: oneshot::Sender<StateResponse<Snapshot>>,
    },
    /// Back to the empty session state
    Reset {
        reply: oneshot::Sender<StateResponse<()>>,
    },
    Shutdown,
}
