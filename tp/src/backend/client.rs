//! PlacesBackend trait definition

use async_trait::async_trait;

use super::{BackendError, ChatReply, GeoPoint, OptimizeRouteResponse, PlacesPayload};
use crate::domain::{Algorithm, Place};

/// Stateless gateway to the backend session - each call is one request/response
///
/// Every mutating call answers with the backend's full current itinerary.
/// Nothing here retries or cancels; callers decide what a failure means.
#[async_trait]
pub trait PlacesBackend: Send + Sync {
    /// Send a chat message; a missing session id asks the backend to start one
    async fn chat(&self, query: &str, session_id: Option<&str>) -> Result<ChatReply, BackendError>;

    /// Resolve an address to coordinates
    async fn geocode(&self, address: &str) -> Result<GeoPoint, BackendError>;

    /// Search for more places and add them to the backend session
    async fn find_places(
        &self,
        session_id: &str,
        business_type: &str,
        location: &str,
        count: u32,
    ) -> Result<PlacesPayload, BackendError>;

    async fn add_place(&self, session_id: &str, place: &Place) -> Result<PlacesPayload, BackendError>;

    async fn remove_place(&self, session_id: &str, place_id: &str) -> Result<PlacesPayload, BackendError>;

    /// Overwrite the backend's place list (and anchors when given)
    async fn confirm_places(
        &self,
        session_id: &str,
        places: &[Place],
        start: Option<&Place>,
        end: Option<&Place>,
    ) -> Result<PlacesPayload, BackendError>;

    async fn set_start_end(
        &self,
        session_id: &str,
        start: Option<&Place>,
        end: Option<&Place>,
    ) -> Result<PlacesPayload, BackendError>;

    async fn reset_start_end(
        &self,
        session_id: &str,
        reset_start: bool,
        reset_end: bool,
    ) -> Result<PlacesPayload, BackendError>;

    async fn optimize_route(
        &self,
        session_id: &str,
        algo: Algorithm,
        return_to_start: bool,
    ) -> Result<OptimizeRouteResponse, BackendError>;
}
