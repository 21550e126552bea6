//! HTTP implementation of PlacesBackend
//!
//! JSON over the backend's `/api/v1` REST surface. The session id travels as a
//! query parameter except for chat, where it is part of the body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::types::{ChatRequest, ConfirmPlacesRequest, RemovePlaceRequest, ResetStartEndRequest, StartEndRequest};
use super::{BackendError, ChatReply, GeoPoint, OptimizeRouteResponse, PlacesBackend, PlacesPayload};
use crate::config::BackendConfig;
use crate::domain::{Algorithm, Place};

/// API prefix shared by every endpoint
const API_PREFIX: &str = "/api/v1";

/// Planning backend reached over HTTP
pub struct HttpBackend {
    base_url: String,
    http: Client,
}

impl HttpBackend {
    /// Create a new client from configuration
    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        debug!(?config, "from_config: called");
        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tripplanner/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(BackendError::Network)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Full URL for an endpoint path such as `/chat`
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// Send a request and decode a JSON body, mapping non-success statuses
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T, BackendError> {
        debug!(%what, "send: called");
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, %what, "Request failed");
            BackendError::Network(e)
        })?;

        let status = response.status();
        let body = response.text().await?;
        debug!(%status, body_len = body.len(), %what, "send: response received");

        if !status.is_success() {
            warn!(%status, %what, body = %body, "Backend returned error status");
            return Err(BackendError::from_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, %what, "Failed to decode response body");
            BackendError::InvalidResponse(format!("{}: {}", what, e))
        })
    }

    fn post(&self, path: &str, session_id: &str) -> RequestBuilder {
        let url = self.endpoint(path);
        debug!(%url, "POST");
        self.http.post(url).query(&[("session_id", session_id)])
    }
}

#[async_trait]
impl PlacesBackend for HttpBackend {
    async fn chat(&self, query: &str, session_id: Option<&str>) -> Result<ChatReply, BackendError> {
        debug!(query_len = query.len(), ?session_id, "chat: called");
        let url = self.endpoint("/chat");
        let request = self.http.post(url).json(&ChatRequest { query, session_id });
        self.send(request, "chat").await
    }

    async fn geocode(&self, address: &str) -> Result<GeoPoint, BackendError> {
        debug!(%address, "geocode: called");
        let request = self.http.get(self.endpoint("/geocode")).query(&[("address", address)]);
        self.send(request, "geocode").await
    }

    async fn find_places(
        &self,
        session_id: &str,
        business_type: &str,
        location: &str,
        count: u32,
    ) -> Result<PlacesPayload, BackendError> {
        debug!(%session_id, %business_type, %location, count, "find_places: called");
        let count = count.to_string();
        let request = self.http.get(self.endpoint("/find-places")).query(&[
            ("session_id", session_id),
            ("business_type", business_type),
            ("location", location),
            ("count", count.as_str()),
        ]);
        self.send(request, "find-places").await
    }

    async fn add_place(&self, session_id: &str, place: &Place) -> Result<PlacesPayload, BackendError> {
        debug!(%session_id, name = %place.name, "add_place: called");
        let request = self.post("/add-place", session_id).json(place);
        self.send(request, "add-place").await
    }

    async fn remove_place(&self, session_id: &str, place_id: &str) -> Result<PlacesPayload, BackendError> {
        debug!(%session_id, %place_id, "remove_place: called");
        let request = self
            .post("/remove-place", session_id)
            .json(&RemovePlaceRequest { place_id });
        self.send(request, "remove-place").await
    }

    async fn confirm_places(
        &self,
        session_id: &str,
        places: &[Place],
        start: Option<&Place>,
        end: Option<&Place>,
    ) -> Result<PlacesPayload, BackendError> {
        debug!(%session_id, places = places.len(), "confirm_places: called");
        let request = self
            .post("/confirm-places", session_id)
            .json(&ConfirmPlacesRequest { places, start, end });
        self.send(request, "confirm-places").await
    }

    async fn set_start_end(
        &self,
        session_id: &str,
        start: Option<&Place>,
        end: Option<&Place>,
    ) -> Result<PlacesPayload, BackendError> {
        debug!(%session_id, has_start = start.is_some(), has_end = end.is_some(), "set_start_end: called");
        let request = self
            .post("/set-start-end", session_id)
            .json(&StartEndRequest { start, end });
        self.send(request, "set-start-end").await
    }

    async fn reset_start_end(
        &self,
        session_id: &str,
        reset_start: bool,
        reset_end: bool,
    ) -> Result<PlacesPayload, BackendError> {
        debug!(%session_id, reset_start, reset_end, "reset_start_end: called");
        let request = self
            .post("/reset-start-end", session_id)
            .json(&ResetStartEndRequest { reset_start, reset_end });
        self.send(request, "reset-start-end").await
    }

    async fn optimize_route(
        &self,
        session_id: &str,
        algo: Algorithm,
        return_to_start: bool,
    ) -> Result<OptimizeRouteResponse, BackendError> {
        debug!(%session_id, %algo, return_to_start, "optimize_route: called");
        let return_to_start = if return_to_start { "true" } else { "false" };
        let request = self
            .post("/route/optimize", session_id)
            .query(&[("algo", algo.as_str()), ("return_to_start", return_to_start)]);
        self.send(request, "route/optimize").await
    }
}
