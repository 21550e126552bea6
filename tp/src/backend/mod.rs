//! Backend gateway for the trip planner
//!
//! The backend owns the authoritative session; this module only moves
//! requests and canonical payloads back and forth.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod http;
mod types;

pub use client::PlacesBackend;
pub use error::BackendError;
pub use http::HttpBackend;
pub use types::{ChatReply, GeoPoint, OptimizeRouteResponse, PlacesPayload, RouteStep};

use crate::config::BackendConfig;

/// Create the HTTP backend described by config
pub fn create_backend(config: &BackendConfig) -> Result<Arc<dyn PlacesBackend>, BackendError> {
    debug!(base_url = %config.base_url, "create_backend: called");
    Ok(Arc::new(HttpBackend::from_config(config)?))
}
