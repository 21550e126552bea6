//! Backend error types

use thiserror::Error;
use tracing::debug;

/// Errors that can occur talking to the planning backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level failure (connect, timeout, broken body)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status; `message` is the backend's `detail` or raw body
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BackendError {
    /// Build an API error from a non-success status and its raw body
    ///
    /// JSON bodies contribute their `detail` field: strings verbatim, anything
    /// else serialized. Bodies that are not JSON, or JSON without `detail`, are
    /// used as raw text.
    pub fn from_status(status: u16, body: &str) -> Self {
        debug!(status, body_len = body.len(), "from_status: called");
        let message = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(parsed) => match parsed.get("detail") {
                Some(serde_json::Value::String(detail)) => detail.clone(),
                Some(serde_json::Value::Null) | None => body.trim().to_string(),
                Some(other) => other.to_string(),
            },
            Err(_) => body.trim().to_string(),
        };
        let message = if message.is_empty() {
            format!("HTTP {}", status)
        } else {
            message
        };
        BackendError::Api { status, message }
    }

    /// Message fit for a user notice: backend messages verbatim, anything else generic
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            BackendError::Api { message, .. } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Api { status, .. } => Some(*status),
            BackendError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: BackendError) -> String {
        match err {
            BackendError::Api { message, .. } => message,
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_status_string_detail() {
        let err = BackendError::from_status(400, r#"{"detail":"Place already exists"}"#);
        assert_eq!(err.status(), Some(400));
        assert_eq!(message(err), "Place already exists");
    }

    #[test]
    fn test_from_status_object_detail_is_serialized() {
        let err = BackendError::from_status(422, r#"{"detail":{"loc":["body","name"]}}"#);
        assert_eq!(message(err), r#"{"loc":["body","name"]}"#);
    }

    #[test]
    fn test_from_status_raw_text() {
        let err = BackendError::from_status(404, "Location not found\n");
        assert_eq!(message(err), "Location not found");

        let err = BackendError::from_status(502, "");
        assert_eq!(message(err), "HTTP 502");
    }

    #[test]
    fn test_user_message() {
        let api = BackendError::from_status(500, r#"{"detail":"Failed to optimize route: boom"}"#);
        assert_eq!(api.user_message("Optimization failed"), "Failed to optimize route: boom");

        let invalid = BackendError::InvalidResponse("truncated".to_string());
        assert_eq!(invalid.user_message("Optimization failed"), "Optimization failed");
    }
}
