//! Errors from operations that combine a backend round trip with a store update

use thiserror::Error;

use crate::backend::BackendError;
use crate::state::StateError;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Session store unavailable: {0}")]
    State(#[from] StateError),
}

impl PlanError {
    /// Message for a user notice; only backend-reported messages pass through
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            PlanError::Backend(e) => e.user_message(fallback),
            PlanError::State(_) => fallback.to_string(),
        }
    }
}
