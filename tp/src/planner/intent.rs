//! Intent, outcome and notice types exchanged with the planner

use crate::domain::{Algorithm, Place};
use crate::roles::Anchor;

/// Inclusive bounds for the search count
pub const FIND_COUNT_RANGE: std::ops::RangeInclusive<u32> = 1..=20;

/// A user or chat action to carry out against the session
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Send a chat message; places in the reply are appended
    Chat { query: String },

    /// Search for places of a type near a location
    FindPlaces {
        business_type: String,
        location: String,
        count: u32,
    },

    /// Geocode an address and add it under `name`
    AddCustomPlace { name: String, address: String },

    RemovePlace { place_id: String },

    /// Drag the entry at `from` to `to`
    Reorder { from: usize, to: usize },

    ToggleRole { place: Place, role: Anchor, checked: bool },

    Optimize { algo: Algorithm, return_to_start: bool },

    /// Use the optimized order as the itinerary
    ApplyResult,

    DiscardResult,
}

impl Intent {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Chat { .. } => "chat",
            Intent::FindPlaces { .. } => "find_places",
            Intent::AddCustomPlace { .. } => "add_custom_place",
            Intent::RemovePlace { .. } => "remove_place",
            Intent::Reorder { .. } => "reorder",
            Intent::ToggleRole { .. } => "toggle_role",
            Intent::Optimize { .. } => "optimize",
            Intent::ApplyResult => "apply_result",
            Intent::DiscardResult => "discard_result",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient user-facing notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Why an intent was skipped without touching the backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Precondition {
    #[error("No active session. Send a chat message first")]
    NoSession,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Business type and location are required")]
    EmptySearch,

    #[error("Count must be between 1 and 20, got {0}")]
    CountOutOfRange(u32),

    #[error("Name and address are required")]
    MissingNameOrAddress,

    #[error("At least two places are needed to optimize")]
    NotEnoughPlaces,

    #[error("Cannot move place {from} to {to}")]
    InvalidMove { from: usize, to: usize },

    #[error("No optimization result")]
    NoResult,
}

/// What `dispatch` did with an intent
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Store updated, possibly with a success notice
    Applied(Option<Notice>),

    /// Chat round trip completed; `message` is the assistant's answer
    Replied { message: String, notice: Option<Notice> },

    /// Nothing sent; the action was not possible in the current state
    Skipped(Precondition),

    /// Backend call failed; the store keeps its last consistent state
    Failed(Notice),
}

impl Outcome {
    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Outcome::Applied(notice) | Outcome::Replied { notice, .. } => notice.as_ref(),
            Outcome::Failed(notice) => Some(notice),
            Outcome::Skipped(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_notice() {
        let ok = Outcome::Applied(Some(Notice::success("Place added")));
        assert_eq!(ok.notice().map(|n| n.message.as_str()), Some("Place added"));

        let failed = Outcome::Failed(Notice::error("boom"));
        assert!(failed.notice().unwrap().is_error());

        assert_eq!(Outcome::Skipped(Precondition::NoSession).notice(), None);
    }

    #[test]
    fn test_precondition_messages() {
        assert_eq!(
            Precondition::CountOutOfRange(21).to_string(),
            "Count must be between 1 and 20, got 21"
        );
        assert!(FIND_COUNT_RANGE.contains(&20));
        assert!(!FIND_COUNT_RANGE.contains(&0));
    }
}
