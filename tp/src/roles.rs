//! Start/end role assignment
//!
//! Role changes are never applied optimistically: the store only changes once
//! the backend has confirmed, so a rejected assignment is never shown.
//!
//! Toggling `start` on the place that is already `end` leaves `end` alone and
//! yields a closed loop (`start == end`).

use std::sync::Arc;

use tracing::{debug, info};

use crate::backend::PlacesBackend;
use crate::domain::{Place, PlacesData};
use crate::error::PlanError;
use crate::state::SessionStore;

/// The two anchor roles a place can be toggled into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    End,
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::End => write!(f, "end"),
        }
    }
}

impl std::str::FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            other => Err(format!("Unknown role '{}'. Expected start or end", other)),
        }
    }
}

/// Which anchors are currently set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleState {
    BothUnset,
    StartOnly,
    EndOnly,
    BothSet,
}

impl RoleState {
    pub fn of(data: &PlacesData) -> Self {
        match (data.start.is_some(), data.end.is_some()) {
            (false, false) => Self::BothUnset,
            (true, false) => Self::StartOnly,
            (false, true) => Self::EndOnly,
            (true, true) => Self::BothSet,
        }
    }
}

/// Place carries the start role
pub fn is_start(data: &PlacesData, place: &Place) -> bool {
    data.start.as_ref().is_some_and(|s| s.same_place(place))
}

/// Place carries the end role
pub fn is_end(data: &PlacesData, place: &Place) -> bool {
    data.end.as_ref().is_some_and(|e| e.same_place(place))
}

/// "Return to start" only makes sense without a distinct end point
pub fn return_to_start_allowed(data: &PlacesData) -> bool {
    match (&data.start, &data.end) {
        (_, None) => true,
        (Some(start), Some(end)) => start.same_place(end),
        (None, Some(_)) => false,
    }
}

/// Backend request that carries out a role change
#[derive(Debug, Clone, PartialEq)]
pub enum RoleChange {
    /// Set both anchors in one call
    Set { start: Option<Place>, end: Option<Place> },
    /// Clear exactly the flagged anchors
    Reset { reset_start: bool, reset_end: bool },
}

impl RoleChange {
    /// Change requested by toggling `anchor` on `place`
    pub fn for_toggle(current: &PlacesData, place: &Place, anchor: Anchor, checked: bool) -> Self {
        debug!(name = %place.name, %anchor, checked, state = ?RoleState::of(current), "for_toggle: called");
        if checked {
            let start = match anchor {
                Anchor::Start => Some(place.clone()),
                Anchor::End => current.start.clone(),
            };
            let end = match anchor {
                Anchor::End => Some(place.clone()),
                Anchor::Start => current.end.clone(),
            };
            RoleChange::Set { start, end }
        } else {
            RoleChange::Reset {
                reset_start: anchor == Anchor::Start,
                reset_end: anchor == Anchor::End,
            }
        }
    }

    /// Anchors to release before the place with `place_id` is removed
    pub fn for_removal(current: &PlacesData, place_id: &str) -> Option<Self> {
        let reset_start = current.start.as_ref().is_some_and(|p| p.has_id(place_id));
        let reset_end = current.end.as_ref().is_some_and(|p| p.has_id(place_id));
        if reset_start || reset_end {
            Some(RoleChange::Reset { reset_start, reset_end })
        } else {
            None
        }
    }
}

/// Carries role changes through the backend and into the store
#[derive(Clone)]
pub struct RoleAssigner {
    store: SessionStore,
    backend: Arc<dyn PlacesBackend>,
}

impl RoleAssigner {
    pub fn new(store: SessionStore, backend: Arc<dyn PlacesBackend>) -> Self {
        Self { store, backend }
    }

    /// Toggle `anchor` for `place`; the store changes only after the backend confirms
    pub async fn toggle(
        &self,
        session_id: &str,
        place: &Place,
        anchor: Anchor,
        checked: bool,
    ) -> Result<PlacesData, PlanError> {
        let current = self.store.places_data().await?;
        let change = RoleChange::for_toggle(&current, place, anchor, checked);
        self.submit(session_id, change, &current).await
    }

    /// Send `change` and replace the store with the backend's answer
    ///
    /// For `Set`, fields the backend omits fall back to the locally computed
    /// values; `Reset` answers are applied as they come.
    pub async fn submit(&self, session_id: &str, change: RoleChange, current: &PlacesData) -> Result<PlacesData, PlanError> {
        debug!(%session_id, ?change, "submit: called");
        let data = match change {
            RoleChange::Set { start, end } => {
                let payload = self
                    .backend
                    .set_start_end(session_id, start.as_ref(), end.as_ref())
                    .await?;
                let local = PlacesData::new(current.places.clone(), start, end);
                payload.resolve_against(&local)
            }
            RoleChange::Reset { reset_start, reset_end } => self
                .backend
                .reset_start_end(session_id, reset_start, reset_end)
                .await?
                .into_places_data(),
        };

        let data = self.store.replace(data).await?;
        info!(
            start = ?data.start.as_ref().map(|p| &p.name),
            end = ?data.end.as_ref().map(|p| &p.name),
            "Roles updated"
        );
        Ok(data)
    }
}
