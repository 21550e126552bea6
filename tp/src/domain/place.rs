//! Place and itinerary types

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Role a place plays in the itinerary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Start,
    End,
    Regular,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::End => write!(f, "end"),
            Self::Regular => write!(f, "regular"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            "regular" => Ok(Self::Regular),
            other => Err(format!("Unknown role '{}'. Expected start, end or regular", other)),
        }
    }
}

/// A named geographic point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Backend-assigned identifier (absent for places not yet stored)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    pub latitude: f64,

    pub longitude: f64,

    /// Business classification, e.g. "cafe"
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Place {
    /// Create a place with only a name and coordinates
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            address: None,
            latitude,
            longitude,
            kind: None,
            role: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// True when both places sit on exactly the same coordinates
    pub fn same_coordinates(&self, other: &Place) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }

    /// Identity rule: ids decide when both places carry one, coordinates otherwise
    pub fn same_place(&self, other: &Place) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a == b,
            _ => self.same_coordinates(other),
        }
    }

    /// True when this place carries the given id
    pub fn has_id(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }
}

/// The client-visible itinerary: ordered places plus optional anchors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacesData {
    /// Route/display order
    #[serde(default)]
    pub places: Vec<Place>,

    #[serde(default)]
    pub start: Option<Place>,

    #[serde(default)]
    pub end: Option<Place>,
}

impl PlacesData {
    pub fn new(places: Vec<Place>, start: Option<Place>, end: Option<Place>) -> Self {
        Self { places, start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty() && self.start.is_none() && self.end.is_none()
    }

    /// Start and end are the same place (closed loop)
    pub fn is_closed_loop(&self) -> bool {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => start.same_place(end),
            _ => false,
        }
    }

    /// Sequence shown by the list/map views: start, the places, then end unless it repeats start
    pub fn route_view(&self) -> Vec<&Place> {
        debug!(places = self.places.len(), "route_view: called");
        let mut view = Vec::with_capacity(self.places.len() + 2);
        if let Some(start) = &self.start {
            view.push(start);
        }
        view.extend(self.places.iter());
        match &self.end {
            Some(end) if !self.is_closed_loop() => view.push(end),
            _ => {}
        }
        view
    }
}
