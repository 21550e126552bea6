//! Wire types for the planning backend

use serde::{Deserialize, Serialize};

use crate::domain::{Field, Place, PlacesData};

/// Places payload returned by every places endpoint
///
/// The backend always answers with the full current session itinerary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacesPayload {
    #[serde(default)]
    pub places: Option<Vec<Place>>,

    #[serde(default, skip_serializing_if = "Field::is_omitted")]
    pub start: Field<Place>,

    #[serde(default, skip_serializing_if = "Field::is_omitted")]
    pub end: Field<Place>,

    /// Informational: how many places the call produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
}

impl PlacesPayload {
    pub fn new(data: PlacesData) -> Self {
        Self {
            places: Some(data.places),
            start: data.start.into(),
            end: data.end.into(),
            ..Default::default()
        }
    }

    /// Replace semantics: missing places become empty, missing anchors become unset
    pub fn into_places_data(self) -> PlacesData {
        PlacesData {
            places: self.places.unwrap_or_default(),
            start: self.start.into_option(),
            end: self.end.into_option(),
        }
    }

    /// Replace semantics with fallbacks for omitted fields
    ///
    /// A field the backend left out keeps the value from `local`; an explicit
    /// `null` still clears it.
    pub fn resolve_against(self, local: &PlacesData) -> PlacesData {
        PlacesData {
            places: self.places.unwrap_or_else(|| local.places.clone()),
            start: self.start.or_keep(local.start.clone()),
            end: self.end.or_keep(local.end.clone()),
        }
    }
}

/// Reply from the chat endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub session_id: String,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub places: Option<Vec<Place>>,

    #[serde(default, skip_serializing_if = "Field::is_omitted")]
    pub start: Field<Place>,

    #[serde(default, skip_serializing_if = "Field::is_omitted")]
    pub end: Field<Place>,
}

/// Geocoding answer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// One leg of an optimized route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub from_place: Place,
    pub to_place: Place,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// Raw optimization response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRouteResponse {
    #[serde(default)]
    pub optimized_places: Vec<Place>,

    #[serde(default)]
    pub visiting_order: Vec<usize>,

    #[serde(default)]
    pub steps: Vec<RouteStep>,

    /// Meters
    #[serde(default)]
    pub total_distance: Option<f64>,

    /// Seconds
    #[serde(default)]
    pub total_time: Option<f64>,

    #[serde(default)]
    pub start: Option<Place>,

    #[serde(default)]
    pub end: Option<Place>,
}

/// Body of `POST /chat`
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub query: &'a str,
    pub session_id: Option<&'a str>,
}

/// Body of `POST /confirm-places`
#[derive(Debug, Serialize)]
pub(crate) struct ConfirmPlacesRequest<'a> {
    pub places: &'a [Place],
    pub start: Option<&'a Place>,
    pub end: Option<&'a Place>,
}

/// Body of `POST /set-start-end`
#[derive(Debug, Serialize)]
pub(crate) struct StartEndRequest<'a> {
    pub start: Option<&'a Place>,
    pub end: Option<&'a Place>,
}

/// Body of `POST /reset-start-end`
#[derive(Debug, Serialize)]
pub(crate) struct ResetStartEndRequest {
    pub reset_start: bool,
    pub reset_end: bool,
}

/// Body of `POST /remove-place`
#[derive(Debug, Serialize)]
pub(crate) struct RemovePlaceRequest<'a> {
    pub place_id: &'a str,
}
