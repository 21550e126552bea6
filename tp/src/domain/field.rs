//! Tri-state optional field for backend payloads
//!
//! The backend distinguishes a key that is absent from a key set to `null`.
//! Merge code needs both: an absent key means "keep what you have", `null`
//! means "cleared".

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A payload field that may be omitted, explicitly cleared, or set
///
/// Use with `#[serde(default)]` so a missing key decodes as [`Field::Omitted`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Field<T> {
    /// Key absent from the payload
    #[default]
    Omitted,
    /// Key present with a JSON `null`
    Cleared,
    /// Key present with a value
    Value(T),
}

impl<T> Field<T> {
    pub fn is_omitted(&self) -> bool {
        matches!(self, Field::Omitted)
    }

    /// Omitted and cleared both collapse to `None`
    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Value(v) => Some(v),
            Field::Omitted | Field::Cleared => None,
        }
    }

    /// Resolve against a fallback used only when the key was omitted
    pub fn or_keep(self, fallback: Option<T>) -> Option<T> {
        match self {
            Field::Omitted => fallback,
            Field::Cleared => None,
            Field::Value(v) => Some(v),
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Value(v),
            None => Field::Cleared,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Field::Value(v) => serializer.serialize_some(v),
            Field::Omitted | Field::Cleared => serializer.serialize_none(),
        }
    }
}
