//! Free-form metadata attached to stage reports.
//!
//! Stored metadata is merged, never replaced: a new report adds its keys to
//! whatever is already stored, and wins when both sides carry the same key.
//! The merge is shallow; nested objects under a colliding key are replaced
//! wholesale.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON object keyed by string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a single key, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shallow key-wise union; `newer` wins on collision.
    #[must_use]
    pub fn merge(mut self, newer: Metadata) -> Self {
        self.0.extend(newer.0);
        self
    }

    /// Combine optional stored and incoming metadata.
    ///
    /// Both present: merged. One present: that side. Neither: `None`.
    /// An empty incoming object counts as absent.
    #[must_use]
    pub fn merge_optional(stored: Option<Metadata>, incoming: Option<Metadata>) -> Option<Metadata> {
        match (stored, incoming.filter(|m| !m.is_empty())) {
            (Some(stored), Some(incoming)) => Some(stored.merge(incoming)),
            (stored, incoming) => incoming.or(stored),
        }
    }

    /// Parse a stored JSON object.
    ///
    /// # Errors
    /// Returns an error if the text is not a JSON object.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Serialize to compact JSON text for storage.
    ///
    /// # Errors
    /// Returns an error if a value cannot be serialized.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }

    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Metadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Metadata {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
