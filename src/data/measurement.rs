//! Wire types for the metrics service.
//!
//! These types match the JSON produced and consumed by a Newts-style
//! measurements API. They are deliberately thin: the service's payloads
//! are passed through opaquely, and anything this crate does not use is
//! ignored on deserialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One aggregated data point returned by the measurements endpoint.
///
/// `value` is optional: the service emits nulls for windows where the
/// heartbeat was exceeded or too few samples were present. Such gaps
/// flow through the series transform untouched so a charting sink can
/// break the line there.
///
/// The timestamp unit (seconds or milliseconds) is whatever the service
/// emits; no conversion is applied anywhere in this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Epoch timestamp, unit per the upstream service.
    pub timestamp: i64,
    /// The exported name this value was computed under.
    pub name: String,
    /// Aggregated value, `None` for a gap.
    #[serde(default)]
    pub value: Option<f64>,
    /// Free-form attributes attached by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
}

/// One fetch cycle's raw response: ordered rows, each an ordered
/// sequence of measurements sharing a timestamp window.
pub type ResultSet = Vec<Vec<Measurement>>;

/// Reference to the entity owning a set of metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
}

impl ResourceRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: None,
        }
    }

    /// Attach a single attribute, creating the map if needed.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }
}

/// A raw sample for upload to the samples endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub resource: ResourceRef,
    pub timestamp: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub metric_type: String,
    pub value: f64,
}

/// One hit from the search endpoint: a resource and its metric names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub resource: ResourceRef,
    pub metrics: Vec<String>,
}
