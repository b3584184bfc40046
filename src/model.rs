// Typed view of verbose delta records.
//
// The pipeline itself works on `serde_json::Value` so that arbitrary upstream
// shapes survive untouched. These types are a convenience for callers that
// build records in Rust; unknown fields are carried in `extra` and optional
// fields are skipped on output when absent.
//
// Field presence is only partly modeled. An explicit `null` for `context`,
// `updates`, `timestamp` or `values` reads as `None` and is then skipped on
// output, and a `PathValue` must carry a `value`. Callers that need exact
// presence should use the `Value` API (`pipeline::encode`/`decode`), which
// keeps nulls and absent fields apart.
//
// Timestamps are plain strings. A caller holding a native date/time must
// format it first; the JSON text step would stringify it anyway, so the
// original type never survives a round trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One incremental telemetry update for a vessel.
///
/// `"context": null` and `"updates": null` deserialize to `None` and are
/// omitted when serialized again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeltaRecord {
    /// Usually `vessels.urn:mrn:imo:mmsi:<digits>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updates: Option<Vec<Update>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `"timestamp": null` and `"values": null` deserialize to `None` and are
/// omitted when serialized again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Update {
    /// ISO-8601 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<PathValue>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single dotted path and the value it now holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathValue {
    pub path: String,
    pub value: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeltaRecord {
    /// Record for a vessel identified by MMSI.
    pub fn for_mmsi(mmsi: &str) -> Self {
        Self {
            context: Some(crate::compact::context::context_for(mmsi)),
            ..Default::default()
        }
    }

    /// Append an update and return `self`.
    pub fn with_update(mut self, update: Update) -> Self {
        self.updates.get_or_insert_with(Vec::new).push(update);
        self
    }
}

impl Update {
    pub fn at(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            ..Default::default()
        }
    }

    /// Append a path/value pair and return `self`.
    pub fn with_value(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values
            .get_or_insert_with(Vec::new)
            .push(PathValue::new(path, value));
        self
    }
}

impl PathValue {
    pub fn new(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
            extra: Map::new(),
        }
    }
}
