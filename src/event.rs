//! Analytics event records handed to the ingestion client.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// One captured analytics event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub distinct_id: String,
    pub event: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub uuid: Uuid,
    pub properties: Map<String, Value>,
}

impl Event {
    pub fn new(distinct_id: impl Into<String>, event: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            distinct_id: distinct_id.into(),
            event: event.into(),
            timestamp,
            uuid: Uuid::new_v4(),
            properties: Map::new(),
        }
    }

    /// Adds a scalar property.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

fn serialize_timestamp<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
}
