//! PostHog capture client over the `/batch/` endpoint.

use super::{FlushReport, Ingest};
use crate::error::PulseResult;
use crate::event::Event;
use crate::simulator::SimConfig;
use chrono::SecondsFormat;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

const LIB_NAME: &str = "daily-pulse";
const LIB_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
struct BatchPayload<'a> {
    api_key: &'a str,
    batch: Vec<BatchItem<'a>>,
}

#[derive(Serialize)]
struct BatchItem<'a> {
    event: &'a str,
    distinct_id: &'a str,
    timestamp: String,
    uuid: Uuid,
    properties: Map<String, Value>,
}

impl<'a> BatchItem<'a> {
    fn from_event(event: &'a Event) -> Self {
        let mut properties = event.properties.clone();
        properties.insert("$lib".to_string(), LIB_NAME.into());
        properties.insert("$lib_version".to_string(), LIB_VERSION.into());
        Self {
            event: &event.event,
            distinct_id: &event.distinct_id,
            timestamp: event.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            uuid: event.uuid,
            properties,
        }
    }
}

/// Buffers events in memory and posts them in batches on flush.
pub struct PostHogClient {
    agent: ureq::Agent,
    api_key: String,
    endpoint: String,
    batch_size: usize,
    queue: Vec<Event>,
}

impl PostHogClient {
    pub fn new(api_key: impl Into<String>, host: &str, batch_size: usize, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(&format!("{}/{}", LIB_NAME, LIB_VERSION))
            .build();
        Self {
            agent,
            api_key: api_key.into(),
            endpoint: format!("{}/batch/", host.trim_end_matches('/')),
            batch_size: batch_size.max(1),
            queue: Vec::new(),
        }
    }

    /// Client for the configured host. Fails if the config has no API key.
    pub fn from_config(config: &SimConfig) -> PulseResult<Self> {
        Ok(Self::new(
            config.api_key()?,
            &config.host,
            config.batch_size,
            Duration::from_secs(config.request_timeout_secs),
        ))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// JSON bodies for the current queue, one per request.
    fn encode_batches(&self) -> PulseResult<Vec<String>> {
        self.queue
            .chunks(self.batch_size)
            .map(|chunk| -> PulseResult<String> {
                let payload = BatchPayload {
                    api_key: &self.api_key,
                    batch: chunk.iter().map(BatchItem::from_event).collect(),
                };
                Ok(serde_json::to_string(&payload)?)
            })
            .collect()
    }
}

impl Ingest for PostHogClient {
    fn capture(&mut self, event: Event) {
        debug!(event = %event.event, distinct_id = %event.distinct_id, "queued");
        self.queue.push(event);
    }

    fn flush(&mut self) -> PulseResult<FlushReport> {
        let bodies = self.encode_batches()?;
        let events = std::mem::take(&mut self.queue).len();
        let mut report = FlushReport { events, batches: 0 };

        for (idx, body) in bodies.iter().enumerate() {
            debug!(batch = idx + 1, of = bodies.len(), bytes = body.len(), "posting batch");
            let result = self
                .agent
                .post(&self.endpoint)
                .set("Content-Type", "application/json")
                .send_string(body);
            if let Err(err) = result {
                warn!(batch = idx + 1, endpoint = %self.endpoint, "batch delivery failed");
                return Err(err.into());
            }
            report.batches += 1;
        }

        Ok(report)
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}
