//! Run summary.

use super::behavior::{Visit, DASHBOARD_CREATED, ONBOARDING_COMPLETED, PAYWALL_VIEWED};
use crate::event::Event;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Counters for one simulation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub new_users: u32,
    pub onboarded: u32,
    pub reached_first_value: u32,
    pub returning_active: u32,
    pub returning_churned: u32,
    pub paywall_views: u32,
    pub conversions: u32,
    pub events_captured: u64,
    pub batches_sent: u32,
    #[serde(serialize_with = "serialize_optional_ts")]
    pub window_start: Option<DateTime<Utc>>,
    #[serde(serialize_with = "serialize_optional_ts")]
    pub window_end: Option<DateTime<Utc>>,
}

impl RunSummary {
    pub fn record_signup(&mut self, events: &[Event]) {
        self.new_users += 1;
        if events.iter().any(|e| e.event == ONBOARDING_COMPLETED) {
            self.onboarded += 1;
        }
        if events.iter().any(|e| e.event == DASHBOARD_CREATED) {
            self.reached_first_value += 1;
        }
        self.events_captured += events.len() as u64;
    }

    pub fn record_visit(&mut self, visit: &Visit) {
        match visit {
            Visit::Churned => self.returning_churned += 1,
            Visit::Active { events, converted } => {
                self.returning_active += 1;
                self.paywall_views += events.iter().filter(|e| e.event == PAYWALL_VIEWED).count() as u32;
                if *converted {
                    self.conversions += 1;
                }
                self.events_captured += events.len() as u64;
            }
        }
    }

    /// Share of the returning pool that logged in.
    pub fn retention_rate(&self) -> f64 {
        let pool = self.returning_active + self.returning_churned;
        if pool == 0 {
            return 0.0;
        }
        self.returning_active as f64 / pool as f64
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("Run summary\n");
        out.push_str(&format!(
            "  New users:        {} ({} onboarded, {} reached first value)\n",
            self.new_users, self.onboarded, self.reached_first_value
        ));
        out.push_str(&format!(
            "  Returning users:  {} active, {} churned ({:.0}% retention)\n",
            self.returning_active,
            self.returning_churned,
            self.retention_rate() * 100.0
        ));
        out.push_str(&format!("  Paywall views:    {}\n", self.paywall_views));
        out.push_str(&format!("  Conversions:      {}\n", self.conversions));
        out.push_str(&format!(
            "  Events captured:  {} in {} batch(es)",
            self.events_captured, self.batches_sent
        ));
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn serialize_optional_ts<S>(ts: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match ts {
        Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
        None => serializer.serialize_none(),
    }
}
