//! Trailing time window that simulated events land in.

use crate::dice::Dice;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window covering the `hours` before `end`.
    pub fn trailing(end: DateTime<Utc>, hours: u32) -> Self {
        Self {
            start: end - Duration::hours(i64::from(hours)),
            end,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn span_seconds(&self) -> u32 {
        (self.end - self.start).num_seconds().clamp(0, i64::from(u32::MAX)) as u32
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }

    /// Uniform timestamp within the closed window, at whole-second offsets from the end.
    pub fn random_timestamp(&self, dice: &mut impl Dice) -> DateTime<Utc> {
        let offset = dice.range(0, self.span_seconds());
        self.end - Duration::seconds(i64::from(offset))
    }

    /// `YYYYMMDD` token for the day `days_ago` days before the window end.
    pub fn date_token(&self, days_ago: u32) -> String {
        (self.end - Duration::days(i64::from(days_ago)))
            .format("%Y%m%d")
            .to_string()
    }
}
