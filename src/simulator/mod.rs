//! Product analytics traffic simulator.
//!
//! One run covers a trailing window (a day by default):
//! - a handful of new signups walk the onboarding funnel
//! - a fixed pool of returning users either churn for the day or do a few
//!   things, with free users occasionally hitting the paywall and converting
//! - everything is captured into an [`Ingest`](crate::ingest::Ingest) client
//!   and flushed exactly once at the end

pub mod behavior;
mod config;
pub mod identity;
mod report;
mod runner;
mod window;

pub use config::{
    mask_key, BehaviorTable, NewUserCount, SimConfig, API_KEY_VAR, DEFAULT_HOST, HOST_VAR,
    MAX_JOIN_DAYS_AGO, MAX_WINDOW_HOURS,
};
pub use identity::{Persona, Plan};
pub use report::RunSummary;
pub use runner::{run_simulation, simulate};
pub use window::TimeWindow;
