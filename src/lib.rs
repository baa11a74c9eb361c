//! Daily Pulse - synthetic product analytics traffic
//!
//! Generates a day of plausible user behavior (signups, onboarding, feature
//! usage, paywall hits, conversions) and ships it to PostHog.

pub mod dice;
pub mod error;
pub mod event;
pub mod ingest;
pub mod simulator;

pub use error::{PulseError, PulseResult};
pub use event::Event;
