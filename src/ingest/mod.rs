//! Event ingestion clients.
//!
//! The simulator only needs two operations: queue an event, and flush the
//! queue once at the end of the run. Capturing never fails; all delivery
//! errors surface from [`Ingest::flush`].

mod memory;
mod posthog;
mod stdout;

pub use memory::MemoryIngest;
pub use posthog::PostHogClient;
pub use stdout::StdoutClient;

use crate::error::PulseResult;
use crate::event::Event;

/// Outcome of a successful flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub events: usize,
    pub batches: u32,
}

pub trait Ingest {
    /// Queues one event. Never blocks on the network.
    fn capture(&mut self, event: Event);

    /// Delivers everything queued so far, blocking until done.
    fn flush(&mut self) -> PulseResult<FlushReport>;

    /// Events waiting for the next flush.
    fn pending(&self) -> usize;
}
