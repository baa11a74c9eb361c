//! In-memory client that records every call.

use super::{FlushReport, Ingest};
use crate::error::{PulseError, PulseResult};
use crate::event::Event;

#[derive(Debug, Default)]
pub struct MemoryIngest {
    /// Every captured event, in capture order
    pub captured: Vec<Event>,

    /// Number of captured events at each flush call
    pub flushes: Vec<usize>,

    /// When set, flush fails with a transport error
    pub fail_flush: bool,

    pending: usize,
}

impl MemoryIngest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_flush: true,
            ..Default::default()
        }
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.len()
    }

    pub fn events_for<'a>(&'a self, distinct_id: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.captured.iter().filter(move |e| e.distinct_id == distinct_id)
    }
}

impl Ingest for MemoryIngest {
    fn capture(&mut self, event: Event) {
        self.captured.push(event);
        self.pending += 1;
    }

    fn flush(&mut self) -> PulseResult<FlushReport> {
        self.flushes.push(self.captured.len());
        if self.fail_flush {
            return Err(PulseError::Transport("simulated transmission failure".to_string()));
        }
        let events = std::mem::take(&mut self.pending);
        Ok(FlushReport {
            events,
            batches: u32::from(events > 0),
        })
    }

    fn pending(&self) -> usize {
        self.pending
    }
}
