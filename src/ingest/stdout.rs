//! Dry-run client that prints events as JSON lines instead of sending them.

use super::{FlushReport, Ingest};
use crate::error::PulseResult;
use crate::event::Event;
use std::io::{self, Stdout, Write};

pub struct StdoutClient<W = Stdout> {
    out: W,
    queue: Vec<Event>,
}

impl StdoutClient<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> StdoutClient<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            queue: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Ingest for StdoutClient<W> {
    fn capture(&mut self, event: Event) {
        self.queue.push(event);
    }

    fn flush(&mut self) -> PulseResult<FlushReport> {
        let events = std::mem::take(&mut self.queue);
        for event in &events {
            serde_json::to_writer(&mut self.out, event)?;
            self.out.write_all(b"\n")?;
        }
        self.out.flush()?;
        Ok(FlushReport {
            events: events.len(),
            batches: u32::from(!events.is_empty()),
        })
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}
