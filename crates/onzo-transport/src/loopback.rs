use std::collections::VecDeque;
use std::time::Duration;

use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::{ReportTransport, REPORT_SIZE};

/// In-memory report transport.
///
/// Written reports are recorded and, in echo mode, queued for reading so a
/// message sent through the framing layer can be read straight back. An
/// empty read queue behaves like a device that never answers: reads
/// return `Ok(0)` immediately instead of sleeping out the timeout.
#[derive(Debug, Default)]
pub struct Loopback {
    inbound: VecDeque<[u8; REPORT_SIZE]>,
    written: Vec<[u8; REPORT_SIZE]>,
    echo: bool,
    write_limit: Option<usize>,
    read_limit: Option<usize>,
    closed: bool,
}

impl Loopback {
    /// Create a loopback that only records writes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loopback that queues every written report for reading.
    pub fn echo() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    /// Accept at most `limit` bytes per report write.
    pub fn with_write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    /// Report at most `limit` bytes per report read.
    pub fn with_read_limit(mut self, limit: usize) -> Self {
        self.read_limit = Some(limit);
        self
    }

    /// Queue a report to be returned by a later read.
    pub fn push_report(&mut self, report: [u8; REPORT_SIZE]) {
        self.inbound.push_back(report);
    }

    /// Reports written so far, oldest first.
    pub fn written(&self) -> &[[u8; REPORT_SIZE]] {
        &self.written
    }

    /// Take and clear the written reports.
    pub fn take_written(&mut self) -> Vec<[u8; REPORT_SIZE]> {
        std::mem::take(&mut self.written)
    }

    /// Number of reports waiting to be read.
    pub fn pending(&self) -> usize {
        self.inbound.len()
    }

    /// Mark the loopback closed; further I/O fails with [`TransportError::Closed`].
    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl ReportTransport for Loopback {
    fn write_report(&mut self, report: &[u8; REPORT_SIZE]) -> Result<usize> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let accepted = self.write_limit.map_or(REPORT_SIZE, |l| l.min(REPORT_SIZE));
        self.written.push(*report);
        if self.echo {
            self.inbound.push_back(*report);
        }
        trace!(accepted, "loopback report written");
        Ok(accepted)
    }

    fn read_report(&mut self, buf: &mut [u8; REPORT_SIZE], _timeout: Duration) -> Result<usize> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        match self.inbound.pop_front() {
            Some(report) => {
                buf.copy_from_slice(&report);
                Ok(self.read_limit.map_or(REPORT_SIZE, |l| l.min(REPORT_SIZE)))
            }
            None => Ok(0),
        }
    }

    fn transport_name(&self) -> &'static str {
        "loopback"
    }
}
