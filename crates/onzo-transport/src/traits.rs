use std::time::Duration;

use crate::error::Result;

/// Size of one physical report on the wire, in bytes.
pub const REPORT_SIZE: usize = 64;

/// A connected report-oriented device.
///
/// Implementations move whole fixed-size reports. They do not interpret
/// report contents; splitting messages into reports is the framing layer's
/// job.
pub trait ReportTransport {
    /// Write one report and return the number of bytes the backend accepted.
    ///
    /// A well-behaved backend accepts all [`REPORT_SIZE`] bytes. Callers
    /// decide what a shorter count means.
    fn write_report(&mut self, report: &[u8; REPORT_SIZE]) -> Result<usize>;

    /// Read one report into `buf`, blocking for at most `timeout`.
    ///
    /// Returns `Ok(0)` when no report arrived before the timeout elapsed.
    fn read_report(&mut self, buf: &mut [u8; REPORT_SIZE], timeout: Duration) -> Result<usize>;

    /// Transport name for diagnostics.
    fn transport_name(&self) -> &'static str;
}

impl<T: ReportTransport + ?Sized> ReportTransport for &mut T {
    fn write_report(&mut self, report: &[u8; REPORT_SIZE]) -> Result<usize> {
        (**self).write_report(report)
    }

    fn read_report(&mut self, buf: &mut [u8; REPORT_SIZE], timeout: Duration) -> Result<usize> {
        (**self).read_report(buf, timeout)
    }

    fn transport_name(&self) -> &'static str {
        (**self).transport_name()
    }
}

impl<T: ReportTransport + ?Sized> ReportTransport for Box<T> {
    fn write_report(&mut self, report: &[u8; REPORT_SIZE]) -> Result<usize> {
        (**self).write_report(report)
    }

    fn read_report(&mut self, buf: &mut [u8; REPORT_SIZE], timeout: Duration) -> Result<usize> {
        (**self).read_report(buf, timeout)
    }

    fn transport_name(&self) -> &'static str {
        (**self).transport_name()
    }
}
