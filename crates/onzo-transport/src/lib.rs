//! Fixed-size report transport for Onzo energy monitors.
//!
//! The display unit exposes a USB HID interface that moves data in
//! fixed 64-byte reports. This is the lowest layer of onzo: it knows how
//! to write one report and read one report, nothing more. Everything else
//! builds on top of the [`ReportTransport`] trait provided here.
//!
//! - [`HidTransport`] talks to real hardware (behind the `hidapi` feature)
//! - [`Loopback`] is an in-memory report queue for tests and tooling

pub mod error;
pub mod loopback;
pub mod traits;

#[cfg(feature = "hidapi")]
pub mod hid;

pub use error::{Result, TransportError};
pub use loopback::Loopback;
pub use traits::{ReportTransport, REPORT_SIZE};

#[cfg(feature = "hidapi")]
pub use hid::{HidConfig, HidTransport};
