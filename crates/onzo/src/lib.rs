//! Client for Onzo clamp and display energy monitors.
//!
//! The display unit is reached over USB HID in fixed 64-byte reports. Each
//! layer lives in its own crate and is re-exported here.
//!
//! # Crate Structure
//!
//! - [`transport`]: 64-byte report transport (HID behind the `hidapi` feature)
//! - [`frame`]: splitting messages into reports and reassembling them
//! - [`protocol`]: request/response transactions with id correlation
//! - [`device`]: register tables and the clamp/display accessors

/// Re-export transport types.
pub mod transport {
    pub use onzo_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use onzo_frame::*;
}

/// Re-export protocol types.
pub mod protocol {
    pub use onzo_protocol::*;
}

/// Re-export device types.
pub mod device {
    pub use onzo_device::*;
}

pub use onzo_device::{Clamp, Display};
pub use onzo_protocol::{Client, ClientConfig};
