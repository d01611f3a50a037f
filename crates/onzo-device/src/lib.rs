//! Register model and device variants.
//!
//! A field name maps to a list of 16-bit register addresses, least
//! significant word first. Reads walk the list from the last address to the
//! first and compose `value = (value << 16) + word`; writes walk it in
//! listed order, sending `value & 0xFFFF` and shifting right by 16.
//!
//! ```no_run
//! # #[cfg(feature = "hidapi")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use onzo_device::{Clamp, Display};
//! use onzo_transport::HidConfig;
//!
//! let client = onzo_protocol::open(&HidConfig::default())?.into_shared();
//! let clamp = Clamp::shared(client.clone());
//! let display = Display::shared(client);
//!
//! println!("{} W, {:.3} kWh", clamp.power()?, clamp.cumulative_kwh()?);
//! println!("{:?}", display.get_spend_rates()?);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "hidapi"))]
//! # fn main() {}
//! ```

pub mod accessor;
pub mod clamp;
pub mod device;
pub mod display;
pub mod error;
pub mod registers;

pub use accessor::{Accessor, AccessorTable};
pub use clamp::Clamp;
pub use device::Device;
pub use display::{Clock, Display, SpendRates};
pub use error::{Error, Result};
pub use registers::{Register, RegisterMap, CLAMP, DISPLAY};
