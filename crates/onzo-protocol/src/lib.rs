//! Request/response transaction protocol.
//!
//! Every exchange is one request message and one response message, each
//! starting with a 16-byte little-endian [`Header`]. Responses are matched
//! to requests by transaction id and message type; a device-side failure
//! comes back as the `ERROR` message type.

pub mod client;
pub mod error;
pub mod header;
pub mod message;
pub mod simulator;
pub mod txid;

#[cfg(feature = "hidapi")]
pub mod connector;

pub use client::{lock_shared, BulkData, Client, ClientConfig, SharedClient};
pub use error::{ClientError, ProtocolError, Result};
pub use header::{Header, HEADER_SIZE};
pub use message::{NetworkId, RequestType, ResponseType, StreamType};
pub use simulator::{Fault, Simulator};
pub use txid::{CounterIds, RandomIds, TransactionIds};

#[cfg(feature = "hidapi")]
pub use connector::{open, open_with_config};
