//! Chunked message framing over fixed 64-byte reports.
//!
//! Every physical report carries:
//! - A 1-byte continuation flag (0 = more reports follow, 1 = final report)
//! - A 1-byte payload length (0-62)
//! - Up to 62 payload bytes, padded with `0xFF`
//!
//! A logical message of any length is split across as many reports as it
//! needs and reassembled on the way back in. Callers always deal in whole
//! messages.

pub mod codec;
pub mod error;
pub mod framer;

pub use codec::{
    decode_report, encode_report, split_message, Report, Reports, CHUNK_SIZE, FLAG_FINAL,
    FLAG_MORE, PADDING, REPORT_HEADER_SIZE,
};
pub use error::{FrameError, Result};
pub use framer::{FrameConfig, Framer, DEFAULT_MAX_MESSAGE, DEFAULT_READ_TIMEOUT};
pub use onzo_transport::REPORT_SIZE;
