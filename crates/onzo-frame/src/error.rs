use std::time::Duration;

use onzo_transport::TransportError;

/// Errors that can occur while sending or receiving framed messages.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The underlying report transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// No report arrived within the per-report timeout.
    #[error("no report received within {0:?}")]
    Timeout(Duration),

    /// A report declared more payload than a report can carry.
    #[error("invalid report payload length {len} (max 62)")]
    InvalidLength { len: usize },

    /// The message exceeds the configured maximum size.
    #[error("message too large ({size} bytes, max {max})")]
    MessageTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
