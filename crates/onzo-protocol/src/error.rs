use onzo_frame::FrameError;

use crate::message::{RequestType, ResponseType};

/// A response that does not correlate with, or cannot be decoded for, its request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The response is shorter than a header.
    #[error("response truncated ({len} bytes, header needs 16)")]
    Truncated { len: usize },

    /// The response transaction id differs from the request's.
    #[error("transaction id mismatch (sent {expected:#06x}, got {actual:#06x})")]
    IdMismatch { expected: u16, actual: u16 },

    /// The response message type differs from the request type.
    #[error("response type {actual} does not match request type {expected}")]
    TypeMismatch {
        expected: RequestType,
        actual: ResponseType,
    },

    /// The response carries a message type code this client does not know.
    #[error("unknown message type code {0}")]
    UnknownMessageType(u8),

    /// The response payload has the wrong size for its decoder.
    #[error("unexpected payload length {actual} (expected {expected})")]
    PayloadLength { expected: usize, actual: usize },
}

/// Errors that can occur during a transaction.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Framing or transport failure, including timeouts.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The response did not correlate with the request.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The device answered with the `ERROR` message type.
    #[error("device reported an error during {request_type} request")]
    Device { request_type: RequestType },

    /// The register address does not fit the 8-bit register id field.
    #[error("register address {0} out of range (max 255)")]
    RegisterOutOfRange(u16),

    /// A shared client's lock was poisoned by a panicking holder.
    #[error("client lock poisoned")]
    LockPoisoned,
}

impl ClientError {
    /// Whether this error is a per-report read timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Frame(FrameError::Timeout(_)))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
