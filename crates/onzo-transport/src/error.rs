/// Errors that can occur in report transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No device with the requested USB identifiers is attached.
    #[error("no device found for {vendor_id:04x}:{product_id:04x} (unit {unit})")]
    NotFound {
        vendor_id: u16,
        product_id: u16,
        unit: usize,
    },

    /// The device exists but the backend refused to open it.
    #[error("failed to open {vendor_id:04x}:{product_id:04x}: {reason}")]
    Open {
        vendor_id: u16,
        product_id: u16,
        reason: String,
    },

    /// The backend accepted fewer bytes than one full report.
    #[error("short report write ({written} of {expected} bytes)")]
    ShortWrite { written: usize, expected: usize },

    /// The backend returned a partial report.
    #[error("short report read ({read} of {expected} bytes)")]
    ShortRead { read: usize, expected: usize },

    /// The backend reported a device-level failure.
    #[error("device I/O error: {0}")]
    Device(String),

    /// An I/O error occurred on the transport.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport has been closed.
    #[error("transport closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
