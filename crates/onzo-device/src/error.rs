use onzo_protocol::ClientError;

/// Errors from register and device operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying transaction failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// No field with this name exists in the device's register table.
    #[error("unknown register '{name}'")]
    UnknownRegister { name: String },

    /// No `get_<field>` / `set_<field>` accessor with this name exists.
    #[error("unknown accessor '{accessor}'")]
    UnknownAccessor { accessor: String },

    /// A setter accessor was invoked without a value.
    #[error("accessor '{accessor}' requires a value")]
    MissingValue { accessor: String },

    /// A derived conversion produced a value that does not fit its registers.
    #[error("value {value} out of range for {field}")]
    ValueOutOfRange { field: &'static str, value: f64 },

    /// The estimated annual consumption words do not combine to a 64-bit value.
    #[error("estimated annual consumption (hi={hi}, lo={lo}) exceeds 64 bits")]
    EacOutOfRange { hi: u16, lo: u16 },
}

impl Error {
    /// Whether the failure was a per-report read timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Client(e) if e.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
