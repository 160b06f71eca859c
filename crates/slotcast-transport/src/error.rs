use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur in broadcast slot operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The slot could not be opened, typically because no listener has the
    /// receive side open.
    #[error("{code} unable to open slot {address}, try again later: {source}")]
    Unavailable {
        address: String,
        code: i32,
        source: std::io::Error,
    },

    /// The channel lock could not be created or waited on.
    #[error("failed to acquire channel lock {name}: {source}")]
    Lock {
        name: String,
        source: std::io::Error,
    },

    /// Failed to create the receive side of a slot.
    #[error("failed to bind slot at {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The slot stayed full for longer than the retry policy allows.
    #[error("write to {address} timed out after {elapsed:?}")]
    WriteTimeout { address: String, elapsed: Duration },

    /// The write was cancelled through its cancellation token.
    #[error("write to {address} cancelled")]
    Cancelled { address: String },

    /// An I/O error occurred on an open slot.
    #[error("slot I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Build an `Unavailable` error from the platform's last error.
    pub(crate) fn unavailable(address: &str, source: std::io::Error) -> Self {
        Self::Unavailable {
            address: address.to_string(),
            code: source.raw_os_error().unwrap_or(-1),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
