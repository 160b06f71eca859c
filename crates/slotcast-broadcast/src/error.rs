use slotcast_frame::FrameError;
use slotcast_transport::TransportError;

/// Errors that can occur when sending to or listening on a channel.
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    /// The channel name or message was rejected before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport-level error (slot unavailable, write timeout, lock failure).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Frame-level error on the receive side.
    #[error("frame error: {0}")]
    Frame(FrameError),
}

impl From<FrameError> for BroadcastError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::InvalidChannel { .. } => BroadcastError::InvalidArgument(err.to_string()),
            other => BroadcastError::Frame(other),
        }
    }
}

impl BroadcastError {
    /// True when no listener had the slot open.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            BroadcastError::Transport(TransportError::Unavailable { .. })
        )
    }

    /// True when the slot never drained within the retry policy.
    pub fn is_write_timeout(&self) -> bool {
        matches!(
            self,
            BroadcastError::Transport(TransportError::WriteTimeout { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, BroadcastError>;
