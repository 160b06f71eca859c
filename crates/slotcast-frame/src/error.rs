/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The channel name cannot be framed.
    #[error("invalid channel name {name:?}: {reason}")]
    InvalidChannel { name: String, reason: &'static str },

    /// Serializing the frame failed.
    #[error("frame encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// The frame bytes are not a serialized string.
    #[error("frame decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// The buffer does not start with a string marker.
    #[error("invalid frame marker 0x{0:02x}")]
    InvalidMarker(u8),

    /// The decoded text has no channel delimiter.
    #[error("frame has no channel delimiter")]
    MissingDelimiter,

    /// The frame exceeds the configured maximum size.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
