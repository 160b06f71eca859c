use bytes::Bytes;

use crate::error::{FrameError, Result};

/// Separates the channel name from the message inside a frame.
pub const DELIMITER: char = ':';

/// Bytes per slot write.
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// Default upper bound for a single encoded frame: 896 KiB, so a whole
/// frame fits a 1 MiB slot buffer.
pub const DEFAULT_MAX_FRAME: usize = 896 * 1024;

const FIXSTR_MIN: u8 = 0xa0;
const FIXSTR_MAX: u8 = 0xbf;
const STR8: u8 = 0xd9;
const STR16: u8 = 0xda;
const STR32: u8 = 0xdb;

/// A message addressed to a named channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub channel: String,
    pub message: String,
}

impl Frame {
    /// Create a frame, rejecting channel names that cannot be framed.
    pub fn new(channel: impl Into<String>, message: impl Into<String>) -> Result<Self> {
        let channel = channel.into();
        validate_channel(&channel)?;
        Ok(Self {
            channel,
            message: message.into(),
        })
    }

    /// Serialize this frame for the wire.
    pub fn encode(&self) -> Result<Bytes> {
        encode_frame(&self.channel, &self.message)
    }
}

/// Check that `name` can be used as a channel name.
///
/// Names must contain a non-whitespace character and must not contain the
/// delimiter, a path separator or NUL, since they end up in OS object names.
pub fn validate_channel(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        "must not be empty"
    } else if name.contains(DELIMITER) {
        "must not contain the ':' character"
    } else if name.contains(['/', '\\', '\0']) {
        "must not contain path separators or NUL"
    } else {
        return Ok(());
    };
    Err(FrameError::InvalidChannel {
        name: name.to_string(),
        reason,
    })
}

/// Encode `channel:message` as a self-describing MessagePack string.
///
/// Wire format:
/// ```text
/// ┌────────────────────┬──────────────────┬──────────────────────────┐
/// │ Marker (1B)        │ Length (0/1/2/4B │ UTF-8 "channel:message"  │
/// │ fixstr/str8/16/32  │ big-endian)      │ (Length bytes)           │
/// └────────────────────┴──────────────────┴──────────────────────────┘
/// ```
pub fn encode_frame(channel: &str, message: &str) -> Result<Bytes> {
    validate_channel(channel)?;
    let raw = format!("{channel}{DELIMITER}{message}");
    let encoded = rmp_serde::to_vec(&raw)?;
    Ok(Bytes::from(encoded))
}

/// Length of the frame [`encode_frame`] would produce, without encoding it.
pub fn encoded_len(channel: &str, message: &str) -> usize {
    let text = channel.len() + DELIMITER.len_utf8() + message.len();
    let header = match text {
        0..=31 => 1,
        32..=0xff => 2,
        0x100..=0xffff => 3,
        _ => 5,
    };
    header + text
}

/// Whether `byte` can start a frame.
pub(crate) fn is_str_marker(byte: u8) -> bool {
    matches!(byte, FIXSTR_MIN..=FIXSTR_MAX | STR8 | STR16 | STR32)
}

/// Decode one complete frame.
pub fn decode_frame(src: &[u8]) -> Result<Frame> {
    let raw: String = rmp_serde::from_slice(src)?;
    let (channel, message) = raw
        .split_once(DELIMITER)
        .ok_or(FrameError::MissingDelimiter)?;
    Ok(Frame {
        channel: channel.to_string(),
        message: message.to_string(),
    })
}

/// Total encoded length of the frame at the start of `src`.
///
/// Returns `Ok(None)` until enough header bytes are buffered.
pub fn frame_len(src: &[u8]) -> Result<Option<usize>> {
    let Some(&marker) = src.first() else {
        return Ok(None);
    };

    let (header, body) = match marker {
        FIXSTR_MIN..=FIXSTR_MAX => (1, usize::from(marker & 0x1f)),
        STR8 => match src.get(1) {
            Some(&len) => (2, usize::from(len)),
            None => return Ok(None),
        },
        STR16 => match src.get(1..3) {
            Some(len) => (3, usize::from(u16::from_be_bytes([len[0], len[1]]))),
            None => return Ok(None),
        },
        STR32 => match src.get(1..5) {
            Some(len) => (
                5,
                u32::from_be_bytes([len[0], len[1], len[2], len[3]]) as usize,
            ),
            None => return Ok(None),
        },
        other => return Err(FrameError::InvalidMarker(other)),
    };

    Ok(Some(header + body))
}

/// Split an encoded frame into ordered slices of at most `chunk_size` bytes.
pub fn chunks(frame: &[u8], chunk_size: usize) -> std::slice::Chunks<'_, u8> {
    frame.chunks(chunk_size.max(1))
}

/// Configuration for frame chunking and reassembly.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Bytes per slot write. Default: 256.
    pub chunk_size: usize,
    /// Largest encoded frame a sender writes or a reader reassembles.
    /// Default: 896 KiB.
    pub max_frame_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_frame_size: DEFAULT_MAX_FRAME,
        }
    }
}
