//! Channel frames for slotcast.
//!
//! A frame is the string `channel:message` serialized as a MessagePack
//! string, so the receiver can decode it without an external schema:
//! - a 1-byte type marker (fixstr, str8, str16 or str32)
//! - a 0/1/2/4-byte big-endian length
//! - the UTF-8 text
//!
//! Encoded frames are written in fixed-size chunks; [`FrameReader`]
//! reassembles them on the receive side.

pub mod codec;
pub mod error;
pub mod reader;

pub use codec::{
    chunks, decode_frame, encode_frame, encoded_len, frame_len, validate_channel, Frame, FrameConfig,
    DEFAULT_CHUNK_SIZE, DEFAULT_MAX_FRAME, DELIMITER,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
