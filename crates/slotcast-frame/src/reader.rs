use std::io::{ErrorKind, Read};

use bytes::{Buf, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::codec::{decode_frame, frame_len, is_str_marker, Frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;
const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Reassembles chunked slot writes into complete frames.
///
/// Writes from several senders arrive concatenated; frames are split on the
/// MessagePack length header, never on read boundaries.
///
/// A bad frame is reported once and then dropped, so the reader stays
/// usable: an oversized frame is skipped by its declared length and bytes
/// that do not start a frame are skipped up to the next string marker.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
    /// Bytes of a rejected frame still to be dropped.
    discard: usize,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            discard: 0,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<Frame> {
        let raw = self.read_raw_frame()?;
        decode_frame(&raw)
    }

    /// Read the next complete frame without decoding it.
    ///
    /// The returned bytes are exactly what the sender serialized.
    pub fn read_raw_frame(&mut self) -> Result<Bytes> {
        loop {
            if let Some(frame) = self.next_buffered()? {
                return Ok(frame);
            }
            self.fill()?;
        }
    }

    /// Take the next frame if it is already fully buffered. Never reads.
    pub fn next_buffered(&mut self) -> Result<Option<Bytes>> {
        if self.discard > 0 {
            let n = self.discard.min(self.buf.len());
            self.buf.advance(n);
            self.discard -= n;
            if self.discard > 0 {
                return Ok(None);
            }
        }

        let len = match frame_len(&self.buf) {
            Ok(Some(len)) => len,
            Ok(None) => return Ok(None),
            Err(err) => {
                self.skip_to_marker();
                return Err(err);
            }
        };
        if len > self.config.max_frame_size {
            debug!(bytes = len, "dropping oversized frame");
            self.discard = len;
            return Err(FrameError::FrameTooLarge {
                size: len,
                max: self.config.max_frame_size,
            });
        }
        if self.buf.len() < len {
            return Ok(None);
        }
        trace!(bytes = len, "frame reassembled");
        Ok(Some(self.buf.split_to(len).freeze()))
    }

    /// Drop the byte at the head of the buffer and anything after it that
    /// cannot start a frame.
    fn skip_to_marker(&mut self) {
        let skip = self
            .buf
            .iter()
            .skip(1)
            .position(|&byte| is_str_marker(byte))
            .map_or(self.buf.len(), |pos| pos + 1);
        debug!(bytes = skip, "skipping bytes that do not start a frame");
        self.buf.advance(skip);
    }

    /// Perform one read from the underlying stream into the buffer.
    pub fn fill(&mut self) -> Result<usize> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(n);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Bytes received but not yet returned as a frame or dropped.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
