use std::time::{Duration, Instant};

use bytes::Bytes;
use slotcast_frame::{decode_frame, validate_channel, Frame, FrameReader};
use slotcast_transport::{AddressResolver, ResolvedAddress, SlotListener};
use tracing::{debug, warn};

use crate::config::BroadcastConfig;
use crate::error::Result;

/// Minimal receive side of a channel.
///
/// Binds the channel's slot so senders can open it, and reassembles their
/// chunked writes into frames. There is no callback dispatch and no
/// arbitration between competing listeners.
pub struct ChannelListener {
    reader: FrameReader<SlotListener>,
    channel: String,
}

impl ChannelListener {
    /// Bind the receive side of `channel` in the configured scope.
    pub fn bind(channel: &str, config: &BroadcastConfig) -> Result<Self> {
        validate_channel(channel)?;
        let address = AddressResolver::new(config.scope, &config.resolver).resolve(channel);
        let slot = SlotListener::bind(&address, &config.slot)?;
        debug!(channel, address = %address, "channel listener bound");

        Ok(Self {
            reader: FrameReader::with_config(slot, config.frame.clone()),
            channel: channel.to_string(),
        })
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn address(&self) -> &ResolvedAddress {
        self.reader.get_ref().address()
    }

    /// Block until the next frame arrives.
    pub fn recv(&mut self) -> Result<Frame> {
        let raw = self.recv_raw()?;
        self.decode(&raw)
    }

    /// Block until the next frame arrives, returning it undecoded.
    pub fn recv_raw(&mut self) -> Result<Bytes> {
        Ok(self.reader.read_raw_frame()?)
    }

    /// Wait up to `timeout` for the next frame.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<Frame>> {
        match self.recv_raw_timeout(timeout)? {
            Some(raw) => Ok(Some(self.decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// Wait up to `timeout` for the next frame, returning it undecoded.
    pub fn recv_raw_timeout(&mut self, timeout: Duration) -> Result<Option<Bytes>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(raw) = self.reader.next_buffered()? {
                return Ok(Some(raw));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !self.reader.get_ref().wait_readable(Some(remaining))? {
                return Ok(None);
            }
            self.reader.fill()?;
        }
    }

    fn decode(&self, raw: &[u8]) -> Result<Frame> {
        let frame = decode_frame(raw)?;
        if frame.channel != self.channel {
            warn!(
                expected = %self.channel,
                received = %frame.channel,
                "frame for another channel arrived on this slot"
            );
        }
        Ok(frame)
    }
}

impl std::fmt::Debug for ChannelListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelListener")
            .field("channel", &self.channel)
            .field("address", &self.address().as_str())
            .finish()
    }
}
