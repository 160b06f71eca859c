use std::fmt;

use slotcast_frame::{chunks, encode_frame, encoded_len, validate_channel};
use slotcast_transport::{
    AddressResolver, CancellationToken, ChannelLock, ResolvedAddress, Scope, SlotHandle,
    SlotWriter,
};
use tracing::{debug, trace};

use crate::config::BroadcastConfig;
use crate::error::{BroadcastError, Result};

/// Progress of a single send.
///
/// Any early exit still passes through lock release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Validating,
    LockAcquired,
    SlotOpen,
    Writing,
    Paced,
    Closed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::LockAcquired => "lock-acquired",
            Stage::SlotOpen => "slot-open",
            Stage::Writing => "writing",
            Stage::Paced => "paced",
            Stage::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Sends messages to named channels.
///
/// Each send resolves the channel's slot, serializes writers through the
/// channel lock, writes the frame in chunks and pauses before closing.
/// Delivery is best effort: only a listener that has the slot open receives
/// the message.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    resolver: AddressResolver,
    config: BroadcastConfig,
}

impl Broadcaster {
    /// Broadcaster for `scope` with default configuration.
    pub fn new(scope: Scope) -> Self {
        Self::with_config(BroadcastConfig::default().with_scope(scope))
    }

    pub fn with_config(config: BroadcastConfig) -> Self {
        let resolver = AddressResolver::new(config.scope, &config.resolver);
        Self { resolver, config }
    }

    pub fn scope(&self) -> Scope {
        self.config.scope
    }

    pub fn config(&self) -> &BroadcastConfig {
        &self.config
    }

    /// Validate `channel` and resolve its slot address.
    pub fn resolve(&self, channel: &str) -> Result<ResolvedAddress> {
        validate_channel(channel)?;
        Ok(self.resolver.resolve(channel))
    }

    /// Send `message` to every listener of `channel`.
    ///
    /// Fails with `InvalidArgument` before any I/O for an unusable channel
    /// name or a frame larger than `frame.max_frame_size`, and with a
    /// transport `Unavailable` error when no listener has the slot open.
    pub fn send_to_channel(&self, channel: &str, message: &str) -> Result<()> {
        self.send_to_channel_with(channel, message, &CancellationToken::new())
    }

    /// Like [`send_to_channel`](Self::send_to_channel), but write retries
    /// stop when `cancel` is cancelled.
    pub fn send_to_channel_with(
        &self,
        channel: &str,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        trace!(channel, stage = %Stage::Validating, "send");
        let address = self.resolve(channel)?;
        let size = encoded_len(channel, message);
        if size > self.config.frame.max_frame_size {
            return Err(BroadcastError::InvalidArgument(format!(
                "message too large: frame of {size} bytes exceeds the {} byte limit",
                self.config.frame.max_frame_size
            )));
        }

        let lock = ChannelLock::open(&address, &self.config.slot)?;
        let _guard = lock.acquire()?;
        trace!(address = %address, stage = %Stage::LockAcquired, "send");

        let slot = SlotHandle::open(&address, &self.config.slot)?;
        trace!(address = %address, stage = %Stage::SlotOpen, "send");

        let frame = encode_frame(channel, message)?;
        let mut writer = SlotWriter::new(slot, address.as_str())
            .with_policy(self.config.retry)
            .with_cancellation(cancel.clone());
        let written = writer.write_chunks(chunks(&frame, self.config.frame.chunk_size))?;
        trace!(address = %address, stage = %Stage::Writing, bytes = written, "send");

        if !self.config.pace.is_zero() {
            std::thread::sleep(self.config.pace);
        }
        trace!(address = %address, stage = %Stage::Paced, "send");

        writer.into_inner().close();
        trace!(address = %address, stage = %Stage::Closed, "send");

        debug!(channel, address = %address, bytes = written, "message sent");
        Ok(())
    }
}
