use std::time::Duration;

use slotcast_frame::FrameConfig;
use slotcast_transport::{ResolverConfig, RetryPolicy, Scope, SlotConfig};

/// Default hold after a write, before the slot is closed.
pub const DEFAULT_PACE: Duration = Duration::from_millis(1);

/// Configuration shared by [`Broadcaster`](crate::Broadcaster) and
/// [`ChannelListener`](crate::ChannelListener).
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// Local machine or whole network domain. Default: local.
    pub scope: Scope,
    /// Machine identity used for local-scope addresses.
    pub resolver: ResolverConfig,
    /// Location of slot and lock objects.
    pub slot: SlotConfig,
    /// Chunk size for writes and maximum frame size for sends and reads.
    pub frame: FrameConfig,
    /// Backoff for writes to a busy slot.
    pub retry: RetryPolicy,
    /// Pause after each write. The slot drops data under back-to-back
    /// writes. Default: 1ms.
    pub pace: Duration,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            scope: Scope::default(),
            resolver: ResolverConfig::default(),
            slot: SlotConfig::default(),
            frame: FrameConfig::default(),
            retry: RetryPolicy::default(),
            pace: DEFAULT_PACE,
        }
    }
}

impl BroadcastConfig {
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }
}
