//! Send messages to named channels over OS broadcast slots.
//!
//! This is the "just works" layer. A [`Broadcaster`] validates the channel,
//! resolves its slot, serializes concurrent writers through a cross-process
//! lock and writes the frame in chunks. A [`ChannelListener`] is the minimal
//! receive side (Unix).
//!
//! ```no_run
//! use slotcast_broadcast::{Broadcaster, Scope};
//!
//! let broadcaster = Broadcaster::new(Scope::Local);
//! broadcaster.send_to_channel("updates", "v2")?;
//! # Ok::<(), slotcast_broadcast::BroadcastError>(())
//! ```

pub mod broadcaster;
pub mod config;
pub mod error;

#[cfg(unix)]
pub mod listener;

pub use broadcaster::Broadcaster;
pub use config::{BroadcastConfig, DEFAULT_PACE};
pub use error::{BroadcastError, Result};
pub use slotcast_transport::{CancellationToken, Scope};

#[cfg(unix)]
pub use listener::ChannelListener;
