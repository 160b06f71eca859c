//! Broadcast slot transport.
//!
//! The lowest layer of slotcast:
//! - [`AddressResolver`] derives slot addresses from a scope and channel name
//! - [`ChannelLock`] serializes writers of one address across processes
//! - [`SlotHandle`] and [`SlotWriter`] open a slot and write whole frames with
//!   bounded retry
//! - [`SlotListener`] creates the receive side (Unix)
//!
//! Slots are mailslots on Windows and FIFOs under a runtime directory on Unix.

pub mod address;
pub mod config;
pub mod error;
pub mod lock;
pub mod retry;
pub mod slot;

#[cfg(unix)]
pub mod listener;

pub use address::{machine_name, AddressResolver, ResolvedAddress, ResolverConfig, Scope};
pub use config::{default_runtime_dir, SlotConfig, DEFAULT_SLOT_BUFFER};
pub use error::{Result, TransportError};
pub use lock::{Acquisition, ChannelLock, ChannelLockGuard};
pub use retry::RetryPolicy;
pub use slot::{SlotHandle, SlotRoom, SlotSink, SlotWriter};
pub use tokio_util::sync::CancellationToken;

#[cfg(unix)]
pub use listener::SlotListener;

#[cfg(windows)]
pub(crate) fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
