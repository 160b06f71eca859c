//! Channel messaging over OS broadcast slots.
//!
//! slotcast sends short string messages to named channels. Each channel maps
//! to a broadcast slot (a mailslot on Windows, a FIFO on Unix) and concurrent
//! writers are serialized by a cross-process lock.
//!
//! # Crate Structure
//!
//! - [`transport`]: slot addressing, channel locks, chunked slot writes
//! - [`frame`]: MessagePack channel frames and reassembly
//! - [`broadcast`]: the `Broadcaster` entry point and a minimal listener

/// Re-export transport types.
pub mod transport {
    pub use slotcast_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use slotcast_frame::*;
}

/// Re-export broadcast types.
pub mod broadcast {
    pub use slotcast_broadcast::*;
}

pub use slotcast_broadcast::{BroadcastError, Broadcaster, Scope};
