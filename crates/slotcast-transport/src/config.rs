use std::path::{Path, PathBuf};

use crate::address::ResolvedAddress;

/// Directory name used under the platform runtime directory.
const RUNTIME_SUBDIR: &str = "slotcast";

/// Kernel buffer requested for slot FIFOs (1 MiB, the unprivileged Linux
/// maximum).
pub const DEFAULT_SLOT_BUFFER: usize = 1024 * 1024;

/// Where slot and lock objects live on platforms without a native namespace.
///
/// On Windows, slots and locks are named kernel objects and this directory
/// is unused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotConfig {
    /// Directory holding slot FIFOs and lock files. Default:
    /// `$XDG_RUNTIME_DIR/slotcast`, falling back to the temp directory.
    pub runtime_dir: PathBuf,
    /// Pipe buffer size a listener asks for when it binds (Linux only).
    /// Default: [`DEFAULT_SLOT_BUFFER`].
    pub slot_buffer_size: usize,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            runtime_dir: default_runtime_dir(),
            slot_buffer_size: DEFAULT_SLOT_BUFFER,
        }
    }
}

impl SlotConfig {
    pub fn with_runtime_dir(runtime_dir: impl AsRef<Path>) -> Self {
        Self {
            runtime_dir: runtime_dir.as_ref().to_path_buf(),
            slot_buffer_size: DEFAULT_SLOT_BUFFER,
        }
    }

    /// Filesystem path of the slot for `address`.
    pub fn slot_path(&self, address: &ResolvedAddress) -> PathBuf {
        self.runtime_dir.join(address.object_name())
    }

    /// Filesystem path of the lock file for `address`.
    pub fn lock_path(&self, address: &ResolvedAddress) -> PathBuf {
        self.runtime_dir
            .join(format!("{}.lock", address.object_name()))
    }
}

pub fn default_runtime_dir() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(std::env::temp_dir)
        .join(RUNTIME_SUBDIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{AddressResolver, ResolverConfig, Scope};

    #[test]
    fn slot_and_lock_paths_share_object_name() {
        let config = SlotConfig::with_runtime_dir("/run/test");
        let resolver = AddressResolver::new(
            Scope::Local,
            &ResolverConfig {
                machine_name: "host".to_string(),
            },
        );
        let address = resolver.resolve("updates");

        assert_eq!(
            config.slot_path(&address),
            PathBuf::from("/run/test/..host.mailslot.slotcast.v1.updates")
        );
        assert_eq!(
            config.lock_path(&address),
            PathBuf::from("/run/test/..host.mailslot.slotcast.v1.updates.lock")
        );
    }

    #[test]
    fn default_runtime_dir_is_namespaced() {
        assert!(default_runtime_dir().ends_with(RUNTIME_SUBDIR));
    }
}
