//! Cross-process named lock serializing writers of one slot address.
//!
//! Every process that resolves the same address derives the same lock name,
//! so writers in unrelated processes exclude each other.
//!
//! A lock whose holder terminated while holding it is acquired normally and
//! reported as [`Acquisition::Abandoned`]: the payload a writer sends does
//! not depend on the previous holder's state.

use tracing::{debug, trace, warn};

use crate::address::ResolvedAddress;
use crate::config::SlotConfig;
use crate::error::{Result, TransportError};

/// How ownership of a [`ChannelLock`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    /// The lock was free or released cleanly by its previous holder.
    Acquired,
    /// The previous holder terminated without releasing the lock.
    Abandoned,
}

/// A named lock for one resolved address.
///
/// Open one per send; ownership is tied to this handle, not to the process.
pub struct ChannelLock {
    name: String,
    inner: imp::Lock,
}

impl ChannelLock {
    /// Open (creating if needed) the lock for `address`.
    pub fn open(address: &ResolvedAddress, config: &SlotConfig) -> Result<Self> {
        let name = address.object_name();
        let inner = imp::Lock::open(&name, address, config).map_err(|source| {
            TransportError::Lock {
                name: name.clone(),
                source,
            }
        })?;
        Ok(Self { name, inner })
    }

    /// The OS-visible lock name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block until this handle owns the lock.
    pub fn acquire(&self) -> Result<ChannelLockGuard<'_>> {
        trace!(lock = %self.name, "waiting for channel lock");
        let acquisition = self.inner.acquire().map_err(|source| TransportError::Lock {
            name: self.name.clone(),
            source,
        })?;

        match acquisition {
            Acquisition::Acquired => debug!(lock = %self.name, "channel lock acquired"),
            Acquisition::Abandoned => {
                warn!(lock = %self.name, "channel lock was abandoned by its holder; taking ownership")
            }
        }

        Ok(ChannelLockGuard {
            lock: self,
            acquisition,
        })
    }
}

impl std::fmt::Debug for ChannelLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelLock")
            .field("name", &self.name)
            .finish()
    }
}

/// Ownership of a [`ChannelLock`]; released on drop.
pub struct ChannelLockGuard<'a> {
    lock: &'a ChannelLock,
    acquisition: Acquisition,
}

impl ChannelLockGuard<'_> {
    pub fn acquisition(&self) -> Acquisition {
        self.acquisition
    }
}

impl Drop for ChannelLockGuard<'_> {
    fn drop(&mut self) {
        self.lock.inner.release();
        trace!(lock = %self.lock.name, "channel lock released");
    }
}

#[cfg(unix)]
mod imp {
    use std::fs::{File, OpenOptions};
    use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
    use std::os::fd::AsRawFd;
    use std::os::unix::fs::OpenOptionsExt;

    use tracing::{debug, trace};

    use super::Acquisition;
    use crate::address::ResolvedAddress;
    use crate::config::SlotConfig;

    const LOCK_FILE_MODE: u32 = 0o600;

    /// `flock`-based lock file. The holder stamps its pid into the file and
    /// clears it on release; a stamp seen on acquisition marks abandonment.
    pub(super) struct Lock {
        file: File,
    }

    impl Lock {
        pub(super) fn open(
            _name: &str,
            address: &ResolvedAddress,
            config: &SlotConfig,
        ) -> io::Result<Self> {
            std::fs::create_dir_all(&config.runtime_dir)?;
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .mode(LOCK_FILE_MODE)
                .open(config.lock_path(address))?;
            Ok(Self { file })
        }

        pub(super) fn acquire(&self) -> io::Result<Acquisition> {
            loop {
                // SAFETY: the descriptor is owned by `self.file` and open.
                let rc = unsafe { libc::flock(self.file.as_raw_fd(), libc::LOCK_EX) };
                if rc == 0 {
                    break;
                }
                let err = io::Error::last_os_error();
                if err.kind() == ErrorKind::Interrupted {
                    trace!("lock wait interrupted, retrying");
                    continue;
                }
                return Err(err);
            }

            match self.stamp() {
                Ok(acquisition) => Ok(acquisition),
                Err(err) => {
                    self.unlock();
                    Err(err)
                }
            }
        }

        fn stamp(&self) -> io::Result<Acquisition> {
            let mut file = &self.file;
            let mut previous = String::new();
            file.seek(SeekFrom::Start(0))?;
            file.read_to_string(&mut previous)?;

            let acquisition = if previous.trim().is_empty() {
                Acquisition::Acquired
            } else {
                debug!(previous_holder = previous.trim(), "stale lock stamp found");
                Acquisition::Abandoned
            };

            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            write!(file, "{}", std::process::id())?;
            Ok(acquisition)
        }

        pub(super) fn release(&self) {
            if let Err(err) = self.file.set_len(0) {
                debug!(%err, "failed to clear lock stamp");
            }
            self.unlock();
        }

        fn unlock(&self) {
            // SAFETY: the descriptor is owned by `self.file` and open.
            unsafe {
                libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
            }
        }
    }
}

#[cfg(windows)]
mod imp {
    use std::io;

    use windows_sys::Win32::Foundation::{
        CloseHandle, HANDLE, WAIT_ABANDONED, WAIT_FAILED, WAIT_OBJECT_0,
    };
    use windows_sys::Win32::System::Threading::{
        CreateMutexW, ReleaseMutex, WaitForSingleObject, INFINITE,
    };

    use super::Acquisition;
    use crate::address::ResolvedAddress;
    use crate::config::SlotConfig;

    /// Named kernel mutex.
    pub(super) struct Lock {
        handle: HANDLE,
    }

    impl Lock {
        pub(super) fn open(
            name: &str,
            _address: &ResolvedAddress,
            _config: &SlotConfig,
        ) -> io::Result<Self> {
            let wide = crate::to_wide(name);
            // SAFETY: `wide` is a NUL-terminated UTF-16 string that outlives the call.
            let handle = unsafe { CreateMutexW(std::ptr::null(), 0, wide.as_ptr()) };
            if handle.is_null() {
                return Err(io::Error::last_os_error());
            }
            Ok(Self { handle })
        }

        pub(super) fn acquire(&self) -> io::Result<Acquisition> {
            // SAFETY: `self.handle` is a valid mutex handle until drop.
            match unsafe { WaitForSingleObject(self.handle, INFINITE) } {
                WAIT_OBJECT_0 => Ok(Acquisition::Acquired),
                WAIT_ABANDONED => Ok(Acquisition::Abandoned),
                WAIT_FAILED => Err(io::Error::last_os_error()),
                other => Err(io::Error::other(format!(
                    "unexpected wait result {other:#x}"
                ))),
            }
        }

        pub(super) fn release(&self) {
            // SAFETY: called only by the owning guard on the owning thread.
            unsafe {
                ReleaseMutex(self.handle);
            }
        }
    }

    impl Drop for Lock {
        fn drop(&mut self) {
            // SAFETY: the handle was returned by CreateMutexW and is closed once.
            unsafe {
                CloseHandle(self.handle);
            }
        }
    }
}
