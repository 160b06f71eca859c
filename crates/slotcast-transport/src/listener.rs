use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::fd::AsRawFd;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{FileTypeExt, MetadataExt, OpenOptionsExt};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::address::ResolvedAddress;
use crate::config::SlotConfig;
use crate::error::{Result, TransportError};

/// Receive side of a broadcast slot, backed by a FIFO.
///
/// Senders can only open the slot while a listener is bound. The listener
/// keeps its own write end open so reads block for data instead of hitting
/// EOF between senders. Bytes arrive as the senders' chunks concatenated;
/// frame boundaries are recovered by the frame decoder.
pub struct SlotListener {
    reader: File,
    _keepalive: File,
    path: PathBuf,
    address: ResolvedAddress,
    created_inode: Option<(u64, u64)>,
}

impl SlotListener {
    /// Default permission mode for created slot FIFOs.
    pub const DEFAULT_SLOT_MODE: u32 = 0o600;

    /// Create (or reuse) the slot for `address` and open its receive side.
    pub fn bind(address: &ResolvedAddress, config: &SlotConfig) -> Result<Self> {
        Self::bind_with_mode(address, config, Self::DEFAULT_SLOT_MODE)
    }

    /// Bind with an explicit FIFO permission mode.
    pub fn bind_with_mode(
        address: &ResolvedAddress,
        config: &SlotConfig,
        mode: u32,
    ) -> Result<Self> {
        let path = config.slot_path(address);
        let bind_err = |source: io::Error| TransportError::Bind {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&config.runtime_dir).map_err(bind_err)?;
        let created = create_fifo(&path, mode).map_err(bind_err)?;

        let reader = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&path)
            .map_err(bind_err)?;
        let _keepalive = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&path)
            .map_err(bind_err)?;
        set_blocking(&reader).map_err(bind_err)?;
        grow_buffer(&reader, config.slot_buffer_size);

        let created_inode = if created {
            let metadata = std::fs::symlink_metadata(&path).map_err(bind_err)?;
            Some((metadata.dev(), metadata.ino()))
        } else {
            None
        };

        info!(address = %address, ?path, "listening on slot");

        Ok(Self {
            reader,
            _keepalive,
            path,
            address: address.clone(),
            created_inode,
        })
    }

    /// Wait until data is available. Returns `false` on timeout.
    pub fn wait_readable(&self, timeout: Option<Duration>) -> Result<bool> {
        let mut pfd = libc::pollfd {
            fd: self.reader.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout_ms = timeout
            .map(|t| t.as_millis().min(i32::MAX as u128) as i32)
            .unwrap_or(-1);

        loop {
            // SAFETY: `pfd` is a valid pollfd for one descriptor owned by `self.reader`.
            let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
            if rc >= 0 {
                return Ok(rc > 0);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(TransportError::Io(err));
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn address(&self) -> &ResolvedAddress {
        &self.address
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "fifo"
    }
}

impl Read for SlotListener {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Drop for SlotListener {
    fn drop(&mut self) {
        let Some((expected_dev, expected_ino)) = self.created_inode else {
            return;
        };
        if let Ok(metadata) = std::fs::symlink_metadata(&self.path) {
            if metadata.file_type().is_fifo()
                && metadata.dev() == expected_dev
                && metadata.ino() == expected_ino
            {
                debug!(path = ?self.path, "removing slot fifo");
                let _ = std::fs::remove_file(&self.path);
            } else {
                debug!(path = ?self.path, "slot path identity changed; skipping cleanup");
            }
        }
    }
}

impl std::fmt::Debug for SlotListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotListener")
            .field("address", &self.address.as_str())
            .field("path", &self.path)
            .finish()
    }
}

/// Create the FIFO at `path`. Returns `false` when an existing FIFO is reused.
fn create_fifo(path: &Path, mode: u32) -> io::Result<bool> {
    if let Ok(metadata) = std::fs::symlink_metadata(path) {
        if metadata.file_type().is_fifo() {
            debug!(?path, "reusing existing slot fifo");
            return Ok(false);
        }
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "existing path is not a fifo",
        ));
    }

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "slot path contains NUL"))?;
    // SAFETY: `c_path` is a valid NUL-terminated path.
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), mode as libc::mode_t) };
    if rc == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    if err.kind() == io::ErrorKind::AlreadyExists {
        return Ok(false);
    }
    Err(err)
}

/// Ask for a pipe buffer that holds a whole frame, so senders can reserve
/// room before writing. Falls back to the system default on failure.
#[cfg(any(target_os = "linux", target_os = "android"))]
fn grow_buffer(file: &File, size: usize) {
    let size = libc::c_int::try_from(size).unwrap_or(libc::c_int::MAX);
    // SAFETY: `file` owns an open pipe descriptor.
    let rc = unsafe { libc::fcntl(file.as_raw_fd(), libc::F_SETPIPE_SZ, size) };
    if rc < 0 {
        debug!(
            requested = size,
            error = %io::Error::last_os_error(),
            "could not grow slot buffer"
        );
    } else {
        debug!(size = rc, "slot buffer size");
    }
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn grow_buffer(_file: &File, _size: usize) {}

fn set_blocking(file: &File) -> io::Result<()> {
    let fd = file.as_raw_fd();
    // SAFETY: `fd` is an open descriptor owned by `file`.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: as above; only O_NONBLOCK is cleared.
    let rc = unsafe { libc::fcntl(fd, libc::F_SETFL, flags & !libc::O_NONBLOCK) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
