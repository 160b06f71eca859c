use std::io::{ErrorKind, Write};

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::address::ResolvedAddress;
use crate::config::SlotConfig;
use crate::error::{Result, TransportError};
use crate::retry::{Backoff, RetryPolicy};

/// Write side of a broadcast slot.
///
/// Opening fails with [`TransportError::Unavailable`] unless a listener has
/// created the receive side. The OS handle is closed exactly once on drop.
pub struct SlotHandle {
    inner: imp::Handle,
    address: ResolvedAddress,
}

impl SlotHandle {
    /// Open the slot for `address` without blocking on an absent listener.
    pub fn open(address: &ResolvedAddress, config: &SlotConfig) -> Result<Self> {
        let inner = imp::Handle::open(address, config)
            .map_err(|err| TransportError::unavailable(address.as_str(), err))?;
        debug!(address = %address, "slot opened");
        Ok(Self {
            inner,
            address: address.clone(),
        })
    }

    pub fn address(&self) -> &ResolvedAddress {
        &self.address
    }

    /// Close the handle now instead of at end of scope.
    pub fn close(self) {
        drop(self);
    }
}

/// Space in a slot's kernel buffer, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRoom {
    /// Writable now without blocking.
    pub free: usize,
    /// Writable into an empty buffer.
    pub usable: usize,
}

/// A byte sink that can report how much it accepts without blocking.
pub trait SlotSink: Write {
    /// Current buffer space, or `None` when the sink cannot tell.
    fn room(&self) -> std::io::Result<Option<SlotRoom>> {
        Ok(None)
    }
}

impl SlotSink for SlotHandle {
    fn room(&self) -> std::io::Result<Option<SlotRoom>> {
        self.inner.room()
    }
}

impl Write for SlotHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Drop for SlotHandle {
    fn drop(&mut self) {
        trace!(address = %self.address, "slot closed");
    }
}

impl std::fmt::Debug for SlotHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotHandle")
            .field("address", &self.address.as_str())
            .finish()
    }
}

/// Writes one frame to a slot as a sequence of chunks.
///
/// A frame is all-or-nothing from the receiver's point of view. The retry
/// deadline and the cancellation token only apply until the first byte is
/// written; after that the writer keeps retrying until the frame is
/// complete, so a give-up never leaves a truncated frame in the slot. When
/// the sink reports its free space, the writer waits for room for the whole
/// frame before starting it.
pub struct SlotWriter<W> {
    inner: W,
    address: String,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl<W: SlotSink> SlotWriter<W> {
    pub fn new(inner: W, address: impl Into<String>) -> Self {
        Self {
            inner,
            address: address.into(),
            policy: RetryPolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Write every chunk of one frame in order. Returns the number of bytes
    /// written.
    ///
    /// The policy's timeout bounds the whole frame, not each chunk.
    pub fn write_chunks<'c, I>(&mut self, chunks: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'c [u8]>,
    {
        let chunks: Vec<&[u8]> = chunks.into_iter().collect();
        let total: usize = chunks.iter().map(|chunk| chunk.len()).sum();

        let mut backoff = self.policy.start();
        self.reserve(total, &mut backoff)?;

        let mut written = 0usize;
        for chunk in chunks {
            self.write_one(chunk, &mut backoff, &mut written)?;
        }
        trace!(address = %self.address, bytes = written, "chunks written");
        Ok(written)
    }

    /// Write a frame that fits in a single chunk.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.write_chunks([chunk]).map(|_| ())
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Wait until the sink has room for `total` bytes, or it cannot say.
    ///
    /// A frame bigger than the whole buffer waits for an empty buffer and is
    /// then written as the reader drains it.
    fn reserve(&mut self, total: usize, backoff: &mut Backoff) -> Result<()> {
        loop {
            self.check_cancelled()?;
            match self.inner.room()? {
                Some(room) if room.free < total.min(room.usable) => {}
                _ => return Ok(()),
            }
            if !backoff.wait() {
                return Err(self.timed_out(backoff));
            }
            trace!(address = %self.address, needed = total, "slot has no room for frame yet");
        }
    }

    fn write_one(
        &mut self,
        chunk: &[u8],
        backoff: &mut Backoff,
        written: &mut usize,
    ) -> Result<()> {
        let mut offset = 0usize;

        while offset < chunk.len() {
            match self.inner.write(&chunk[offset..]) {
                Ok(n) if n > 0 => {
                    offset += n;
                    *written += n;
                    backoff.reset();
                    continue;
                }
                Ok(_) => {}
                Err(err) if is_transient(&err) => {}
                Err(err) => return Err(TransportError::Io(err)),
            }

            if *written == 0 {
                self.check_cancelled()?;
                if !backoff.wait() {
                    return Err(self.timed_out(backoff));
                }
            } else {
                // Part of the frame is already in the slot.
                backoff.pause();
            }
            trace!(address = %self.address, written = *written, "slot busy, retrying chunk");
        }

        Ok(())
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(TransportError::Cancelled {
                address: self.address.clone(),
            });
        }
        Ok(())
    }

    fn timed_out(&self, backoff: &Backoff) -> TransportError {
        TransportError::WriteTimeout {
            address: self.address.clone(),
            elapsed: backoff.elapsed(),
        }
    }
}

fn is_transient(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::WouldBlock | ErrorKind::Interrupted | ErrorKind::TimedOut
    )
}

#[cfg(unix)]
mod imp {
    use std::fs::{File, OpenOptions};
    use std::io::{self, Write};
    use std::os::unix::fs::{FileTypeExt, OpenOptionsExt};

    use tracing::debug;

    use super::SlotRoom;
    use crate::address::ResolvedAddress;
    use crate::config::SlotConfig;

    /// Write end of a slot FIFO, opened non-blocking so an absent reader
    /// fails the open (`ENXIO`) instead of hanging it.
    pub(super) struct Handle {
        file: File,
    }

    impl Handle {
        pub(super) fn open(address: &ResolvedAddress, config: &SlotConfig) -> io::Result<Self> {
            let file = OpenOptions::new()
                .write(true)
                .custom_flags(libc::O_NONBLOCK)
                .open(config.slot_path(address))?;

            if !file.metadata()?.file_type().is_fifo() {
                debug!(path = ?config.slot_path(address), "slot path exists but is not a fifo");
                return Err(io::Error::from_raw_os_error(libc::EINVAL));
            }
            Ok(Self { file })
        }

        /// Room left in the pipe, less slack for pages the kernel cannot
        /// fill: a partly drained head page and short chunk tails.
        #[cfg(any(target_os = "linux", target_os = "android"))]
        pub(super) fn room(&self) -> io::Result<Option<SlotRoom>> {
            use std::os::fd::AsRawFd;

            const PAGE_SLACK: usize = 4096;

            let fd = self.file.as_raw_fd();
            // SAFETY: `fd` is an open descriptor owned by `self.file`.
            let capacity = unsafe { libc::fcntl(fd, libc::F_GETPIPE_SZ) };
            if capacity < 0 {
                return Err(io::Error::last_os_error());
            }
            let mut queued: libc::c_int = 0;
            // SAFETY: FIONREAD stores one c_int through the given pointer.
            let rc = unsafe { libc::ioctl(fd, libc::FIONREAD, &mut queued as *mut libc::c_int) };
            if rc < 0 {
                return Err(io::Error::last_os_error());
            }

            let capacity = capacity as usize;
            let usable = capacity.saturating_sub(capacity / 16 + PAGE_SLACK);
            let free = usable.saturating_sub(queued.max(0) as usize);
            Ok(Some(SlotRoom { free, usable }))
        }

        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        pub(super) fn room(&self) -> io::Result<Option<SlotRoom>> {
            Ok(None)
        }

        pub(super) fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.file.write(buf)
        }
    }
}

#[cfg(windows)]
mod imp {
    use std::io;

    use windows_sys::Win32::Foundation::{CloseHandle, GENERIC_WRITE, HANDLE, INVALID_HANDLE_VALUE};
    use windows_sys::Win32::Storage::FileSystem::{
        CreateFileW, WriteFile, FILE_ATTRIBUTE_NORMAL, FILE_SHARE_READ, OPEN_EXISTING,
    };

    use crate::address::ResolvedAddress;
    use crate::config::SlotConfig;

    /// Client handle to a mailslot.
    pub(super) struct Handle {
        handle: HANDLE,
    }

    impl Handle {
        pub(super) fn open(address: &ResolvedAddress, _config: &SlotConfig) -> io::Result<Self> {
            let wide = crate::to_wide(address.as_str());
            // SAFETY: `wide` is a NUL-terminated UTF-16 string that outlives the call.
            let handle = unsafe {
                CreateFileW(
                    wide.as_ptr(),
                    GENERIC_WRITE,
                    FILE_SHARE_READ,
                    std::ptr::null(),
                    OPEN_EXISTING,
                    FILE_ATTRIBUTE_NORMAL,
                    std::ptr::null_mut(),
                )
            };
            if handle == INVALID_HANDLE_VALUE {
                return Err(io::Error::last_os_error());
            }
            Ok(Self { handle })
        }

        pub(super) fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let len = u32::try_from(buf.len()).unwrap_or(u32::MAX);
            let mut written = 0u32;
            // SAFETY: `buf` is valid for `len` bytes and `written` is a valid out pointer.
            let ok = unsafe {
                WriteFile(
                    self.handle,
                    buf.as_ptr(),
                    len,
                    &mut written,
                    std::ptr::null_mut(),
                )
            };
            if ok == 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(written as usize)
        }

        /// A mailslot takes each write as one message, so there is no byte
        /// buffer to report.
        pub(super) fn room(&self) -> io::Result<Option<super::SlotRoom>> {
            Ok(None)
        }
    }

    impl Drop for Handle {
        fn drop(&mut self) {
            // SAFETY: the handle came from CreateFileW and is closed once.
            unsafe {
                CloseHandle(self.handle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    use super::*;

    #[test]
    fn writes_chunks_in_order() {
        let mut writer = SlotWriter::new(Cursor::new(Vec::<u8>::new()), "test");
        let data = b"abcdefghij";

        let written = writer.write_chunks(data.chunks(3)).unwrap();

        assert_eq!(written, data.len());
        assert_eq!(writer.into_inner().into_inner(), data);
    }

    #[test]
    fn keeps_each_chunk_a_separate_write() {
        let mut writer = SlotWriter::new(RecordingWriter::default(), "test");
        writer
            .write_chunks([&b"one"[..], &b"two"[..], &b"three"[..]])
            .unwrap();

        assert_eq!(
            writer.into_inner().writes,
            vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]
        );
    }

    #[test]
    fn retries_busy_slot_until_it_drains() {
        let busy = BusyWriter::new(3, ErrorKind::WouldBlock);
        let mut writer = SlotWriter::new(busy, "test");

        writer.write_chunk(b"payload").unwrap();

        let inner = writer.into_inner();
        assert_eq!(inner.attempts, 4);
        assert_eq!(inner.data, b"payload");
    }

    #[test]
    fn retries_interrupted_and_zero_length_writes() {
        let mut writer = SlotWriter::new(BusyWriter::new(2, ErrorKind::Interrupted), "test");
        writer.write_chunk(b"x").unwrap();

        let mut writer = SlotWriter::new(ZeroThenAccept { zero_left: 2, data: Vec::new() }, "t");
        writer.write_chunk(b"y").unwrap();
        assert_eq!(writer.into_inner().data, b"y");
    }

    #[test]
    fn continues_after_partial_write() {
        let mut writer = SlotWriter::new(HalfWriter::default(), "test");
        writer.write_chunk(b"0123456789").unwrap();
        assert_eq!(writer.into_inner().data, b"0123456789");
    }

    #[test]
    fn stuck_slot_times_out() {
        let policy = RetryPolicy {
            initial_backoff: Duration::from_micros(100),
            max_backoff: Duration::from_millis(1),
            timeout: Some(Duration::from_millis(20)),
        };
        let mut writer =
            SlotWriter::new(BusyWriter::new(usize::MAX, ErrorKind::WouldBlock), "stuck")
                .with_policy(policy);

        let err = writer.write_chunk(b"never").unwrap_err();
        match err {
            TransportError::WriteTimeout { address, elapsed } => {
                assert_eq!(address, "stuck");
                assert!(elapsed >= Duration::from_millis(20));
            }
            other => panic!("expected WriteTimeout, got {other:?}"),
        }
    }

    #[test]
    fn cancelled_token_stops_retrying() {
        let cancel = CancellationToken::new();
        let policy = RetryPolicy {
            timeout: None,
            ..RetryPolicy::default()
        };
        let mut writer =
            SlotWriter::new(BusyWriter::new(usize::MAX, ErrorKind::WouldBlock), "busy")
                .with_policy(policy)
                .with_cancellation(cancel.clone());

        let trigger = cancel.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            trigger.cancel();
        });

        let err = writer.write_chunk(b"data").unwrap_err();
        assert!(matches!(err, TransportError::Cancelled { .. }));
        canceller.join().unwrap();
    }

    #[test]
    fn cancelled_before_start_writes_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut writer =
            SlotWriter::new(Cursor::new(Vec::<u8>::new()), "idle").with_cancellation(cancel);

        let err = writer.write_chunks([&b"abc"[..]]).unwrap_err();
        assert!(matches!(err, TransportError::Cancelled { .. }));
        assert!(writer.get_ref().get_ref().is_empty());
    }

    #[test]
    fn started_frame_finishes_past_the_deadline() {
        let policy = RetryPolicy {
            initial_backoff: Duration::from_micros(100),
            max_backoff: Duration::from_millis(1),
            timeout: Some(Duration::from_millis(5)),
        };
        let sink = StallAfterFirst {
            stalls_left: 40,
            data: Vec::new(),
        };
        let mut writer = SlotWriter::new(sink, "slow").with_policy(policy);

        let started = Instant::now();
        writer.write_chunks([&b"head-"[..], &b"tail"[..]]).unwrap();

        assert!(started.elapsed() > Duration::from_millis(5));
        assert_eq!(writer.into_inner().data, b"head-tail");
    }

    #[test]
    fn one_deadline_covers_waiting_for_room_and_writing() {
        let policy = RetryPolicy {
            initial_backoff: Duration::from_micros(100),
            max_backoff: Duration::from_millis(1),
            timeout: Some(Duration::from_millis(30)),
        };
        // No room for 15ms, then writes block until 40ms. Separate budgets
        // for the two phases would finish the frame at 40ms.
        let sink = ScheduledSink {
            opened: Instant::now(),
            room_after: Duration::from_millis(15),
            writable_after: Duration::from_millis(40),
            data: Vec::new(),
        };
        let mut writer = SlotWriter::new(sink, "late").with_policy(policy);

        let chunks = [&b"aaaa"[..], &b"bbbb"[..], &b"cccc"[..]];
        let err = writer.write_chunks(chunks).unwrap_err();

        assert!(matches!(err, TransportError::WriteTimeout { .. }));
        assert!(writer.get_ref().data.is_empty());
    }

    #[test]
    fn full_sink_times_out_without_writing() {
        let policy = RetryPolicy {
            initial_backoff: Duration::from_micros(100),
            max_backoff: Duration::from_millis(1),
            timeout: Some(Duration::from_millis(20)),
        };
        let sink = RoomSink::new(usize::MAX, 1024);
        let mut writer = SlotWriter::new(sink, "full").with_policy(policy);

        let started = Instant::now();
        let payload = [7u8; 64];
        let err = writer.write_chunks(payload.chunks(8)).unwrap_err();

        assert!(matches!(err, TransportError::WriteTimeout { .. }));
        // One budget for all eight chunks.
        assert!(started.elapsed() < Duration::from_millis(120));
        assert!(writer.get_ref().data.is_empty());
    }

    #[test]
    fn waits_for_room_before_the_first_byte() {
        let sink = RoomSink::new(3, 1024);
        let mut writer = SlotWriter::new(sink, "tight");

        writer.write_chunks(b"0123456789".chunks(4)).unwrap();

        let sink = writer.into_inner();
        assert_eq!(sink.checks.get(), 4);
        assert_eq!(sink.data, b"0123456789");
    }

    #[test]
    fn frame_larger_than_buffer_waits_only_for_an_empty_buffer() {
        let sink = RoomSink::new(0, 16);
        let mut writer = SlotWriter::new(sink, "small");

        writer.write_chunks([&[1u8; 40][..]]).unwrap();

        assert_eq!(writer.into_inner().data.len(), 40);
    }

    #[test]
    fn hard_errors_are_surfaced() {
        let mut writer = SlotWriter::new(BusyWriter::new(1, ErrorKind::BrokenPipe), "gone");
        let err = writer.write_chunk(b"x").unwrap_err();
        assert!(matches!(err, TransportError::Io(ref io) if io.kind() == ErrorKind::BrokenPipe));
    }

    #[cfg(unix)]
    #[test]
    fn open_without_listener_is_unavailable() {
        use crate::address::{AddressResolver, ResolverConfig, Scope};

        let dir = std::env::temp_dir().join(format!("slotcast-slot-absent-{}", std::process::id()));
        let config = SlotConfig::with_runtime_dir(&dir);
        let address = AddressResolver::new(Scope::Local, &ResolverConfig::default())
            .resolve("nobody-listens");

        let err = SlotHandle::open(&address, &config).unwrap_err();
        match err {
            TransportError::Unavailable { address: a, code, .. } => {
                assert_eq!(a, address.as_str());
                assert_eq!(code, libc::ENOENT);
            }
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn regular_file_at_slot_path_is_unavailable() {
        use crate::address::{AddressResolver, ResolverConfig, Scope};

        let dir =
            std::env::temp_dir().join(format!("slotcast-slot-regular-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let config = SlotConfig::with_runtime_dir(&dir);
        let address = AddressResolver::new(Scope::Local, &ResolverConfig::default())
            .resolve("not-a-fifo");
        std::fs::write(config.slot_path(&address), b"").unwrap();

        let err = SlotHandle::open(&address, &config).unwrap_err();
        match err {
            TransportError::Unavailable { code, .. } => assert_eq!(code, libc::EINVAL),
            other => panic!("expected Unavailable, got {other:?}"),
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    impl SlotSink for Cursor<Vec<u8>> {}
    impl SlotSink for RecordingWriter {}
    impl SlotSink for BusyWriter {}
    impl SlotSink for ZeroThenAccept {}
    impl SlotSink for HalfWriter {}
    impl SlotSink for StallAfterFirst {}

    /// Accepts one write, then reports a busy slot `stalls_left` times.
    struct StallAfterFirst {
        stalls_left: usize,
        data: Vec<u8>,
    }

    impl Write for StallAfterFirst {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.data.is_empty() && self.stalls_left > 0 {
                self.stalls_left -= 1;
                return Err(ErrorKind::WouldBlock.into());
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ScheduledSink {
        opened: Instant,
        room_after: Duration,
        writable_after: Duration,
        data: Vec<u8>,
    }

    impl SlotSink for ScheduledSink {
        fn room(&self) -> std::io::Result<Option<SlotRoom>> {
            let free = if self.opened.elapsed() < self.room_after {
                0
            } else {
                1024
            };
            Ok(Some(SlotRoom { free, usable: 1024 }))
        }
    }

    impl Write for ScheduledSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.opened.elapsed() < self.writable_after {
                return Err(ErrorKind::WouldBlock.into());
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Reports an empty buffer only after `full_checks` room checks.
    struct RoomSink {
        full_checks: usize,
        usable: usize,
        checks: Cell<usize>,
        data: Vec<u8>,
    }

    impl RoomSink {
        fn new(full_checks: usize, usable: usize) -> Self {
            Self {
                full_checks,
                usable,
                checks: Cell::new(0),
                data: Vec::new(),
            }
        }
    }

    impl SlotSink for RoomSink {
        fn room(&self) -> std::io::Result<Option<SlotRoom>> {
            let checks = self.checks.get() + 1;
            self.checks.set(checks);
            let free = if checks > self.full_checks { self.usable } else { 0 };
            Ok(Some(SlotRoom {
                free,
                usable: self.usable,
            }))
        }
    }

    impl Write for RoomSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingWriter {
        writes: Vec<Vec<u8>>,
    }

    impl Write for RecordingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.writes.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct BusyWriter {
        failures_left: usize,
        kind: ErrorKind,
        attempts: usize,
        data: Vec<u8>,
    }

    impl BusyWriter {
        fn new(failures: usize, kind: ErrorKind) -> Self {
            Self {
                failures_left: failures,
                kind,
                attempts: 0,
                data: Vec::new(),
            }
        }
    }

    impl Write for BusyWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.attempts += 1;
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(std::io::Error::from(self.kind));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ZeroThenAccept {
        zero_left: usize,
        data: Vec<u8>,
    }

    impl Write for ZeroThenAccept {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.zero_left > 0 {
                self.zero_left -= 1;
                return Ok(0);
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct HalfWriter {
        data: Vec<u8>,
    }

    impl Write for HalfWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let n = buf.len().div_ceil(2);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
