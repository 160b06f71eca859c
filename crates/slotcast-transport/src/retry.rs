use std::time::{Duration, Instant};

/// Backoff discipline for writes to a full or busy slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry. Default: 50µs.
    pub initial_backoff: Duration,
    /// Upper bound for a single delay. Default: 5ms.
    pub max_backoff: Duration,
    /// How long a send may wait for room before its first byte is written.
    /// `None` waits until cancelled. Default: 5s.
    pub timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_micros(50),
            max_backoff: Duration::from_millis(5),
            timeout: Some(Duration::from_secs(5)),
        }
    }
}

impl RetryPolicy {
    pub(crate) fn start(&self) -> Backoff {
        Backoff {
            initial: self.initial_backoff,
            next: self.initial_backoff,
            max: self.max_backoff.max(self.initial_backoff),
            deadline: self.timeout.and_then(|t| Instant::now().checked_add(t)),
            started: Instant::now(),
        }
    }
}

/// Exponential backoff state for one retried operation.
#[derive(Debug)]
pub(crate) struct Backoff {
    initial: Duration,
    next: Duration,
    max: Duration,
    deadline: Option<Instant>,
    started: Instant,
}

impl Backoff {
    /// Sleep before the next attempt. Returns `false` once the deadline has
    /// passed.
    pub(crate) fn wait(&mut self) -> bool {
        let delay = match self.deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return false;
                }
                self.next.min(deadline - now)
            }
            None => self.next,
        };
        std::thread::sleep(delay);
        self.grow();
        true
    }

    /// Sleep before the next attempt, ignoring the deadline.
    pub(crate) fn pause(&mut self) {
        std::thread::sleep(self.next);
        self.grow();
    }

    /// Start the delay over after progress. The deadline is kept.
    pub(crate) fn reset(&mut self) {
        self.next = self.initial;
    }

    fn grow(&mut self) {
        self.next = self.next.saturating_mul(2).min(self.max);
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
