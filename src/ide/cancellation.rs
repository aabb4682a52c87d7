//! Cooperative, throttled cancellation.
//!
//! Long scans poll [`CancellationToken::throttled_cancellation_check`] once
//! per file. The host is only asked again after the throttle interval has
//! elapsed; in between the last answer is reused. Once a token has observed
//! cancellation it stays cancelled.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::warn;

/// Something that can report whether the current request was cancelled.
pub trait CancellationHost: Send + Sync {
    fn is_cancellation_requested(&self) -> bool;
}

impl CancellationHost for tokio_util::sync::CancellationToken {
    fn is_cancellation_requested(&self) -> bool {
        self.is_cancelled()
    }
}

impl CancellationHost for AtomicBool {
    fn is_cancellation_requested(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct ThrottleState {
    last_check: Option<Instant>,
    cancelled: bool,
}

pub struct CancellationToken {
    throttle: Duration,
    host: Option<Arc<dyn CancellationHost>>,
    state: Mutex<ThrottleState>,
}

impl CancellationToken {
    /// A token polling `host` at most once per `throttle`.
    pub fn new(throttle: Duration, host: Option<Arc<dyn CancellationHost>>) -> Self {
        Self {
            throttle,
            host,
            state: Mutex::new(ThrottleState {
                last_check: None,
                cancelled: false,
            }),
        }
    }

    /// A token that is never cancelled.
    pub fn none() -> Self {
        Self::new(Duration::ZERO, None)
    }

    /// Ask the host directly, ignoring the throttle.
    pub fn is_cancellation_requested(&self) -> bool {
        let mut state = self.state.lock();
        if state.cancelled {
            return true;
        }
        state.cancelled = self
            .host
            .as_ref()
            .is_some_and(|host| host.is_cancellation_requested());
        state.cancelled
    }

    /// Ask the host if the throttle interval has elapsed, else reuse the last answer.
    pub fn throttled_cancellation_check(&self) -> bool {
        let Some(host) = self.host.as_ref() else {
            return false;
        };
        let mut state = self.state.lock();
        if state.cancelled {
            return true;
        }
        let now = Instant::now();
        let due = self.throttle.is_zero()
            || state
                .last_check
                .is_none_or(|last| now.duration_since(last) >= self.throttle);
        if due {
            state.last_check = Some(now);
            state.cancelled = host.is_cancellation_requested();
            if state.cancelled {
                warn!("cancellation requested");
            }
        }
        state.cancelled
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("throttle", &self.throttle)
            .field("has_host", &self.host.is_some())
            .field("cancelled", &self.state.lock().cancelled)
            .finish()
    }
}
