//! Refresh timer for the "now" marker
//!
//! The host polls the timer from its update loop. The timer is a plain
//! handle owned by the session; cancelling it stops all further refreshes.

use std::time::{Duration, Instant};

/// How often the now marker is re-sampled from the system clock
pub const NOW_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Shortest accepted interval; shorter ones are raised to this
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Polled periodic timer with explicit cancellation
#[derive(Debug, Clone)]
pub struct RefreshTimer {
    interval: Duration,
    /// `None` once cancelled
    next_due: Option<Instant>,
}

impl RefreshTimer {
    /// Start a timer whose first tick is one interval after `at`
    pub fn start(interval: Duration, at: Instant) -> Self {
        let interval = interval.max(MIN_INTERVAL);
        Self {
            interval,
            next_due: Some(at + interval),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns true when the timer is due at `at`
    ///
    /// Fires at most once per call. Ticks missed while the host was stalled
    /// are coalesced and the next deadline is realigned to the interval grid.
    pub fn poll(&mut self, at: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if at < due {
            return false;
        }

        let missed = (at - due).as_nanos() / self.interval.as_nanos();
        let step = self.interval.as_nanos() * (missed + 1);
        self.next_due = Some(due + Duration::from_nanos(step as u64));
        true
    }

    /// Stop the timer; later polls never fire
    pub fn cancel(&mut self) {
        self.next_due = None;
    }
}
