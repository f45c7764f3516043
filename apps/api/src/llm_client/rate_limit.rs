//! Admission control for gateway calls.
//!
//! Two rolling-window gates, composed so that the hourly budget is claimed
//! before the per-minute one. Callers past the cap wait in FIFO order
//! (tokio's `Mutex` is fair); nothing here ever rejects a call.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Gateway admissions allowed in any rolling 60-second window.
pub const PER_MINUTE_CAP: usize = 20;
/// Gateway admissions allowed in any rolling 60-minute window.
pub const PER_HOUR_CAP: usize = 300;

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(60 * 60);

/// A single rolling-window counter: at most `capacity` admissions in any
/// span of `window`.
#[derive(Debug)]
pub struct WindowGate {
    name: &'static str,
    capacity: usize,
    window: Duration,
    admitted: Mutex<VecDeque<Instant>>,
}

impl WindowGate {
    pub fn new(name: &'static str, capacity: usize, window: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            name,
            capacity,
            window,
            admitted: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Waits until a slot is free in the current window, then claims it.
    ///
    /// The queue lock is held while sleeping, so later callers line up
    /// behind the one currently waiting.
    pub async fn acquire(&self) {
        let mut admitted = self.admitted.lock().await;
        loop {
            let now = Instant::now();
            while admitted
                .front()
                .is_some_and(|&at| now.duration_since(at) >= self.window)
            {
                admitted.pop_front();
            }

            if admitted.len() < self.capacity {
                admitted.push_back(now);
                return;
            }

            if let Some(&oldest) = admitted.front() {
                let reopens_at = oldest + self.window;
                debug!(
                    "{} gate full ({}/{}), waiting {}ms",
                    self.name,
                    admitted.len(),
                    self.capacity,
                    reopens_at.saturating_duration_since(now).as_millis()
                );
                sleep_until(reopens_at).await;
            }
        }
    }
}

/// The per-hour and per-minute gates shared by every gateway call in the
/// process.
#[derive(Debug)]
pub struct RateGates {
    per_hour: WindowGate,
    per_minute: WindowGate,
}

impl Default for RateGates {
    fn default() -> Self {
        Self::new(PER_MINUTE_CAP, PER_HOUR_CAP)
    }
}

impl RateGates {
    pub fn new(per_minute: usize, per_hour: usize) -> Self {
        Self::with_windows(per_minute, MINUTE, per_hour, HOUR)
    }

    fn with_windows(
        per_minute: usize,
        minute_window: Duration,
        per_hour: usize,
        hour_window: Duration,
    ) -> Self {
        Self {
            per_hour: WindowGate::new("per-hour", per_hour, hour_window),
            per_minute: WindowGate::new("per-minute", per_minute, minute_window),
        }
    }

    /// Claims an hourly slot, then a per-minute slot.
    pub async fn admit(&self) {
        self.per_hour.acquire().await;
        self.per_minute.acquire().await;
    }
}
