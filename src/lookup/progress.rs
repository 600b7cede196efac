use std::sync::Mutex;
use std::time::Instant;

/// Receives build progress as (fraction complete, items done).
///
/// Called from worker threads, so it must be cheap and must not block.
pub trait Progress: Sync {
    fn report(&self, fraction: f64, count: u64);
}

/// Silent.
impl Progress for () {
    fn report(&self, _: f64, _: u64) {}
}

#[cfg(feature = "native")]
impl Progress for indicatif::ProgressBar {
    fn report(&self, fraction: f64, count: u64) {
        if let Some(total) = self.length() {
            self.set_position(((fraction * total as f64) as u64).min(total));
        } else {
            self.set_position(count);
        }
    }
}

/// Logs throughput at most once per interval.
pub struct Ticker {
    begin: Instant,
    every: std::time::Duration,
    delta: Mutex<(Instant, u64)>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::every(crate::PROGRESS_LOG_INTERVAL)
    }
    pub fn every(every: std::time::Duration) -> Self {
        let now = Instant::now();
        Self {
            begin: now,
            every,
            delta: Mutex::new((now, 0)),
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for Ticker {
    fn report(&self, fraction: f64, count: u64) {
        let Ok(mut last) = self.delta.try_lock() else {
            return;
        };
        let now = Instant::now();
        let delta_t = now.duration_since(last.0);
        if delta_t < self.every && fraction < 1.0 {
            return;
        }
        let total_t = now.duration_since(self.begin);
        log::info!(
            "progress: {:8.0?} {:>12} {:6.2}%   mean {:10.0}   last {:10.0}",
            total_t,
            count,
            fraction * 100.0,
            count as f64 / total_t.as_secs_f64().max(f64::EPSILON),
            count.saturating_sub(last.1) as f64 / delta_t.as_secs_f64().max(f64::EPSILON),
        );
        *last = (now, count);
    }
}
