//! Recurring tick schedule.
//!
//! A [`ScheduleHandle`] owns one worker thread that invokes a callback at a
//! fixed period. Cancelling (or dropping) the handle wakes the worker and
//! joins it, so once `cancel` returns the callback cannot run again.

use anyhow::{anyhow, Result};
use rand::Rng;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Default fixed part of the tick period.
pub const DEFAULT_BASE_INTERVAL_MS: u64 = 1_500;

/// Default random part of the tick period, drawn from `[0, jitter)`.
pub const DEFAULT_JITTER_MS: u64 = 1_500;

/// Draws one schedule period: `base + uniform[0, jitter)`.
///
/// The period is fixed for the life of the schedule it is drawn for.
pub fn draw_period<R: Rng + ?Sized>(rng: &mut R, base_ms: u64, jitter_ms: u64) -> Duration {
    let jitter = if jitter_ms == 0 {
        0.0
    } else {
        rng.gen_range(0.0..jitter_ms as f64)
    };
    Duration::from_secs_f64((base_ms as f64 + jitter) / 1000.0)
}

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug)]
pub struct ScheduleHandle {
    period: Duration,
    cancel: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl ScheduleHandle {
    /// Starts invoking `on_tick` every `period` until cancelled.
    ///
    /// Ticks are aligned to `start + n * period` so a slow callback does not
    /// push later ticks back. A tick that would land in the past is skipped.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        if period.is_zero() {
            return Err(anyhow!("tick period must be greater than zero"));
        }
        let (cancel, cancelled) = mpsc::channel::<()>();
        let join = std::thread::Builder::new()
            .name("detection-ticker".to_string())
            .spawn(move || {
                let mut next = Instant::now() + period;
                loop {
                    let wait = next.saturating_duration_since(Instant::now());
                    match cancelled.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => {
                            on_tick();
                            next += period;
                            let now = Instant::now();
                            while next <= now {
                                next += period;
                            }
                        }
                        // explicit cancel or handle dropped
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .map_err(|e| anyhow!("failed to spawn tick scheduler thread: {}", e))?;

        Ok(Self {
            period,
            cancel: Some(cancel),
            join: Some(join),
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Stops the schedule and waits for the worker to exit.
    pub fn cancel(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        // Dropping the sender disconnects the channel and wakes the worker.
        self.cancel.take();
        if let Some(join) = self.join.take() {
            join.join().map_err(|_| anyhow!("tick scheduler thread panicked"))?;
        }
        Ok(())
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            log::error!("tick schedule shutdown failed: {}", err);
        }
    }
}
