//! Detection simulation engine.
//!
//! Each tick runs the full pipeline under the state lock:
//! scenario selection, raw generation, threshold filter, publish, stats fold
//! and history append. Observers only ever see whole ticks.
//!
//! Every schedule carries the state `generation` it was started under.
//! Stopping or re-thresholding bumps the generation while holding the lock,
//! then joins the old worker, so a stale tick can never publish.

use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::clock::{draw_period, now_millis, ScheduleHandle};
use crate::config::{EngineConfig, ScheduleSettings};
use crate::detect::{ConfidenceThreshold, Detection, DetectionSource, Scenario, SyntheticDetector};
use crate::history::DetectionHistory;
use crate::stats::{sample_processing_time, Stats};

/// Outcome of one tick, delivered to subscribers.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    pub scenario: Scenario,
    pub at_ms: u64,
    pub detections: Vec<Detection>,
    pub stats: Stats,
}

/// Read-only view of everything the presentation layer renders.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub active: bool,
    pub confidence_threshold: ConfidenceThreshold,
    pub detections: Vec<Detection>,
    pub stats: Stats,
    pub history: Vec<Detection>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerMode {
    /// Ticks come from an owned [`ScheduleHandle`].
    Live,
    /// The host calls [`DetectionEngine::tick_at`] itself.
    Manual,
}

struct EngineState {
    source: Box<dyn DetectionSource>,
    rng: StdRng,
    threshold: ConfidenceThreshold,
    active: bool,
    generation: u64,
    current: Vec<Detection>,
    stats: Stats,
    history: DetectionHistory,
    subscribers: Vec<Sender<TickReport>>,
}

impl EngineState {
    fn run_tick(&mut self, now_ms: u64) -> TickReport {
        let scenario = Scenario::at(now_ms);
        let raw = self.source.detect(scenario, now_ms);
        let raw_len = raw.len();
        let batch = self.threshold.apply(raw);

        let processing_time = sample_processing_time(&mut self.rng);
        self.stats = self.stats.fold(&batch, processing_time);
        self.history.append(batch.iter().cloned());
        self.current = batch;

        log::debug!(
            "tick scenario={} raw={} kept={} avg_conf={:.3} history={}",
            scenario,
            raw_len,
            self.current.len(),
            self.stats.avg_confidence,
            self.history.len()
        );

        let report = TickReport {
            scenario,
            at_ms: now_ms,
            detections: self.current.clone(),
            stats: self.stats.clone(),
        };
        self.subscribers
            .retain(|subscriber| subscriber.send(report.clone()).is_ok());
        report
    }
}

pub struct DetectionEngine {
    state: Arc<Mutex<EngineState>>,
    schedule: Option<ScheduleHandle>,
    settings: ScheduleSettings,
    mode: TimerMode,
}

impl DetectionEngine {
    /// Engine with the synthetic detector and a live timer, already running.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let source = SyntheticDetector::new(config.seed);
        Self::with_source(config, source)
    }

    /// Live engine over a custom detection source.
    pub fn with_source<S: DetectionSource + 'static>(
        config: EngineConfig,
        source: S,
    ) -> Result<Self> {
        config.validate()?;
        let mut engine = Self::build(config, Box::new(source), TimerMode::Live);
        engine.start_schedule()?;
        Ok(engine)
    }

    /// Engine without a timer. Starts active; ticks only via [`Self::tick_at`].
    pub fn manual(config: EngineConfig) -> Self {
        let source = SyntheticDetector::new(config.seed);
        Self::manual_with_source(config, source)
    }

    pub fn manual_with_source<S: DetectionSource + 'static>(
        config: EngineConfig,
        source: S,
    ) -> Self {
        Self::build(config, Box::new(source), TimerMode::Manual)
    }

    fn build(config: EngineConfig, source: Box<dyn DetectionSource>, mode: TimerMode) -> Self {
        // keep the engine's draws independent of the detector's stream
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        log::info!(
            "detection engine using source '{}' threshold={} seeded={}",
            source.name(),
            config.confidence_threshold.value(),
            config.seed.is_some()
        );
        let state = EngineState {
            source,
            rng,
            threshold: config.confidence_threshold,
            active: true,
            generation: 0,
            current: Vec::new(),
            stats: Stats::default(),
            history: DetectionHistory::new(),
            subscribers: Vec::new(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            schedule: None,
            settings: config.schedule,
            mode,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, EngineState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("engine state lock poisoned"))
    }

    fn start_schedule(&mut self) -> Result<()> {
        if self.mode == TimerMode::Manual {
            return Ok(());
        }
        self.stop_schedule()?;

        let (generation, period) = {
            let mut state = self.lock()?;
            let period = draw_period(
                &mut state.rng,
                self.settings.base_interval_ms,
                self.settings.jitter_ms,
            );
            (state.generation, period)
        };

        let shared = Arc::downgrade(&self.state);
        let handle = ScheduleHandle::spawn(period, move || {
            let Some(state) = shared.upgrade() else {
                return;
            };
            let mut guard = match state.lock() {
                Ok(guard) => guard,
                Err(_) => {
                    log::error!("engine state lock poisoned, skipping tick");
                    return;
                }
            };
            if !guard.active || guard.generation != generation {
                return;
            }
            guard.run_tick(now_millis());
        })?;
        log::info!(
            "detection schedule started: period={}ms generation={}",
            period.as_millis(),
            generation
        );
        self.schedule = Some(handle);
        Ok(())
    }

    fn stop_schedule(&mut self) -> Result<()> {
        if let Some(handle) = self.schedule.take() {
            handle.cancel()?;
            log::info!("detection schedule stopped");
        }
        Ok(())
    }

    /// Start (`true`) or stop (`false`) detection. Redundant calls are no-ops.
    ///
    /// Stopping clears the published batch but keeps stats and history.
    pub fn set_active(&mut self, active: bool) -> Result<()> {
        {
            let mut state = self.lock()?;
            if state.active == active {
                log::debug!("detection already {}", if active { "active" } else { "stopped" });
                return Ok(());
            }
            state.active = active;
            state.generation += 1;
            if !active {
                state.current.clear();
            }
        }
        if active {
            self.start_schedule()
        } else {
            self.stop_schedule()
        }
    }

    /// Sets the confidence cutoff, clamped into `[0, 1]`.
    ///
    /// A changed threshold tears down the running schedule and starts a new
    /// one with a freshly drawn period. Already-published detections are
    /// not re-filtered.
    pub fn set_confidence_threshold(&mut self, value: f32) -> Result<()> {
        let threshold = ConfidenceThreshold::new(value);
        let rebuild = {
            let mut state = self.lock()?;
            if state.threshold == threshold {
                return Ok(());
            }
            state.threshold = threshold;
            state.generation += 1;
            state.active
        };
        log::info!("confidence threshold set to {:.2}", threshold.value());
        if rebuild {
            self.start_schedule()?;
        }
        Ok(())
    }

    /// Zeroes stats and clears the history and the published batch.
    pub fn reset(&mut self) -> Result<()> {
        let mut state = self.lock()?;
        state.stats = Stats::default();
        state.history.clear();
        state.current.clear();
        log::info!("detection stats reset");
        Ok(())
    }

    /// Runs one tick at `now_ms` if the engine is active. Returns whether it ran.
    pub fn tick_at(&self, now_ms: u64) -> Result<bool> {
        let mut state = self.lock()?;
        if !state.active {
            return Ok(false);
        }
        state.run_tick(now_ms);
        Ok(true)
    }

    /// Receives a [`TickReport`] after every tick from now on.
    pub fn subscribe(&self) -> Result<Receiver<TickReport>> {
        let (tx, rx) = mpsc::channel();
        self.lock()?.subscribers.push(tx);
        Ok(rx)
    }

    pub fn is_active(&self) -> Result<bool> {
        Ok(self.lock()?.active)
    }

    pub fn confidence_threshold(&self) -> Result<ConfidenceThreshold> {
        Ok(self.lock()?.threshold)
    }

    /// Period of the live schedule, if one is running.
    pub fn schedule_period(&self) -> Option<Duration> {
        self.schedule.as_ref().map(ScheduleHandle::period)
    }

    pub fn current_detections(&self) -> Result<Vec<Detection>> {
        Ok(self.lock()?.current.clone())
    }

    pub fn stats(&self) -> Result<Stats> {
        Ok(self.lock()?.stats.clone())
    }

    pub fn history(&self) -> Result<Vec<Detection>> {
        Ok(self.lock()?.history.snapshot())
    }

    /// Consistent view of batch, stats and history taken under one lock.
    pub fn snapshot(&self) -> Result<EngineSnapshot> {
        let state = self.lock()?;
        Ok(EngineSnapshot {
            active: state.active,
            confidence_threshold: state.threshold,
            detections: state.current.clone(),
            stats: state.stats.clone(),
            history: state.history.snapshot(),
        })
    }
}

impl Drop for DetectionEngine {
    fn drop(&mut self) {
        if let Err(err) = self.stop_schedule() {
            log::error!("failed to stop detection schedule: {}", err);
        }
    }
}
