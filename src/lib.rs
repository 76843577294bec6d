//! Vehicle detection simulator.
//!
//! This crate implements the engine behind a simulated vehicle-detection feed.
//! On a jittered timer it synthesizes plausible car/bike detections, filters
//! them against a confidence threshold and folds them into statistics and a
//! bounded history. No computer-vision inference happens here; video capture
//! and overlay rendering belong to the host application.
//!
//! # Pipeline
//!
//! Every tick runs, atomically with respect to readers:
//!
//! 1. **Scenario selection**: `floor(now_ms / 8000) mod 5` picks a traffic profile.
//! 2. **Generation**: a [`DetectionSource`] produces the raw batch.
//! 3. **Filtering**: detections below the [`ConfidenceThreshold`] are dropped.
//! 4. **Publish**: the batch becomes the current detections.
//! 5. **Aggregation**: [`Stats`] totals grow, and the batch mean is recorded.
//! 6. **History**: the batch is appended to the 100-entry [`DetectionHistory`].
//!
//! # Module Structure
//!
//! - `detect`: detection types, scenario table, synthetic detector, threshold
//! - `stats`: statistics fold
//! - `history`: bounded FIFO history
//! - `clock`: owned recurring schedule with join-on-cancel
//! - `engine`: lifecycle, configuration changes and snapshots
//! - `config`: file/env configuration
//! - `ui`: terminal rendering for the bundled binary

pub mod clock;
pub mod config;
pub mod detect;
pub mod engine;
pub mod history;
pub mod stats;
pub mod ui;

pub use clock::{draw_period, now_millis, ScheduleHandle};
pub use config::{EngineConfig, ScheduleSettings};
pub use detect::{
    ConfidenceThreshold, Detection, DetectionSource, GenerationProfile, Scenario,
    SyntheticDetector, VehicleProfile, VehicleType, DEFAULT_CONFIDENCE_THRESHOLD,
};
pub use engine::{DetectionEngine, EngineSnapshot, TickReport};
pub use history::{DetectionHistory, HISTORY_CAPACITY};
pub use stats::Stats;
