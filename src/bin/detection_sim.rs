//! detection_sim - run the simulated vehicle-detection feed in a terminal
//!
//! This tool:
//! 1. Loads engine configuration (file + env), then applies CLI overrides
//! 2. Starts the detection engine on its jittered timer
//! 3. Renders every tick (scenario, batch labels, running stats)
//! 4. Stops on Ctrl-C or after `--seconds`, optionally printing a JSON snapshot

use anyhow::{anyhow, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use vehicle_detect_sim::detect::{UI_THRESHOLD_MAX, UI_THRESHOLD_MIN, UI_THRESHOLD_STEP};
use vehicle_detect_sim::{ui, ConfidenceThreshold, DetectionEngine, EngineConfig};

#[derive(Parser, Debug)]
#[command(
    name = "detection_sim",
    about = "Simulated car/bike detection feed with live statistics"
)]
struct Args {
    /// Run time in seconds (0 = until Ctrl-C).
    #[arg(long, default_value_t = 0)]
    seconds: u64,
    /// Confidence threshold in [0, 1]; out-of-range values are clamped.
    #[arg(long, env = "DETECTION_SIM_THRESHOLD")]
    threshold: Option<f32>,
    /// Deterministic seed for generation.
    #[arg(long)]
    seed: Option<u64>,
    /// Fixed part of the tick period in milliseconds.
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,
    /// Random part of the tick period in milliseconds.
    #[arg(long, value_name = "MS")]
    jitter_ms: Option<u64>,
    /// UI mode for stderr feed (auto|plain|pretty)
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
    /// Print the final engine snapshot as JSON on stdout.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = EngineConfig::load()?;
    if let Some(threshold) = args.threshold {
        config.confidence_threshold = ConfidenceThreshold::new(threshold);
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(interval) = args.interval_ms {
        config.schedule.base_interval_ms = interval;
    }
    if let Some(jitter) = args.jitter_ms {
        config.schedule.jitter_ms = jitter;
    }

    if !config.confidence_threshold.on_slider() {
        log::info!(
            "threshold {:.3} is off the front-end slider ({}..={} step {})",
            config.confidence_threshold.value(),
            UI_THRESHOLD_MIN,
            UI_THRESHOLD_MAX,
            UI_THRESHOLD_STEP
        );
    }

    let mut engine = DetectionEngine::new(config)?;
    let reports = engine.subscribe()?;
    if let Some(period) = engine.schedule_period() {
        log::info!("detection_sim running, tick period {}ms", period.as_millis());
    }

    let (tx, shutdown) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .map_err(|e| anyhow!("error setting Ctrl-C handler: {}", e))?;

    let deadline = (args.seconds > 0).then(|| Instant::now() + Duration::from_secs(args.seconds));
    let ui = ui::Ui::from_args(Some(&args.ui), std::io::stderr().is_terminal());
    {
        let mut feed = ui.feed();
        loop {
            if shutdown.try_recv().is_ok() {
                log::info!("shutdown signal received, stopping detection...");
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break;
            }
            match reports.recv_timeout(Duration::from_millis(100)) {
                Ok(report) => feed.show(&report),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(anyhow!("detection engine stopped publishing"));
                }
            }
        }
    }

    engine.set_active(false)?;
    if args.json {
        let snapshot = engine.snapshot()?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        let stats = engine.stats()?;
        log::info!(
            "totals: cars={} bikes={} last avg confidence={}",
            stats.total_cars,
            stats.total_bikes,
            stats.avg_confidence_percent()
        );
    }
    Ok(())
}
