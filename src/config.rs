use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

use crate::clock::{DEFAULT_BASE_INTERVAL_MS, DEFAULT_JITTER_MS};
use crate::detect::{ConfidenceThreshold, DEFAULT_CONFIDENCE_THRESHOLD};

pub const CONFIG_ENV: &str = "DETECTION_SIM_CONFIG";
pub const THRESHOLD_ENV: &str = "DETECTION_SIM_THRESHOLD";
pub const INTERVAL_ENV: &str = "DETECTION_SIM_INTERVAL_MS";
pub const JITTER_ENV: &str = "DETECTION_SIM_JITTER_MS";
pub const SEED_ENV: &str = "DETECTION_SIM_SEED";

#[derive(Debug, Deserialize, Default)]
struct EngineConfigFile {
    confidence_threshold: Option<f32>,
    schedule: Option<ScheduleConfigFile>,
    seed: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct ScheduleConfigFile {
    base_interval_ms: Option<u64>,
    jitter_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub confidence_threshold: ConfidenceThreshold,
    pub schedule: ScheduleSettings,
    /// Seed for every random draw; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

/// Tick period parameters: each schedule runs at `base + uniform[0, jitter)` ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSettings {
    pub base_interval_ms: u64,
    pub jitter_ms: u64,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            base_interval_ms: DEFAULT_BASE_INTERVAL_MS,
            jitter_ms: DEFAULT_JITTER_MS,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: ConfidenceThreshold::default(),
            schedule: ScheduleSettings::default(),
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Defaults, overlaid by the JSON file named in `DETECTION_SIM_CONFIG`,
    /// overlaid by the individual `DETECTION_SIM_*` variables.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var(CONFIG_ENV).ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(read_config_file(Path::new(path))?),
            _ => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: EngineConfigFile) -> Self {
        let schedule = ScheduleSettings {
            base_interval_ms: file
                .schedule
                .as_ref()
                .and_then(|s| s.base_interval_ms)
                .unwrap_or(DEFAULT_BASE_INTERVAL_MS),
            jitter_ms: file
                .schedule
                .as_ref()
                .and_then(|s| s.jitter_ms)
                .unwrap_or(DEFAULT_JITTER_MS),
        };
        Self {
            confidence_threshold: ConfidenceThreshold::new(
                file.confidence_threshold
                    .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
            ),
            schedule,
            seed: file.seed,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(raw) = non_empty_env(THRESHOLD_ENV) {
            let value: f32 = raw
                .parse()
                .map_err(|_| anyhow!("{} must be a number between 0 and 1", THRESHOLD_ENV))?;
            self.confidence_threshold = ConfidenceThreshold::new(value);
        }
        if let Some(raw) = non_empty_env(INTERVAL_ENV) {
            self.schedule.base_interval_ms = raw.parse().map_err(|_| {
                anyhow!("{} must be an integer number of milliseconds", INTERVAL_ENV)
            })?;
        }
        if let Some(raw) = non_empty_env(JITTER_ENV) {
            self.schedule.jitter_ms = raw.parse().map_err(|_| {
                anyhow!("{} must be an integer number of milliseconds", JITTER_ENV)
            })?;
        }
        if let Some(raw) = non_empty_env(SEED_ENV) {
            let seed: u64 = raw
                .parse()
                .map_err(|_| anyhow!("{} must be an unsigned integer", SEED_ENV))?;
            self.seed = Some(seed);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.schedule.base_interval_ms == 0 {
            return Err(anyhow!("schedule base interval must be greater than zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<EngineConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
