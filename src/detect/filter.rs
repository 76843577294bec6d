use serde::Serialize;

use crate::detect::result::Detection;

/// Threshold used when none is configured.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Bounds and step of the threshold slider in the front-end.
pub const UI_THRESHOLD_MIN: f32 = 0.1;
pub const UI_THRESHOLD_MAX: f32 = 0.95;
pub const UI_THRESHOLD_STEP: f32 = 0.05;

/// Confidence cutoff, always within `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ConfidenceThreshold(f32);

impl ConfidenceThreshold {
    /// Clamps `value` into `[0, 1]`. NaN maps to the default threshold.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            log::warn!(
                "confidence threshold is NaN, using default {}",
                DEFAULT_CONFIDENCE_THRESHOLD
            );
            return Self::default();
        }
        let clamped = value.clamp(0.0, 1.0);
        if clamped != value {
            log::warn!(
                "confidence threshold {} outside [0, 1], clamped to {}",
                value,
                clamped
            );
        }
        Self(clamped)
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    pub fn admits(&self, detection: &Detection) -> bool {
        detection.confidence >= self.0
    }

    /// Whether the front-end slider can show this value exactly.
    pub fn on_slider(&self) -> bool {
        if !(UI_THRESHOLD_MIN..=UI_THRESHOLD_MAX).contains(&self.0) {
            return false;
        }
        let steps = (self.0 - UI_THRESHOLD_MIN) / UI_THRESHOLD_STEP;
        (steps - steps.round()).abs() < 1e-3
    }

    /// Keeps the detections at or above the threshold, preserving order.
    pub fn apply(&self, detections: Vec<Detection>) -> Vec<Detection> {
        detections.into_iter().filter(|d| self.admits(d)).collect()
    }
}

impl Default for ConfidenceThreshold {
    fn default() -> Self {
        Self(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}
