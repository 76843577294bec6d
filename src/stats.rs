//! Aggregate statistics over published detection batches.
//!
//! `total_cars`/`total_bikes` accumulate across ticks until a reset.
//! `avg_confidence` and `current_detections` describe the latest batch only;
//! there is deliberately no running mean.

use std::ops::Range;

use rand::Rng;
use serde::Serialize;

use crate::detect::Detection;

/// Range of the synthetic per-tick processing time, in milliseconds.
pub const PROCESSING_TIME_MS: Range<f32> = 12.0..40.0;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_cars: u64,
    pub total_bikes: u64,
    pub avg_confidence: f32,
    #[serde(rename = "processingTime")]
    pub processing_time_ms: f32,
    pub current_detections: usize,
}

impl Stats {
    /// Folds one filtered batch into a new snapshot.
    pub fn fold(&self, batch: &[Detection], processing_time_ms: f32) -> Stats {
        let cars = batch.iter().filter(|d| d.is_car()).count() as u64;
        let bikes = batch.iter().filter(|d| d.is_bike()).count() as u64;
        Stats {
            total_cars: self.total_cars + cars,
            total_bikes: self.total_bikes + bikes,
            avg_confidence: mean_confidence(batch),
            processing_time_ms,
            current_detections: batch.len(),
        }
    }

    pub fn total_vehicles(&self) -> u64 {
        self.total_cars + self.total_bikes
    }

    /// Average confidence as shown in the stats panel, e.g. `87.3%`.
    pub fn avg_confidence_percent(&self) -> String {
        format!("{:.1}%", self.avg_confidence * 100.0)
    }

    /// Processing time as shown in the stats panel, e.g. `23.4ms`.
    pub fn processing_time_label(&self) -> String {
        format!("{:.1}ms", self.processing_time_ms)
    }
}

/// Mean confidence of `batch`, `0.0` when empty.
pub fn mean_confidence(batch: &[Detection]) -> f32 {
    if batch.is_empty() {
        return 0.0;
    }
    let sum: f32 = batch.iter().map(|d| d.confidence).sum();
    sum / batch.len() as f32
}

/// Draws a synthetic processing time. Not a measurement.
pub fn sample_processing_time<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(PROCESSING_TIME_MS)
}
