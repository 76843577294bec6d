use crate::detect::result::Detection;
use crate::detect::scenario::Scenario;

/// Source of raw (unfiltered) detection batches.
///
/// The engine calls `detect` once per tick with the scenario selected for the
/// tick time. Implementations own whatever randomness they need; the engine
/// applies the confidence threshold afterwards.
pub trait DetectionSource: Send {
    /// Source identifier.
    fn name(&self) -> &'static str;

    /// Produce the raw batch for one tick.
    ///
    /// Cars must come before bikes and ids must be unique within the batch.
    fn detect(&mut self, scenario: Scenario, now_ms: u64) -> Vec<Detection>;
}
