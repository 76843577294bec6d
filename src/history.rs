//! Bounded detection history.
//!
//! Keeps the most recent [`HISTORY_CAPACITY`] published detections in
//! arrival order. Display-only: nothing ties it to the stats counters.

use std::collections::VecDeque;

use crate::detect::{Detection, VehicleType};

/// Fixed history capacity.
pub const HISTORY_CAPACITY: usize = 100;

/// FIFO buffer of recent detections. The oldest entries are evicted first.
#[derive(Clone, Debug)]
pub struct DetectionHistory {
    buffer: VecDeque<Detection>,
}

impl DetectionHistory {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Appends a batch, then trims from the front down to capacity.
    pub fn append<I>(&mut self, batch: I)
    where
        I: IntoIterator<Item = Detection>,
    {
        self.buffer.extend(batch);
        let overflow = self.buffer.len().saturating_sub(HISTORY_CAPACITY);
        if overflow > 0 {
            self.buffer.drain(..overflow);
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Most recent detection, if any.
    pub fn latest(&self) -> Option<&Detection> {
        self.buffer.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Detection> + '_ {
        self.buffer.iter()
    }

    pub fn count_of(&self, vehicle_type: VehicleType) -> usize {
        self.buffer
            .iter()
            .filter(|d| d.vehicle_type == vehicle_type)
            .count()
    }

    /// Oldest-first copy of the buffer.
    pub fn snapshot(&self) -> Vec<Detection> {
        self.buffer.iter().cloned().collect()
    }
}

impl Default for DetectionHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(start: usize, len: usize) -> Vec<Detection> {
        (start..start + len)
            .map(|i| Detection {
                id: Detection::make_id(VehicleType::Bike, 0, i),
                vehicle_type: VehicleType::Bike,
                confidence: 0.8,
                x: 0.0,
                y: 0.0,
                width: 4.0,
                height: 6.0,
                timestamp: 0,
            })
            .collect()
    }

    #[test]
    fn history_enforces_capacity() {
        let mut history = DetectionHistory::new();
        for round in 0..30 {
            history.append(batch(round * 7, 7));
            assert!(history.len() <= HISTORY_CAPACITY);
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
    }

    #[test]
    fn evicts_oldest_first() {
        let mut history = DetectionHistory::new();
        history.append(batch(0, 95));
        history.append(batch(95, 10));
        assert_eq!(history.len(), 100);
        let snap = history.snapshot();
        assert_eq!(snap.first().map(|d| d.id.as_str()), Some("bike-0-5"));
        assert_eq!(history.latest().map(|d| d.id.as_str()), Some("bike-0-104"));
    }

    #[test]
    fn oversized_batch_keeps_its_tail() {
        let mut history = DetectionHistory::new();
        history.append(batch(0, 3));
        history.append(batch(3, 150));
        let snap = history.snapshot();
        assert_eq!(snap.len(), 100);
        assert_eq!(snap[0].id, "bike-0-53");
        assert_eq!(snap[99].id, "bike-0-152");
    }

    #[test]
    fn clear_and_counts() {
        let mut history = DetectionHistory::new();
        history.append(batch(0, 4));
        assert_eq!(history.count_of(VehicleType::Bike), 4);
        assert_eq!(history.count_of(VehicleType::Car), 0);
        history.clear();
        assert!(history.is_empty());
        assert!(history.latest().is_none());
    }
}
