use proptest::prelude::*;

use vehicle_detect_sim::{
    ConfidenceThreshold, Detection, DetectionEngine, DetectionHistory, EngineConfig, Scenario,
    Stats, SyntheticDetector, VehicleType, HISTORY_CAPACITY,
};

fn manual_engine(threshold: f32, seed: u64) -> DetectionEngine {
    DetectionEngine::manual(EngineConfig {
        confidence_threshold: ConfidenceThreshold::new(threshold),
        seed: Some(seed),
        ..EngineConfig::default()
    })
}

fn tagged(round: usize, len: usize) -> Vec<Detection> {
    (0..len)
        .map(|i| Detection {
            id: format!("car-{round}-{i}"),
            vehicle_type: VehicleType::Car,
            confidence: 0.9,
            x: 0.0,
            y: 0.0,
            width: 15.0,
            height: 10.0,
            timestamp: round as u64,
        })
        .collect()
}

proptest! {
    #[test]
    fn published_batches_respect_threshold(
        threshold in 0.0f32..=1.0,
        seed in any::<u64>(),
        times in prop::collection::vec(0u64..10_000_000, 1..20),
    ) {
        let engine = manual_engine(threshold, seed);
        for now in times {
            engine.tick_at(now).unwrap();
            let snap = engine.snapshot().unwrap();
            prop_assert!(snap.detections.iter().all(|d| d.confidence >= threshold));
            prop_assert_eq!(snap.stats.current_detections, snap.detections.len());
        }
    }

    #[test]
    fn totals_equal_sum_of_tick_counts(
        threshold in 0.0f32..=1.0,
        seed in any::<u64>(),
        times in prop::collection::vec(0u64..10_000_000, 1..30),
    ) {
        let engine = manual_engine(threshold, seed);
        let rx = engine.subscribe().unwrap();
        let (mut cars, mut bikes) = (0u64, 0u64);
        let mut prev = Stats::default();
        for now in times {
            engine.tick_at(now).unwrap();
            let report = rx.try_recv().unwrap();
            cars += report.detections.iter().filter(|d| d.is_car()).count() as u64;
            bikes += report.detections.iter().filter(|d| d.is_bike()).count() as u64;
            prop_assert!(report.stats.total_cars >= prev.total_cars);
            prop_assert!(report.stats.total_bikes >= prev.total_bikes);
            prop_assert_eq!(report.stats.total_cars, cars);
            prop_assert_eq!(report.stats.total_bikes, bikes);
            prev = report.stats;
        }
    }

    #[test]
    fn history_keeps_newest_entries(sizes in prop::collection::vec(0usize..60, 0..12)) {
        let mut history = DetectionHistory::new();
        let mut model: Vec<Detection> = Vec::new();
        for (round, size) in sizes.into_iter().enumerate() {
            let before = history.len();
            let batch = tagged(round, size);
            model.extend(batch.iter().cloned());
            history.append(batch);
            prop_assert_eq!(history.len(), (before + size).min(HISTORY_CAPACITY));
            let start = model.len().saturating_sub(HISTORY_CAPACITY);
            prop_assert_eq!(history.snapshot(), model[start..].to_vec());
        }
    }

    #[test]
    fn reset_is_idempotent(seed in any::<u64>(), ticks in 0usize..10) {
        let mut engine = manual_engine(0.5, seed);
        for t in 0..ticks {
            engine.tick_at(t as u64 * 1_000).unwrap();
        }
        engine.reset().unwrap();
        let once = engine.snapshot().unwrap();
        engine.reset().unwrap();
        let twice = engine.snapshot().unwrap();
        prop_assert_eq!(&once.stats, &Stats::default());
        prop_assert_eq!(once.stats, twice.stats);
        prop_assert!(once.history.is_empty() && twice.history.is_empty());
        prop_assert!(once.detections.is_empty() && twice.detections.is_empty());
    }

    #[test]
    fn scenario_advances_every_dwell(t in 0u64..u64::MAX / 2) {
        prop_assert_eq!(Scenario::at(t), Scenario::at(t));
        let next = Scenario::at(t + 8_000).id();
        prop_assert_eq!(next, (Scenario::at(t).id() + 1) % 5);
    }

    #[test]
    fn light_traffic_generation_bounds(seed in any::<u64>()) {
        let mut detector = SyntheticDetector::new(Some(seed));
        let batch = detector.generate(Scenario::at(0), 0);
        let cars = batch.iter().filter(|d| d.is_car()).count();
        let bikes = batch.iter().filter(|d| d.is_bike()).count();
        prop_assert!((1..=2).contains(&cars));
        prop_assert!(bikes <= 1);
        let car_span = Scenario::LightTraffic.profile().cars.confidence.range();
        let bike_span = Scenario::LightTraffic.profile().bikes.confidence.range();
        for det in &batch {
            let span = if det.is_car() { &car_span } else { &bike_span };
            prop_assert!(span.contains(&det.confidence));
        }
    }
}
