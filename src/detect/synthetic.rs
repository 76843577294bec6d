use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::detect::backend::DetectionSource;
use crate::detect::result::{Detection, VehicleType};
use crate::detect::scenario::{Scenario, Span, VehicleProfile};

/// Synthetic detector driven by the scenario profile table.
///
/// Every field is an independent uniform draw. With a seed the output is
/// reproducible for a given sequence of `(scenario, now_ms)` calls.
pub struct SyntheticDetector {
    rng: StdRng,
}

impl SyntheticDetector {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Generate the raw batch for `scenario` at `now_ms`.
    pub fn generate(&mut self, scenario: Scenario, now_ms: u64) -> Vec<Detection> {
        let profile = scenario.profile();
        let mut batch = Vec::with_capacity(
            (profile.cars.max_count() + profile.bikes.max_count()) as usize,
        );
        self.push_vehicles(&mut batch, VehicleType::Car, &profile.cars, now_ms);
        self.push_vehicles(&mut batch, VehicleType::Bike, &profile.bikes, now_ms);
        batch
    }

    fn push_vehicles(
        &mut self,
        batch: &mut Vec<Detection>,
        vehicle_type: VehicleType,
        profile: &VehicleProfile,
        now_ms: u64,
    ) {
        let mut count = profile.count_min;
        if profile.count_spread > 0 {
            count += self.rng.gen_range(0..profile.count_spread);
        }
        if profile.bonus_chance > 0.0 && self.rng.gen_bool(profile.bonus_chance.min(1.0)) {
            count += 1;
        }

        for index in 0..count as usize {
            batch.push(Detection {
                id: Detection::make_id(vehicle_type, now_ms, index),
                vehicle_type,
                confidence: self.sample(profile.confidence),
                x: self.sample(profile.x),
                y: self.sample(profile.y),
                width: self.sample(profile.width),
                height: self.sample(profile.height),
                timestamp: now_ms,
            });
        }
    }

    fn sample(&mut self, span: Span) -> f32 {
        if span.span <= 0.0 {
            return span.base;
        }
        self.rng.gen_range(span.range())
    }
}

impl Default for SyntheticDetector {
    fn default() -> Self {
        Self::new(None)
    }
}

impl DetectionSource for SyntheticDetector {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn detect(&mut self, scenario: Scenario, now_ms: u64) -> Vec<Detection> {
        self.generate(scenario, now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn within(value: f32, span: Span) -> bool {
        value >= span.base && value < span.base + span.span
    }

    #[test]
    fn light_traffic_at_epoch_zero() {
        let mut detector = SyntheticDetector::new(Some(7));
        let mut bike_batches = 0;
        let runs = 2_000;
        for _ in 0..runs {
            let batch = detector.generate(Scenario::at(0), 0);
            let cars: Vec<_> = batch.iter().filter(|d| d.is_car()).collect();
            let bikes: Vec<_> = batch.iter().filter(|d| d.is_bike()).collect();
            assert!((1..=2).contains(&cars.len()), "cars={}", cars.len());
            assert!(bikes.len() <= 1);
            for car in &cars {
                assert!(within(car.confidence, Span::new(0.82, 0.15)));
            }
            for bike in &bikes {
                assert!(within(bike.confidence, Span::new(0.78, 0.18)));
                assert_eq!(bike.id, "bike-0-0");
            }
            bike_batches += bikes.len();
        }
        let ratio = bike_batches as f64 / runs as f64;
        assert!((0.33..0.47).contains(&ratio), "bonus bike ratio {ratio}");
    }

    #[test]
    fn respects_profile_ranges_for_every_scenario() {
        let mut detector = SyntheticDetector::new(Some(11));
        for scenario in Scenario::ALL {
            let profile = scenario.profile();
            for _ in 0..200 {
                let batch = detector.generate(scenario, 42);
                let cars = batch.iter().filter(|d| d.is_car()).count() as u32;
                let bikes = batch.iter().filter(|d| d.is_bike()).count() as u32;
                assert!(cars >= profile.cars.count_min && cars <= profile.cars.max_count());
                assert!(bikes >= profile.bikes.count_min && bikes <= profile.bikes.max_count());

                for det in &batch {
                    let p = match det.vehicle_type {
                        VehicleType::Car => &profile.cars,
                        VehicleType::Bike => &profile.bikes,
                    };
                    assert!(within(det.confidence, p.confidence), "{scenario}: {det:?}");
                    assert!(within(det.x, p.x));
                    assert!(within(det.y, p.y));
                    assert!(within(det.width, p.width));
                    assert!(within(det.height, p.height));
                    assert_eq!(det.timestamp, 42);
                }
            }
        }
    }

    #[test]
    fn cars_precede_bikes_and_ids_are_unique() {
        let mut detector = SyntheticDetector::new(Some(3));
        for _ in 0..100 {
            let batch = detector.generate(Scenario::HeavyTraffic, 16_000);
            let first_bike = batch.iter().position(|d| d.is_bike()).unwrap_or(batch.len());
            assert!(batch[first_bike..].iter().all(|d| d.is_bike()));
            let ids: HashSet<_> = batch.iter().map(|d| d.id.as_str()).collect();
            assert_eq!(ids.len(), batch.len());
        }
    }

    #[test]
    fn seeded_detectors_are_reproducible() {
        let mut a = SyntheticDetector::new(Some(99));
        let mut b = SyntheticDetector::new(Some(99));
        for t in [0u64, 8_000, 16_000, 24_000, 32_000] {
            assert_eq!(a.generate(Scenario::at(t), t), b.generate(Scenario::at(t), t));
        }
    }
}
