//! Traffic scenarios and their generation profiles.
//!
//! The simulator cycles through five fixed traffic-density profiles, each
//! held for [`SCENARIO_DWELL_MS`]. Selection depends on wall-clock time only.

use std::ops::Range;

use serde::Serialize;

/// How long each scenario stays selected.
pub const SCENARIO_DWELL_MS: u64 = 8_000;

/// Number of scenarios in the cycle.
pub const SCENARIO_COUNT: u64 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    LightTraffic,
    MixedTraffic,
    HeavyTraffic,
    BikeHeavy,
    ModerateTraffic,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::LightTraffic,
        Scenario::MixedTraffic,
        Scenario::HeavyTraffic,
        Scenario::BikeHeavy,
        Scenario::ModerateTraffic,
    ];

    /// Scenario in effect at `now_ms`: `floor(now_ms / 8000) mod 5`.
    pub fn at(now_ms: u64) -> Self {
        let idx = (now_ms / SCENARIO_DWELL_MS) % SCENARIO_COUNT;
        Self::ALL[idx as usize]
    }

    /// Numeric id in `0..5`.
    pub fn id(&self) -> u8 {
        match self {
            Scenario::LightTraffic => 0,
            Scenario::MixedTraffic => 1,
            Scenario::HeavyTraffic => 2,
            Scenario::BikeHeavy => 3,
            Scenario::ModerateTraffic => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::LightTraffic => "light",
            Scenario::MixedTraffic => "mixed",
            Scenario::HeavyTraffic => "heavy",
            Scenario::BikeHeavy => "bike-heavy",
            Scenario::ModerateTraffic => "moderate",
        }
    }

    pub fn profile(&self) -> &'static GenerationProfile {
        &PROFILES[self.id() as usize]
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A uniform draw `base + [0, span)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub base: f32,
    pub span: f32,
}

impl Span {
    pub const fn new(base: f32, span: f32) -> Self {
        Self { base, span }
    }

    pub fn range(&self) -> Range<f32> {
        self.base..self.base + self.span
    }
}

/// Generation ranges for one vehicle type within a scenario.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleProfile {
    /// Guaranteed instances per tick.
    pub count_min: u32,
    /// Exclusive upper bound of the random extra count.
    pub count_spread: u32,
    /// Chance of one bonus instance on top of the drawn count.
    pub bonus_chance: f64,
    pub confidence: Span,
    pub x: Span,
    pub y: Span,
    pub width: Span,
    pub height: Span,
}

impl VehicleProfile {
    /// Largest count this profile can produce.
    pub fn max_count(&self) -> u32 {
        let extra = self.count_spread.saturating_sub(1);
        let bonus = u32::from(self.bonus_chance > 0.0);
        self.count_min + extra + bonus
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationProfile {
    pub cars: VehicleProfile,
    pub bikes: VehicleProfile,
}

const fn vehicle(
    count: (u32, u32),
    bonus_chance: f64,
    confidence: (f32, f32),
    x: (f32, f32),
    y: (f32, f32),
    width: (f32, f32),
    height: (f32, f32),
) -> VehicleProfile {
    VehicleProfile {
        count_min: count.0,
        count_spread: count.1,
        bonus_chance,
        confidence: Span::new(confidence.0, confidence.1),
        x: Span::new(x.0, x.1),
        y: Span::new(y.0, y.1),
        width: Span::new(width.0, width.1),
        height: Span::new(height.0, height.1),
    }
}

/// Indexed by [`Scenario::id`].
#[rustfmt::skip]
static PROFILES: [GenerationProfile; 5] = [
    // light: mostly cars, occasional bike
    GenerationProfile {
        cars: vehicle((1, 2), 0.0, (0.82, 0.15), (10.0, 60.0), (30.0, 40.0), (15.0, 10.0), (10.0, 6.0)),
        bikes: vehicle((0, 0), 0.4, (0.78, 0.18), (70.0, 20.0), (45.0, 25.0), (5.0, 4.0), (7.0, 3.0)),
    },
    // mixed
    GenerationProfile {
        cars: vehicle((2, 2), 0.0, (0.80, 0.17), (5.0, 70.0), (25.0, 45.0), (14.0, 12.0), (9.0, 7.0)),
        bikes: vehicle((1, 2), 0.0, (0.75, 0.20), (15.0, 70.0), (40.0, 30.0), (4.0, 5.0), (6.0, 4.0)),
    },
    // heavy
    GenerationProfile {
        cars: vehicle((3, 3), 0.0, (0.77, 0.20), (0.0, 80.0), (20.0, 50.0), (12.0, 14.0), (8.0, 8.0)),
        bikes: vehicle((2, 3), 0.0, (0.73, 0.22), (0.0, 85.0), (35.0, 40.0), (3.0, 6.0), (5.0, 5.0)),
    },
    // bike-heavy
    GenerationProfile {
        cars: vehicle((1, 2), 0.0, (0.85, 0.12), (20.0, 50.0), (30.0, 30.0), (16.0, 8.0), (11.0, 5.0)),
        bikes: vehicle((3, 3), 0.0, (0.79, 0.18), (0.0, 80.0), (40.0, 35.0), (4.0, 4.0), (6.0, 3.0)),
    },
    // moderate
    GenerationProfile {
        cars: vehicle((2, 2), 0.0, (0.83, 0.14), (10.0, 65.0), (25.0, 40.0), (15.0, 9.0), (10.0, 6.0)),
        bikes: vehicle((1, 3), 0.0, (0.76, 0.19), (20.0, 60.0), (45.0, 25.0), (5.0, 3.0), (7.0, 2.0)),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_is_pure() {
        for t in [0u64, 7_999, 8_000, 123_456_789, u64::MAX] {
            assert_eq!(Scenario::at(t), Scenario::at(t));
        }
    }

    #[test]
    fn cycles_through_all_scenarios_every_eight_seconds() {
        let seen: Vec<u8> = (0..10).map(|i| Scenario::at(i * SCENARIO_DWELL_MS).id()).collect();
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 0, 1, 2, 3, 4]);
        assert_eq!(Scenario::at(7_999), Scenario::LightTraffic);
        assert_eq!(Scenario::at(8_000), Scenario::MixedTraffic);
    }

    #[test]
    fn every_profile_guarantees_a_car() {
        for scenario in Scenario::ALL {
            let profile = scenario.profile();
            assert!(profile.cars.count_min >= 1, "{scenario} has no car floor");
            assert!(profile.cars.confidence.range().start >= 0.73);
            assert!(profile.cars.confidence.range().end <= 0.971);
        }
    }

    #[test]
    fn light_traffic_bike_is_bonus_only() {
        let bikes = Scenario::LightTraffic.profile().bikes;
        assert_eq!(bikes.count_min, 0);
        assert_eq!(bikes.count_spread, 0);
        assert_eq!(bikes.max_count(), 1);
        assert!((bikes.bonus_chance - 0.4).abs() < f64::EPSILON);
    }
}
