mod backend;
mod filter;
mod result;
mod scenario;
mod synthetic;

pub use backend::DetectionSource;
pub use filter::{
    ConfidenceThreshold, DEFAULT_CONFIDENCE_THRESHOLD, UI_THRESHOLD_MAX, UI_THRESHOLD_MIN,
    UI_THRESHOLD_STEP,
};
pub use result::{Detection, VehicleType};
pub use scenario::{
    GenerationProfile, Scenario, Span, VehicleProfile, SCENARIO_COUNT, SCENARIO_DWELL_MS,
};
pub use synthetic::SyntheticDetector;
