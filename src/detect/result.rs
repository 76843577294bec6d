use serde::{Deserialize, Serialize};

/// Vehicle classes the simulator emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Car,
    Bike,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Car => "car",
            VehicleType::Bike => "bike",
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One synthetic vehicle sighting.
///
/// Geometry is expressed in percent of the frame and is not clamped to the
/// frame edges. Detections are never mutated after generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub id: String,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    /// Confidence in `[0, 1)`.
    pub confidence: f32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Generation time, milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl Detection {
    /// Builds the batch-unique id `<type>-<timestamp>-<index>`.
    pub fn make_id(vehicle_type: VehicleType, timestamp: u64, index: usize) -> String {
        format!("{}-{}-{}", vehicle_type.as_str(), timestamp, index)
    }

    pub fn is_car(&self) -> bool {
        self.vehicle_type == VehicleType::Car
    }

    pub fn is_bike(&self) -> bool {
        self.vehicle_type == VehicleType::Bike
    }

    /// Overlay label, e.g. `CAR 87.3%`.
    pub fn label(&self) -> String {
        format!(
            "{} {:.1}%",
            self.vehicle_type.as_str().to_uppercase(),
            self.confidence * 100.0
        )
    }

    /// Sidebar position text, e.g. `Position: 42%, 57%`.
    pub fn position_label(&self) -> String {
        format!("Position: {:.0}%, {:.0}%", self.x, self.y)
    }
}
