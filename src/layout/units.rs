//! Unit Conversion
//!
//! Stateless conversion from the user's declared physical unit to meters.
//! Applied on demand (export, simulation handoff); stored markers are never
//! rewritten.

use serde::{Deserialize, Serialize};

use crate::geometry::CanvasPoint;

/// Meters per international foot.
pub const FEET_TO_METERS: f32 = 0.3048;

/// Physical length unit a calibration length is entered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthUnit {
    #[default]
    Feet,
    Meters,
}

impl LengthUnit {
    /// Meters per one of this unit.
    pub fn meters_per_unit(&self) -> f32 {
        match self {
            LengthUnit::Feet => FEET_TO_METERS,
            LengthUnit::Meters => 1.0,
        }
    }

    /// Lowercase plural name, as shown in prompts ("feet", "meters").
    pub fn label(&self) -> &'static str {
        match self {
            LengthUnit::Feet => "feet",
            LengthUnit::Meters => "meters",
        }
    }

    /// Abbreviation used in log lines.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            LengthUnit::Feet => "ft",
            LengthUnit::Meters => "m",
        }
    }

    /// Convert a length in this unit to meters.
    pub fn to_metric(&self, length: f32) -> f32 {
        length * self.meters_per_unit()
    }

    /// Convert a length in meters back into this unit.
    pub fn from_metric(&self, meters: f32) -> f32 {
        meters / self.meters_per_unit()
    }

    /// Componentwise [`LengthUnit::to_metric`].
    pub fn point_to_metric(&self, point: CanvasPoint) -> CanvasPoint {
        CanvasPoint::new(self.to_metric(point.x), self.to_metric(point.y))
    }
}

/// Feet to meters.
pub fn to_metric(feet: f32) -> f32 {
    LengthUnit::Feet.to_metric(feet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feet_to_meters() {
        assert!((to_metric(1.0) - 0.3048).abs() < 1e-7);
        assert!((to_metric(1000.0) - 304.8).abs() < 1e-3);
        assert_eq!(to_metric(0.0), 0.0);
    }

    #[test]
    fn test_round_trip_recovers_feet() {
        for feet in [-250.0_f32, -1.5, 0.0, 0.3048, 12.0, 5280.0, 1.0e6] {
            let back = LengthUnit::Feet.from_metric(to_metric(feet));
            let tolerance = 1e-5 * feet.abs().max(1.0);
            assert!((back - feet).abs() <= tolerance, "{feet} came back as {back}");
        }
    }

    #[test]
    fn test_meters_are_identity() {
        let p = CanvasPoint::new(12.5, -3.0);
        assert_eq!(LengthUnit::Meters.point_to_metric(p), p);
    }

    #[test]
    fn test_point_to_metric_componentwise() {
        let p = LengthUnit::Feet.point_to_metric(CanvasPoint::new(10.0, -20.0));
        assert!((p.x - 3.048).abs() < 1e-5);
        assert!((p.y + 6.096).abs() < 1e-5);
    }
}
