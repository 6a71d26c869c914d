//! Scale Calibration
//!
//! Two-point protocol that derives the physical length of one canvas unit.
//! The user activates calibration, clicks both ends of a feature of known
//! length (typically the map's scale bar), and types that length in. The
//! ratio is only replaced when the selection and the length are both usable.
//!
//! ```text
//! Idle --activate--> AwaitingFirstPoint --click--> AwaitingSecondPoint
//!   ^                                                   |
//!   +------------------- finish (any outcome) ---------+
//! ```

use log::{info, warn};
use thiserror::Error;

use crate::geometry::CanvasPoint;

use super::units::LengthUnit;

// ============================================================================
// TYPES
// ============================================================================

/// Why a calibration attempt left the ratio unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CalibrationError {
    #[error("no length entered")]
    Cancelled,
    #[error("invalid scale bar length {0}")]
    InvalidLength(f32),
    #[error("calibration points coincide")]
    DegenerateSelection,
}

/// Calibration phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CalibrationMode {
    #[default]
    Idle,
    AwaitingFirstPoint,
    AwaitingSecondPoint,
}

/// Result of feeding a point into an active calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationStep {
    /// The first endpoint was recorded.
    FirstPoint(CanvasPoint),
    /// Both endpoints are known; a length is needed to finish.
    AwaitingLength {
        first: CanvasPoint,
        second: CanvasPoint,
        /// Canvas distance between the endpoints.
        distance: f32,
    },
}

/// Source of the physical length for a finished selection.
///
/// Implementations may block; this is the one place the layout editor waits
/// on the user mid-event.
pub trait LengthPrompt {
    /// Ask for a length. `None` means the user cancelled or typed nothing usable.
    fn request_length(&mut self, title: &str, message: &str) -> Option<f32>;
}

impl<F> LengthPrompt for F
where
    F: FnMut(&str, &str) -> Option<f32>,
{
    fn request_length(&mut self, title: &str, message: &str) -> Option<f32> {
        self(title, message)
    }
}

/// Parse a typed length. Surrounding whitespace is ignored; empty or
/// non-numeric input yields `None`. Sign is not checked here.
pub fn parse_length(input: &str) -> Option<f32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f32>().ok()
}

// ============================================================================
// CALIBRATION ENGINE
// ============================================================================

/// Calibration state machine plus the current ratio.
#[derive(Debug, Clone)]
pub struct CalibrationEngine {
    mode: CalibrationMode,
    points: Vec<CanvasPoint>,
    /// Physical units per canvas unit.
    ratio: f32,
    unit: LengthUnit,
}

impl Default for CalibrationEngine {
    fn default() -> Self {
        Self::new(LengthUnit::default())
    }
}

impl CalibrationEngine {
    pub const DEFAULT_RATIO: f32 = 1.0;
    pub const PROMPT_TITLE: &'static str = "Scale Bar Length";

    pub fn new(unit: LengthUnit) -> Self {
        Self {
            mode: CalibrationMode::Idle,
            points: Vec::with_capacity(2),
            ratio: Self::DEFAULT_RATIO,
            unit,
        }
    }

    pub fn mode(&self) -> CalibrationMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode != CalibrationMode::Idle
    }

    /// Physical units per canvas unit.
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    /// Endpoints picked so far in the current attempt.
    pub fn points(&self) -> &[CanvasPoint] {
        &self.points
    }

    /// Prompt body for the length entry.
    pub fn prompt_message(&self) -> String {
        format!(
            "Enter the real-world length of the scale bar (in {}):",
            self.unit.label()
        )
    }

    /// Start a new attempt. Any half-finished selection is discarded.
    pub fn activate(&mut self) {
        self.points.clear();
        self.mode = CalibrationMode::AwaitingFirstPoint;
    }

    /// Abandon the current attempt, keeping the ratio.
    pub fn cancel(&mut self) {
        self.points.clear();
        self.mode = CalibrationMode::Idle;
    }

    /// Record an endpoint. Returns `None` when calibration is not active or
    /// both endpoints are already set.
    pub fn add_point(&mut self, point: CanvasPoint) -> Option<CalibrationStep> {
        match self.mode {
            CalibrationMode::Idle => None,
            CalibrationMode::AwaitingFirstPoint => {
                self.points.push(point);
                self.mode = CalibrationMode::AwaitingSecondPoint;
                Some(CalibrationStep::FirstPoint(point))
            }
            CalibrationMode::AwaitingSecondPoint => {
                if self.points.len() >= 2 {
                    return None;
                }
                let first = self.points[0];
                self.points.push(point);
                Some(CalibrationStep::AwaitingLength {
                    first,
                    second: point,
                    distance: first.distance(&point),
                })
            }
        }
    }

    /// Complete the attempt with the user's length.
    ///
    /// On success the ratio becomes `length / distance` and is returned. On
    /// any failure the previous ratio is kept. Either way the engine returns
    /// to [`CalibrationMode::Idle`].
    pub fn finish(&mut self, length: Option<f32>) -> Result<f32, CalibrationError> {
        let result = self.evaluate(length);
        self.points.clear();
        self.mode = CalibrationMode::Idle;

        match result {
            Ok((distance, length, ratio)) => {
                self.ratio = ratio;
                info!(
                    "Scale detected: {distance:.2} pixels = {length} {}",
                    self.unit.abbreviation()
                );
                Ok(self.ratio)
            }
            Err(e) => {
                warn!("Calibration rejected ({e}); keeping ratio {}", self.ratio);
                Err(e)
            }
        }
    }

    /// Returns `(distance, length, ratio)` for a usable attempt.
    fn evaluate(&self, length: Option<f32>) -> Result<(f32, f32, f32), CalibrationError> {
        let &[first, second] = self.points.as_slice() else {
            return Err(CalibrationError::DegenerateSelection);
        };
        let distance = first.distance(&second);
        if !(distance.is_finite() && distance > 0.0) {
            return Err(CalibrationError::DegenerateSelection);
        }
        let length = length.ok_or(CalibrationError::Cancelled)?;
        if !(length.is_finite() && length > 0.0) {
            return Err(CalibrationError::InvalidLength(length));
        }
        // A valid length can still underflow to zero or overflow to infinity.
        let ratio = length / distance;
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(CalibrationError::InvalidLength(length));
        }
        Ok((distance, length, ratio))
    }
}
