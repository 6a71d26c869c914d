//! Turbine Placement Store
//!
//! Ordered, capacity-bounded list of placed turbine markers with
//! last-in-first-out undo. Each marker records its canvas position and the
//! physical position derived from the calibration ratio current at placement.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::CanvasPoint;

/// Why a placement was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("turbine capacity of {capacity} reached")]
    CapacityReached { capacity: usize },
}

/// A placed turbine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Where the marker sits on the canvas.
    pub display_position: CanvasPoint,
    /// `display_position` scaled by the calibration ratio at placement time,
    /// in the declared physical unit.
    pub real_position: CanvasPoint,
}

impl Marker {
    pub fn new(display_position: CanvasPoint, ratio: f32) -> Self {
        Self {
            display_position,
            real_position: display_position.scaled(ratio),
        }
    }
}

/// Capacity-bounded marker list.
#[derive(Debug, Clone)]
pub struct PlacementStore {
    markers: Vec<Marker>,
    capacity: usize,
}

impl Default for PlacementStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl PlacementStore {
    pub const DEFAULT_CAPACITY: usize = 10;

    /// Create an empty store. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            markers: Vec::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Append a marker at `point`, scaled by `ratio`.
    ///
    /// Refused without touching the list when the store is full.
    pub fn place(&mut self, point: CanvasPoint, ratio: f32) -> Result<Marker, PlacementError> {
        if self.is_full() {
            return Err(PlacementError::CapacityReached {
                capacity: self.capacity,
            });
        }
        let marker = Marker::new(point, ratio);
        self.markers.push(marker);
        Ok(marker)
    }

    /// Remove and return the most recently placed marker.
    pub fn undo_last(&mut self) -> Option<Marker> {
        self.markers.pop()
    }

    /// Change the capacity. Markers beyond a lowered capacity are kept; new
    /// placements stay blocked until the count drops below it.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.markers.len() >= self.capacity
    }
}
