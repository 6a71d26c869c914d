//! Metric Export
//!
//! Snapshot of the placed turbines with their positions in canvas units, in
//! the declared physical unit, and in meters. Building an export reads the
//! placement store and never changes it.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::CanvasPoint;

use super::placement::Marker;
use super::units::LengthUnit;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One exported turbine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportedTurbine {
    pub canvas: CanvasPoint,
    /// Position in the declared physical unit, as captured at placement.
    pub physical: CanvasPoint,
    pub metric: CanvasPoint,
}

/// All turbines, in placement order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricExport {
    pub unit: LengthUnit,
    /// Calibration ratio current when the export was built.
    pub ratio: f32,
    pub turbines: Vec<ExportedTurbine>,
}

impl MetricExport {
    pub fn new(markers: &[Marker], unit: LengthUnit, ratio: f32) -> Self {
        let turbines = markers
            .iter()
            .map(|m| ExportedTurbine {
                canvas: m.display_position,
                physical: m.real_position,
                metric: unit.point_to_metric(m.real_position),
            })
            .collect();
        Self {
            unit,
            ratio,
            turbines,
        }
    }

    /// Metric `(x, y)` pairs in placement order, as handed to the wake model.
    pub fn metric_coordinates(&self) -> Vec<[f64; 2]> {
        self.turbines
            .iter()
            .map(|t| [t.metric.x as f64, t.metric.y as f64])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.turbines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turbines.is_empty()
    }

    /// Write pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ExportError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(
            "Export: wrote {} turbine locations in meters to {}",
            self.turbines.len(),
            path.display()
        );
        Ok(())
    }
}
