//! Layout Editor Configuration
//!
//! Every tunable of the layout editor in one serde-friendly struct. Any field
//! missing from a config file falls back to its default, so a file only needs
//! the values it changes.

use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::KeyBindings;
use crate::view::ViewSettings;

use super::simulation::SimulationOptions;
use super::units::LengthUnit;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Turbine capacity bounds (the capacity slider's range).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub default_capacity: usize,
    pub min_capacity: usize,
    pub max_capacity: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            default_capacity: 10,
            min_capacity: 1,
            max_capacity: 100,
        }
    }
}

impl PlacementConfig {
    /// Clamp a requested capacity into `[min_capacity, max_capacity]`.
    pub fn clamp(&self, capacity: usize) -> usize {
        let min = self.min_capacity.max(1);
        capacity.clamp(min, self.max_capacity.max(min))
    }
}

/// Physical unit calibration lengths are typed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitsConfig {
    pub physical_unit: LengthUnit,
}

/// Top-level layout editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub view: ViewSettings,
    pub placement: PlacementConfig,
    pub units: UnitsConfig,
    pub simulation: SimulationOptions,
    pub input: KeyBindings,
}

impl LayoutConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        info!("Config: loaded {}", path.display());
        Ok(config)
    }

    /// Read a JSON config file, falling back to defaults when it is missing
    /// or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Config: using defaults, could not read {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
