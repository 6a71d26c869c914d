//! Simulation Handoff
//!
//! Turbine descriptors, the wind-condition form, and the request handed to an
//! external wake model. No aerodynamics live here: a [`WakeSimulator`] is any
//! collaborator that turns a [`SimulationRequest`] into a report.

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from building or handing off a simulation request.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("no turbines placed")]
    EmptyLayout,
    #[error("invalid wind speed {0} m/s")]
    InvalidWindSpeed(f32),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// TURBINES
// ============================================================================

/// Turbine model choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum TurbineModel {
    #[default]
    V80,
    Iea37,
    Dtu10Mw,
    Generic {
        diameter_m: f32,
        hub_height_m: f32,
        rated_power_kw: f32,
    },
}

impl TurbineModel {
    pub const GENERIC_RATED_POWER_KW: f32 = 10_000.0;

    /// A generic turbine with the reference rated power.
    pub fn generic(diameter_m: f32, hub_height_m: f32) -> Self {
        TurbineModel::Generic {
            diameter_m,
            hub_height_m,
            rated_power_kw: Self::GENERIC_RATED_POWER_KW,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TurbineModel::V80 => "V80 (2 MW)",
            TurbineModel::Iea37 => "IEA37 (3.35 MW)",
            TurbineModel::Dtu10Mw => "DTU10MW (10 MW)",
            TurbineModel::Generic { .. } => "Generic",
        }
    }

    /// Next model in selection order. `generic` supplies the dimensions used
    /// when cycling onto the generic entry.
    pub fn cycle(&self, generic: TurbineModel) -> TurbineModel {
        match self {
            TurbineModel::V80 => TurbineModel::Iea37,
            TurbineModel::Iea37 => TurbineModel::Dtu10Mw,
            TurbineModel::Dtu10Mw => generic,
            TurbineModel::Generic { .. } => TurbineModel::V80,
        }
    }

    /// Resolved physical descriptor.
    pub fn spec(&self) -> TurbineSpec {
        match *self {
            TurbineModel::V80 => TurbineSpec::new("V80", 80.0, 70.0, 2_000.0),
            TurbineModel::Iea37 => TurbineSpec::new("IEA37", 130.0, 110.0, 3_350.0),
            TurbineModel::Dtu10Mw => TurbineSpec::new("DTU10MW", 178.3, 119.0, 10_000.0),
            TurbineModel::Generic {
                diameter_m,
                hub_height_m,
                rated_power_kw,
            } => TurbineSpec::new("Generic", diameter_m, hub_height_m, rated_power_kw),
        }
    }
}

/// What the wake model needs to know about a turbine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurbineSpec {
    pub name: String,
    pub diameter_m: f32,
    pub hub_height_m: f32,
    pub rated_power_kw: f32,
}

impl TurbineSpec {
    pub fn new(name: &str, diameter_m: f32, hub_height_m: f32, rated_power_kw: f32) -> Self {
        Self {
            name: name.to_string(),
            diameter_m,
            hub_height_m,
            rated_power_kw,
        }
    }
}

// ============================================================================
// WIND
// ============================================================================

/// Direction the wind blows towards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindDirection {
    #[default]
    North,
    East,
    South,
    West,
}

impl WindDirection {
    /// Wake-model heading in degrees.
    pub fn degrees(&self) -> f32 {
        match self {
            WindDirection::North => 0.0,
            WindDirection::South => 180.0,
            WindDirection::East => 270.0,
            WindDirection::West => 90.0,
        }
    }
}

/// Choices offered by the simulation form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    pub wind_speeds_ms: Vec<f32>,
    pub directions: Vec<WindDirection>,
    pub rotor_diameters_m: Vec<f32>,
    pub hub_heights_m: Vec<f32>,
    pub default_turbine: TurbineModel,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            wind_speeds_ms: vec![5.0, 10.0, 15.0, 20.0],
            directions: vec![
                WindDirection::North,
                WindDirection::East,
                WindDirection::South,
                WindDirection::West,
            ],
            rotor_diameters_m: vec![80.0, 90.0, 100.0, 110.0],
            hub_heights_m: vec![90.0, 100.0, 110.0, 120.0],
            default_turbine: TurbineModel::V80,
        }
    }
}

// ============================================================================
// FORM
// ============================================================================

/// Current turbine and wind selection.
#[derive(Debug, Clone)]
pub struct SimulationForm {
    options: SimulationOptions,
    turbine: TurbineModel,
    speed_index: usize,
    direction_index: usize,
    diameter_index: usize,
    hub_height_index: usize,
}

impl Default for SimulationForm {
    fn default() -> Self {
        Self::new(SimulationOptions::default())
    }
}

impl SimulationForm {
    pub fn new(options: SimulationOptions) -> Self {
        Self {
            turbine: options.default_turbine,
            options,
            speed_index: 0,
            direction_index: 0,
            diameter_index: 0,
            hub_height_index: 0,
        }
    }

    pub fn options(&self) -> &SimulationOptions {
        &self.options
    }

    pub fn turbine(&self) -> TurbineModel {
        self.turbine
    }

    pub fn wind_speed(&self) -> Option<f32> {
        self.options.wind_speeds_ms.get(self.speed_index).copied()
    }

    pub fn direction(&self) -> Option<WindDirection> {
        self.options.directions.get(self.direction_index).copied()
    }

    /// Generic turbine built from the selected diameter and hub height.
    fn generic(&self) -> TurbineModel {
        let diameter = self.options.rotor_diameters_m.get(self.diameter_index).copied();
        let hub = self.options.hub_heights_m.get(self.hub_height_index).copied();
        TurbineModel::generic(diameter.unwrap_or(80.0), hub.unwrap_or(90.0))
    }

    /// Advance the turbine model and return the new one.
    pub fn cycle_turbine(&mut self) -> TurbineModel {
        self.turbine = self.turbine.cycle(self.generic());
        self.turbine
    }

    /// Pick a wind speed by index. Out-of-range indices are ignored.
    pub fn select_speed(&mut self, index: usize) -> bool {
        if index < self.options.wind_speeds_ms.len() {
            self.speed_index = index;
            true
        } else {
            false
        }
    }

    /// Pick a wind direction by index. Out-of-range indices are ignored.
    pub fn select_direction(&mut self, index: usize) -> bool {
        if index < self.options.directions.len() {
            self.direction_index = index;
            true
        } else {
            false
        }
    }

    /// Pick the generic rotor diameter by index.
    pub fn select_diameter(&mut self, index: usize) -> bool {
        if index >= self.options.rotor_diameters_m.len() {
            return false;
        }
        self.diameter_index = index;
        self.refresh_generic();
        true
    }

    /// Pick the generic hub height by index.
    pub fn select_hub_height(&mut self, index: usize) -> bool {
        if index >= self.options.hub_heights_m.len() {
            return false;
        }
        self.hub_height_index = index;
        self.refresh_generic();
        true
    }

    fn refresh_generic(&mut self) {
        if matches!(self.turbine, TurbineModel::Generic { .. }) {
            self.turbine = self.generic();
        }
    }

    /// One-line description for logs and the window title.
    pub fn summary(&self) -> String {
        format!(
            "{} | {} m/s | {:?}",
            self.turbine.label(),
            self.wind_speed().unwrap_or(0.0),
            self.direction().unwrap_or_default()
        )
    }

    /// Build a request for `turbines_m` under the current selection.
    pub fn request(&self, turbines_m: Vec<[f64; 2]>) -> Result<SimulationRequest, SimulationError> {
        SimulationRequest::new(
            turbines_m,
            self.turbine.spec(),
            self.wind_speed().unwrap_or(0.0),
            self.direction().unwrap_or_default(),
        )
    }
}

// ============================================================================
// REQUEST & REPORT
// ============================================================================

/// Everything the wake model is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Turbine positions in meters, in placement order.
    pub turbines_m: Vec<[f64; 2]>,
    pub turbine: TurbineSpec,
    pub wind_speed_ms: f32,
    pub wind_direction_deg: f32,
}

impl SimulationRequest {
    pub fn new(
        turbines_m: Vec<[f64; 2]>,
        turbine: TurbineSpec,
        wind_speed_ms: f32,
        direction: WindDirection,
    ) -> Result<Self, SimulationError> {
        if turbines_m.is_empty() {
            return Err(SimulationError::EmptyLayout);
        }
        if !(wind_speed_ms.is_finite() && wind_speed_ms > 0.0) {
            return Err(SimulationError::InvalidWindSpeed(wind_speed_ms));
        }
        Ok(Self {
            turbines_m,
            turbine,
            wind_speed_ms,
            wind_direction_deg: direction.degrees(),
        })
    }
}

/// Regular grid of wind speeds behind the farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowField {
    pub origin_m: [f64; 2],
    pub spacing_m: f64,
    pub columns: usize,
    pub speeds_ms: Vec<f32>,
}

/// What the wake model returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Annual energy production in GWh.
    pub aep_gwh: Option<f64>,
    pub flow_field: Option<FlowField>,
}

/// External wake model.
pub trait WakeSimulator {
    fn simulate(&mut self, request: &SimulationRequest) -> Result<SimulationReport, SimulationError>;
}

/// Writes each request to a JSON file for an out-of-process wake model.
#[derive(Debug, Clone)]
pub struct RequestFileHandoff {
    path: PathBuf,
}

impl RequestFileHandoff {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WakeSimulator for RequestFileHandoff {
    fn simulate(&mut self, request: &SimulationRequest) -> Result<SimulationReport, SimulationError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(request)?;
        std::fs::write(&self.path, json)?;
        info!(
            "Simulation request for {} turbines written to {}",
            request.turbines_m.len(),
            self.path.display()
        );
        Ok(SimulationReport::default())
    }
}
