//! Layout Module
//!
//! Wind-farm layout domain: scale calibration, turbine placement, unit
//! conversion, and the controller that routes input between them. Also the
//! surrounding plumbing the editor binary needs: configuration, map loading,
//! metric export, and the hand-off to an external wake simulator.

pub mod calibration;
pub mod config;
pub mod controller;
pub mod export;
pub mod map_image;
pub mod placement;
pub mod simulation;
pub mod units;

pub use calibration::{
    CalibrationEngine, CalibrationError, CalibrationMode, CalibrationStep, LengthPrompt,
    parse_length,
};
pub use config::{ConfigError, LayoutConfig, PlacementConfig, UnitsConfig};
pub use controller::{EventOutcome, InputMode, InputModeController};
pub use export::{ExportError, ExportedTurbine, MetricExport};
pub use map_image::{ImageInfo, MapImage, MapImageError};
pub use placement::{Marker, PlacementError, PlacementStore};
pub use simulation::{
    RequestFileHandoff, SimulationError, SimulationForm, SimulationOptions, SimulationReport,
    SimulationRequest, TurbineModel, TurbineSpec, WakeSimulator, WindDirection,
};
pub use units::{FEET_TO_METERS, LengthUnit, to_metric};
