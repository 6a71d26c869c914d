//! Input Bindings Module
//!
//! Maps physical keys to logical layout-editor actions, allowing key remapping
//! through the layout config file.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::KeyCode;

/// Logical actions that can be bound to physical keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutAction {
    /// Pan the view up (default: W, ArrowUp)
    PanUp,
    /// Pan the view down (default: S, ArrowDown)
    PanDown,
    /// Pan the view left (default: A, ArrowLeft)
    PanLeft,
    /// Pan the view right (default: D, ArrowRight)
    PanRight,
    /// Begin two-point scale calibration (default: Space)
    StartCalibration,
    /// Abandon a calibration in progress (default: Escape)
    CancelCalibration,
    /// Lower the turbine capacity by one (default: [)
    DecreaseCapacity,
    /// Raise the turbine capacity by one (default: ])
    IncreaseCapacity,
    /// Export turbine positions in meters (default: M)
    ExportMetric,
    /// Hand the layout to the wake simulator (default: Enter)
    Simulate,
    /// Reload the site map image (default: L)
    ReloadMap,
    /// Cycle the turbine model (default: Tab)
    CycleTurbine,
    /// Pick a wind speed option by index (default: 1-4)
    SelectWindSpeed(u8),
    /// Pick a wind direction option by index (default: F1-F4)
    SelectWindDirection(u8),
    /// Pick the generic rotor diameter option by index (default: 5-8)
    SelectDiameter(u8),
    /// Pick the generic hub height option by index (default: F5-F8)
    SelectHubHeight(u8),
}

/// One key-to-action entry, as stored in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub key: KeyCode,
    pub action: LayoutAction,
}

/// Maps physical keys to logical actions.
///
/// Several keys may trigger the same action (WASD and the arrow keys both
/// pan); each key triggers at most one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Binding>", into = "Vec<Binding>")]
pub struct KeyBindings {
    key_to_action: HashMap<KeyCode, LayoutAction>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyBindings {
    /// Create a new KeyBindings instance with default key mappings.
    pub fn new() -> Self {
        let mut bindings = Self::empty();

        bindings.bind(KeyCode::W, LayoutAction::PanUp);
        bindings.bind(KeyCode::S, LayoutAction::PanDown);
        bindings.bind(KeyCode::A, LayoutAction::PanLeft);
        bindings.bind(KeyCode::D, LayoutAction::PanRight);
        bindings.bind(KeyCode::ArrowUp, LayoutAction::PanUp);
        bindings.bind(KeyCode::ArrowDown, LayoutAction::PanDown);
        bindings.bind(KeyCode::ArrowLeft, LayoutAction::PanLeft);
        bindings.bind(KeyCode::ArrowRight, LayoutAction::PanRight);
        bindings.bind(KeyCode::Space, LayoutAction::StartCalibration);
        bindings.bind(KeyCode::Escape, LayoutAction::CancelCalibration);
        bindings.bind(KeyCode::BracketLeft, LayoutAction::DecreaseCapacity);
        bindings.bind(KeyCode::BracketRight, LayoutAction::IncreaseCapacity);
        bindings.bind(KeyCode::M, LayoutAction::ExportMetric);
        bindings.bind(KeyCode::Enter, LayoutAction::Simulate);
        bindings.bind(KeyCode::L, LayoutAction::ReloadMap);
        bindings.bind(KeyCode::Tab, LayoutAction::CycleTurbine);

        let digits = [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4];
        let functions = [KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4];
        for (i, (digit, function)) in digits.into_iter().zip(functions).enumerate() {
            bindings.bind(digit, LayoutAction::SelectWindSpeed(i as u8));
            bindings.bind(function, LayoutAction::SelectWindDirection(i as u8));
        }

        let digits = [KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8];
        let functions = [KeyCode::F5, KeyCode::F6, KeyCode::F7, KeyCode::F8];
        for (i, (digit, function)) in digits.into_iter().zip(functions).enumerate() {
            bindings.bind(digit, LayoutAction::SelectDiameter(i as u8));
            bindings.bind(function, LayoutAction::SelectHubHeight(i as u8));
        }

        bindings
    }

    /// A table with no bindings at all.
    pub fn empty() -> Self {
        Self {
            key_to_action: HashMap::new(),
        }
    }

    /// Bind a physical key to a logical action, replacing any previous
    /// binding of that key.
    pub fn bind(&mut self, key: KeyCode, action: LayoutAction) {
        self.key_to_action.insert(key, action);
    }

    /// Remove the binding for a specific key.
    pub fn unbind_key(&mut self, key: KeyCode) {
        self.key_to_action.remove(&key);
    }

    /// Get the action bound to a physical key, if any.
    pub fn get_action(&self, key: KeyCode) -> Option<LayoutAction> {
        self.key_to_action.get(&key).copied()
    }

    /// All keys bound to `action`, in no particular order.
    pub fn keys_for(&self, action: LayoutAction) -> Vec<KeyCode> {
        self.key_to_action
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(k, _)| *k)
            .collect()
    }

    /// Get all current bindings as key-action pairs.
    pub fn all_bindings(&self) -> impl Iterator<Item = (KeyCode, LayoutAction)> + '_ {
        self.key_to_action.iter().map(|(&k, &a)| (k, a))
    }
}

impl From<Vec<Binding>> for KeyBindings {
    fn from(entries: Vec<Binding>) -> Self {
        let mut bindings = Self::empty();
        for entry in entries {
            bindings.bind(entry.key, entry.action);
        }
        bindings
    }
}

impl From<KeyBindings> for Vec<Binding> {
    fn from(bindings: KeyBindings) -> Self {
        bindings
            .all_bindings()
            .map(|(key, action)| Binding { key, action })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let bindings = KeyBindings::new();

        assert_eq!(bindings.get_action(KeyCode::W), Some(LayoutAction::PanUp));
        assert_eq!(bindings.get_action(KeyCode::S), Some(LayoutAction::PanDown));
        assert_eq!(bindings.get_action(KeyCode::A), Some(LayoutAction::PanLeft));
        assert_eq!(bindings.get_action(KeyCode::D), Some(LayoutAction::PanRight));
        assert_eq!(bindings.get_action(KeyCode::Space), Some(LayoutAction::StartCalibration));
        assert_eq!(bindings.get_action(KeyCode::Digit3), Some(LayoutAction::SelectWindSpeed(2)));
        assert_eq!(bindings.get_action(KeyCode::F4), Some(LayoutAction::SelectWindDirection(3)));
        assert_eq!(bindings.get_action(KeyCode::Escape), Some(LayoutAction::CancelCalibration));
        assert_eq!(bindings.get_action(KeyCode::Digit5), Some(LayoutAction::SelectDiameter(0)));
        assert_eq!(bindings.get_action(KeyCode::F8), Some(LayoutAction::SelectHubHeight(3)));
    }

    #[test]
    fn test_several_keys_one_action() {
        let bindings = KeyBindings::new();
        let mut keys = bindings.keys_for(LayoutAction::PanUp);
        keys.sort_by_key(|k| format!("{k:?}"));
        assert_eq!(keys, vec![KeyCode::ArrowUp, KeyCode::W]);
    }

    #[test]
    fn test_rebind_key() {
        let mut bindings = KeyBindings::new();
        bindings.bind(KeyCode::W, LayoutAction::ExportMetric);

        assert_eq!(bindings.get_action(KeyCode::W), Some(LayoutAction::ExportMetric));
        assert_eq!(bindings.keys_for(LayoutAction::PanUp), vec![KeyCode::ArrowUp]);
    }

    #[test]
    fn test_unbind_key() {
        let mut bindings = KeyBindings::new();
        bindings.unbind_key(KeyCode::Space);
        assert_eq!(bindings.get_action(KeyCode::Space), None);
        assert!(bindings.keys_for(LayoutAction::StartCalibration).is_empty());
    }

    #[test]
    fn test_json_table() {
        let json = r#"[{"key":"Space","action":"ExportMetric"},{"key":"F1","action":{"SelectWindDirection":2}}]"#;
        let bindings: KeyBindings = serde_json::from_str(json).unwrap();
        assert_eq!(bindings.get_action(KeyCode::Space), Some(LayoutAction::ExportMetric));
        assert_eq!(bindings.get_action(KeyCode::F1), Some(LayoutAction::SelectWindDirection(2)));
        assert_eq!(bindings.get_action(KeyCode::W), None);
    }
}
