// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! User-facing scanning preferences.

use core::time::Duration;

use hashbrown::HashSet;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use understory_pointer_scan::{CursorConfig, RadarConfig};
use understory_scan_tree::TreeConfig;
use understory_switch_input::{SwitchBinding, SwitchTimings};

use crate::error::SettingsError;

/// What advances the scan.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// A timer advances the highlight; one switch selects.
    #[default]
    Auto,
    /// The user advances the highlight with a switch.
    Manual,
}

/// Which scanning strategy is active.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMethod {
    /// Scan on-screen targets row by row.
    #[default]
    Item,
    /// Axis-sweep point selection.
    Cursor,
    /// Angular point selection.
    Radar,
}

impl ScanMethod {
    /// The method after this one in the toggle cycle.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Item => Self::Cursor,
            Self::Cursor => Self::Radar,
            Self::Radar => Self::Item,
        }
    }
}

/// Scanning preferences, read-only to the engine.
///
/// Every field has a default, so a settings document only needs to name what
/// it changes:
///
/// ```rust
/// use understory_scan::{ScanMode, ScanSettings};
///
/// let settings = ScanSettings::from_json(r#"{ "scan_mode": "manual", "cycle_limit": 5 }"#).unwrap();
/// assert_eq!(settings.scan_mode, ScanMode::Manual);
/// assert_eq!(settings.cycle_limit, 5);
/// assert_eq!(settings.scan_rate_ms, 1000);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Auto or manual advance.
    pub scan_mode: ScanMode,
    /// Active strategy when scanning starts.
    pub scan_method: ScanMethod,
    /// Auto-scan interval.
    pub scan_rate_ms: u64,
    /// Extra dwell on the first element of a scope, in auto mode.
    pub first_item_delay_ms: u64,
    /// Row/column scanning; when false targets are scanned one by one.
    pub row_column: bool,
    /// Partition items by group key.
    pub grouping: bool,
    /// Vertical centre distance for two targets to share a row.
    pub row_threshold: f64,
    /// Horizontal gap for two targets to share an item.
    pub item_threshold: f64,
    /// Full traversals without a selection before auto scanning stops. Zero
    /// scans forever.
    pub cycle_limit: u32,
    /// Stop scanning after every activation.
    pub stop_scanning_on_select: bool,
    /// Hold time before a switch's hold actions start.
    pub switch_hold_time_ms: u64,
    /// Window in which a second press of the same switch is treated as bounce.
    pub ignore_repeat_delay_ms: u64,
    /// Repeat interval of a held movement switch. Zero disables repeat.
    pub move_repeat_delay_ms: u64,
    /// Confirmation delay before a cursor or radar point is tapped. Zero taps
    /// immediately.
    pub auto_select_delay_ms: u64,
    /// Switch bindings.
    pub bindings: Vec<SwitchBinding>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        let tree = TreeConfig::default();
        let timings = SwitchTimings::default();
        Self {
            scan_mode: ScanMode::Auto,
            scan_method: ScanMethod::Item,
            scan_rate_ms: 1000,
            first_item_delay_ms: 0,
            row_column: tree.row_column,
            grouping: tree.grouping,
            row_threshold: tree.row_threshold,
            item_threshold: tree.item_threshold,
            cycle_limit: tree.cycle_limit,
            stop_scanning_on_select: false,
            switch_hold_time_ms: timings.hold_time_ms,
            ignore_repeat_delay_ms: timings.ignore_repeat_delay_ms,
            move_repeat_delay_ms: timings.move_repeat_delay_ms,
            auto_select_delay_ms: 0,
            bindings: Vec::new(),
        }
    }
}

impl ScanSettings {
    /// Parse and validate a JSON settings document.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the settings for values the engine cannot work with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.scan_rate_ms == 0 {
            return Err(SettingsError::ZeroScanRate);
        }
        for (name, value) in [
            ("row_threshold", self.row_threshold),
            ("item_threshold", self.item_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::InvalidThreshold { name, value });
            }
        }
        let mut seen = HashSet::new();
        for binding in &self.bindings {
            if !seen.insert(binding.code) {
                return Err(SettingsError::DuplicateBinding(binding.code));
            }
            if !binding.hold.is_empty() && self.switch_hold_time_ms == 0 {
                return Err(SettingsError::ZeroHoldTime);
            }
        }
        Ok(())
    }

    /// Auto-scan interval.
    pub fn scan_rate(&self) -> Duration {
        Duration::from_millis(self.scan_rate_ms)
    }

    /// Extra dwell on the first element of a scope.
    pub fn first_item_delay(&self) -> Duration {
        Duration::from_millis(self.first_item_delay_ms)
    }

    /// Confirmation delay for cursor and radar points.
    pub fn auto_select_delay(&self) -> Duration {
        Duration::from_millis(self.auto_select_delay_ms)
    }

    /// Whether a timer drives the scan.
    pub fn is_auto(&self) -> bool {
        self.scan_mode == ScanMode::Auto
    }

    /// Configuration for the item scanning tree.
    pub fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            row_column: self.row_column,
            grouping: self.grouping,
            row_threshold: self.row_threshold,
            item_threshold: self.item_threshold,
            cycle_limit: self.cycle_limit,
        }
    }

    /// Switch timing thresholds.
    pub fn switch_timings(&self) -> SwitchTimings {
        SwitchTimings {
            hold_time_ms: self.switch_hold_time_ms,
            ignore_repeat_delay_ms: self.ignore_repeat_delay_ms,
            move_repeat_delay_ms: self.move_repeat_delay_ms,
        }
    }

    /// Configuration for the cursor engine over `screen`.
    pub fn cursor_config(&self, screen: Rect) -> CursorConfig {
        CursorConfig {
            screen,
            confirm_delay: self.auto_select_delay(),
        }
    }

    /// Configuration for the radar engine over `screen`.
    pub fn radar_config(&self, screen: Rect) -> RadarConfig {
        RadarConfig {
            screen,
            confirm_delay: self.auto_select_delay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use understory_switch_input::SwitchAction;

    #[test]
    fn defaults_validate() {
        ScanSettings::default().validate().unwrap();
    }

    #[test]
    fn json_round_trip_keeps_bindings() {
        let mut settings = ScanSettings::default();
        settings
            .bindings
            .push(SwitchBinding::new(66, SwitchAction::Select).with_hold(SwitchAction::OpenMenu));
        let json = settings.to_json().unwrap();
        assert_eq!(ScanSettings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = ScanSettings::from_json("{ \"scan_rate_ms\": \"fast\" }").unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }

    #[test]
    fn zero_scan_rate_is_rejected() {
        let err = ScanSettings::from_json(r#"{ "scan_rate_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::ZeroScanRate));
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn bad_thresholds_are_rejected(#[case] value: f64) {
        let settings = ScanSettings {
            row_threshold: value,
            ..ScanSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidThreshold { name: "row_threshold", .. })
        ));
    }

    #[test]
    fn duplicate_bindings_are_rejected() {
        let settings = ScanSettings {
            bindings: vec![
                SwitchBinding::new(1, SwitchAction::Select),
                SwitchBinding::new(1, SwitchAction::Next),
            ],
            ..ScanSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::DuplicateBinding(_))
        ));
    }

    #[test]
    fn hold_actions_need_hold_time() {
        let settings = ScanSettings {
            switch_hold_time_ms: 0,
            bindings: vec![SwitchBinding::new(1, SwitchAction::Select).with_hold(SwitchAction::OpenMenu)],
            ..ScanSettings::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::ZeroHoldTime)));
    }

    #[test]
    fn derived_configs_follow_settings() {
        let settings = ScanSettings {
            row_column: false,
            cycle_limit: 7,
            switch_hold_time_ms: 900,
            auto_select_delay_ms: 250,
            ..ScanSettings::default()
        };
        assert!(!settings.tree_config().row_column);
        assert_eq!(settings.tree_config().cycle_limit, 7);
        assert_eq!(settings.switch_timings().hold_time_ms, 900);
        let screen = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(
            settings.cursor_config(screen).confirm_delay,
            Duration::from_millis(250)
        );
        assert_eq!(settings.radar_config(screen).screen, screen);
    }
}
