//! User-level scan settings
//!
//! Settings live as one camelCase JSON object under [`SETTINGS_KEY`] in the
//! durable key/value store. Any field missing from the stored object takes
//! its default, and a stored object that cannot be read or fails validation
//! is replaced by the defaults.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::KeyValueStore;

/// Store key holding the serialized settings
pub const SETTINGS_KEY: &str = "settings";

/// Single-switch auto-scan or two-switch step-and-select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// One switch, highlight advances on a timer
    #[default]
    OneSwitch,
    /// Switch 1 steps the highlight, switch 2 selects
    TwoSwitch,
}

/// Action bound to a short or long hold in single-switch mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldAction {
    None,
    /// Same as a tap: start scanning or commit the highlight
    Select,
    /// Step the highlight forward by one
    Advance,
    /// Jump back to the first candidate
    Restart,
    /// Stop auto-scan
    Stop,
    Undo,
    Clear,
    Speak,
}

/// Case used for letters and messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LetterCase {
    #[default]
    Upper,
    Lower,
}

/// Order in which alphabet letters are scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LetterOrder {
    #[default]
    Alphabetical,
    /// Most frequent letters first, where frequency data exists
    Frequency,
}

/// Errors from settings validation
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("scanSpeedMs must be greater than zero")]
    ZeroScanSpeed,

    #[error("holdSpeedMs must be greater than zero")]
    ZeroHoldSpeed,

    #[error("longHoldDurationMs ({long}) must exceed shortHoldDurationMs ({short})")]
    HoldDurations { short: u64, long: u64 },

    #[error("switch keys must differ, both are {0:?}")]
    SameSwitchKeys(String),
}

/// Every user-tunable knob of the scan engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScanSettings {
    pub mode: ScanMode,
    /// Delay between auto-scan advances
    pub scan_speed_ms: u64,
    /// Delay before leaving the first candidate
    pub first_item_delay_ms: u64,
    /// Minimum gap between a release and the next accepted press
    pub debounce_time_ms: u64,
    pub hold_actions_enabled: bool,
    pub short_hold_duration_ms: u64,
    pub long_hold_duration_ms: u64,
    pub short_hold_action: HoldAction,
    pub long_hold_action: HoldAction,
    /// Two-switch repeat-advance cadence while switch 1 is held
    pub hold_speed_ms: u64,
    pub language: String,
    pub script: Option<String>,
    pub letter_case: LetterCase,
    pub letter_order: LetterOrder,
    pub enable_prediction: bool,
    pub show_word_prediction: bool,
    pub speak_after_predictions: bool,
    pub predicted_letter_count: usize,
    pub predicted_word_count: usize,
    pub game_mode: bool,
    pub game_phrases: Vec<String>,
    pub voice_id: Option<String>,
    /// Physical key name mapped to switch 1
    pub switch1_key: String,
    /// Physical key name mapped to switch 2
    pub switch2_key: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            mode: ScanMode::OneSwitch,
            scan_speed_ms: 1000,
            first_item_delay_ms: 1500,
            debounce_time_ms: 50,
            hold_actions_enabled: false,
            short_hold_duration_ms: 1000,
            long_hold_duration_ms: 2000,
            short_hold_action: HoldAction::Undo,
            long_hold_action: HoldAction::Speak,
            hold_speed_ms: 250,
            language: "en".to_string(),
            script: None,
            letter_case: LetterCase::Upper,
            letter_order: LetterOrder::Alphabetical,
            enable_prediction: true,
            show_word_prediction: true,
            speak_after_predictions: false,
            predicted_letter_count: 3,
            predicted_word_count: 3,
            game_mode: false,
            game_phrases: vec![
                "HELLO WORLD".to_string(),
                "HOW ARE YOU".to_string(),
                "THANK YOU".to_string(),
            ],
            voice_id: None,
            switch1_key: "space".to_string(),
            switch2_key: "enter".to_string(),
        }
    }
}

impl ScanSettings {
    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.scan_speed_ms == 0 {
            return Err(SettingsError::ZeroScanSpeed);
        }
        if self.hold_speed_ms == 0 {
            return Err(SettingsError::ZeroHoldSpeed);
        }
        if self.long_hold_duration_ms <= self.short_hold_duration_ms {
            return Err(SettingsError::HoldDurations {
                short: self.short_hold_duration_ms,
                long: self.long_hold_duration_ms,
            });
        }
        if self.switch1_key.eq_ignore_ascii_case(&self.switch2_key) {
            return Err(SettingsError::SameSwitchKeys(self.switch1_key.clone()));
        }
        Ok(())
    }

    /// Hold classification only runs in single-switch mode with hold actions on
    pub fn hold_classification(&self) -> bool {
        self.mode == ScanMode::OneSwitch && self.hold_actions_enabled
    }

    /// Load settings from the store, falling back to defaults on any failure
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(raw) = store.get(SETTINGS_KEY) else {
            return Self::default();
        };

        let settings: Self = match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(?e, "stored settings unreadable, using defaults");
                return Self::default();
            }
        };

        match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                warn!(%e, "stored settings invalid, using defaults");
                Self::default()
            }
        }
    }

    /// Persist settings to the store
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(raw) => {
                if let Err(e) = store.set(SETTINGS_KEY, &raw) {
                    warn!(?e, "failed to persist settings");
                }
            }
            Err(e) => warn!(?e, "failed to serialize settings"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(ScanSettings::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_long_hold_not_after_short() {
        let settings = ScanSettings {
            short_hold_duration_ms: 1000,
            long_hold_duration_ms: 1000,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::HoldDurations {
                short: 1000,
                long: 1000
            })
        );
    }

    #[test]
    fn test_rejects_same_switch_keys() {
        let settings = ScanSettings {
            switch1_key: "Space".to_string(),
            switch2_key: "space".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::SameSwitchKeys(_))
        ));
    }

    #[test]
    fn test_load_missing_uses_defaults() {
        let store = MemoryStore::new();
        assert_eq!(ScanSettings::load(&store), ScanSettings::default());
    }

    #[test]
    fn test_load_partial_object_fills_defaults() {
        let mut store = MemoryStore::new();
        store
            .set(SETTINGS_KEY, r#"{"scanSpeedMs":700,"mode":"two_switch"}"#)
            .unwrap();

        let settings = ScanSettings::load(&store);
        assert_eq!(settings.scan_speed_ms, 700);
        assert_eq!(settings.mode, ScanMode::TwoSwitch);
        assert_eq!(settings.first_item_delay_ms, 1500);
    }

    #[test]
    fn test_load_garbage_uses_defaults() {
        let mut store = MemoryStore::new();
        store.set(SETTINGS_KEY, "not json").unwrap();
        assert_eq!(ScanSettings::load(&store), ScanSettings::default());
    }

    #[test]
    fn test_load_invalid_uses_defaults() {
        let mut store = MemoryStore::new();
        store.set(SETTINGS_KEY, r#"{"scanSpeedMs":0}"#).unwrap();
        assert_eq!(ScanSettings::load(&store), ScanSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let settings = ScanSettings {
            hold_actions_enabled: true,
            short_hold_action: HoldAction::Restart,
            ..Default::default()
        };
        settings.save(&mut store);
        assert_eq!(ScanSettings::load(&store), settings);
    }
}
