//! Persisted boolean preferences.
//!
//! Stored as a flat JSON object of named booleans. Loading is tolerant: a
//! missing key keeps its default, a key with a non-boolean value keeps its
//! default and logs a warning. Only input that is not a JSON object at all
//! is an error.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    /// Negate every ramp value
    pub invert_voltage: bool,
    /// Add drift to steps routed to the active lane
    pub drift_applies_to_active_steps: bool,
    /// Add drift to steps routed to the filtered lane
    pub drift_applies_to_filtered_steps: bool,
    /// Add drift to the drone lane
    pub drift_applies_to_drone: bool,
    /// A reset edge also zeroes the drift phase
    pub reset_also_clears_drift: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            invert_voltage: false,
            drift_applies_to_active_steps: true,
            drift_applies_to_filtered_steps: true,
            drift_applies_to_drone: true,
            reset_also_clears_drift: false,
        }
    }
}

/// Names each preference so hosts can toggle them generically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    InvertVoltage,
    DriftActiveSteps,
    DriftFilteredSteps,
    DriftDrone,
    ResetClearsDrift,
}

impl Preference {
    pub const ALL: [Preference; 5] = [
        Preference::InvertVoltage,
        Preference::DriftActiveSteps,
        Preference::DriftFilteredSteps,
        Preference::DriftDrone,
        Preference::ResetClearsDrift,
    ];

    /// Key used in the persisted object.
    pub fn key(self) -> &'static str {
        match self {
            Preference::InvertVoltage => "invertVoltage",
            Preference::DriftActiveSteps => "driftAppliesToActiveSteps",
            Preference::DriftFilteredSteps => "driftAppliesToFilteredSteps",
            Preference::DriftDrone => "driftAppliesToDrone",
            Preference::ResetClearsDrift => "resetAlsoClearsDrift",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Preference::InvertVoltage => "Invert voltage",
            Preference::DriftActiveSteps => "Drift main steps",
            Preference::DriftFilteredSteps => "Drift filtered steps",
            Preference::DriftDrone => "Drift drone",
            Preference::ResetClearsDrift => "Reset also resets drift",
        }
    }
}

impl Preferences {
    pub fn get(&self, pref: Preference) -> bool {
        match pref {
            Preference::InvertVoltage => self.invert_voltage,
            Preference::DriftActiveSteps => self.drift_applies_to_active_steps,
            Preference::DriftFilteredSteps => self.drift_applies_to_filtered_steps,
            Preference::DriftDrone => self.drift_applies_to_drone,
            Preference::ResetClearsDrift => self.reset_also_clears_drift,
        }
    }

    pub fn set(&mut self, pref: Preference, value: bool) {
        let slot = match pref {
            Preference::InvertVoltage => &mut self.invert_voltage,
            Preference::DriftActiveSteps => &mut self.drift_applies_to_active_steps,
            Preference::DriftFilteredSteps => &mut self.drift_applies_to_filtered_steps,
            Preference::DriftDrone => &mut self.drift_applies_to_drone,
            Preference::ResetClearsDrift => &mut self.reset_also_clears_drift,
        };
        *slot = value;
    }

    pub fn toggle(&mut self, pref: Preference) {
        self.set(pref, !self.get(pref));
    }
}

#[cfg(feature = "serde")]
mod persist {
    use super::{Preference, Preferences};
    use serde_json::{Map, Value};
    use tracing::warn;

    /// Errors that can occur when reading or writing preferences
    #[derive(Debug)]
    pub enum PreferencesError {
        /// Input is not valid JSON
        Parse(serde_json::Error),
        /// Input is JSON but not an object
        NotAnObject,
        /// Preferences could not be encoded
        Serialize(serde_json::Error),
    }

    impl std::fmt::Display for PreferencesError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                PreferencesError::Parse(err) => {
                    write!(f, "preferences are not valid JSON: {}", err)
                }
                PreferencesError::NotAnObject => {
                    write!(f, "preferences must be a JSON object of booleans")
                }
                PreferencesError::Serialize(err) => {
                    write!(f, "failed to encode preferences: {}", err)
                }
            }
        }
    }

    impl std::error::Error for PreferencesError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                PreferencesError::Parse(err) | PreferencesError::Serialize(err) => Some(err),
                PreferencesError::NotAnObject => None,
            }
        }
    }

    impl Preferences {
        /// Overlay the booleans found in `object` onto `self`.
        ///
        /// Missing keys are skipped; non-boolean values are skipped with a warning.
        pub fn merge_json(&mut self, object: &Map<String, Value>) {
            for pref in Preference::ALL {
                match object.get(pref.key()) {
                    None => {}
                    Some(Value::Bool(value)) => self.set(pref, *value),
                    Some(other) => {
                        warn!(key = pref.key(), value = %other, "ignoring non-boolean preference");
                    }
                }
            }
        }

        /// Defaults overlaid with whatever valid keys `value` carries.
        pub fn from_json_value(value: &Value) -> Result<Self, PreferencesError> {
            let object = value.as_object().ok_or(PreferencesError::NotAnObject)?;
            let mut prefs = Self::default();
            prefs.merge_json(object);
            Ok(prefs)
        }

        pub fn from_json_str(text: &str) -> Result<Self, PreferencesError> {
            let value: Value = serde_json::from_str(text).map_err(PreferencesError::Parse)?;
            Self::from_json_value(&value)
        }

        pub fn to_json_value(&self) -> Value {
            let mut object = Map::new();
            for pref in Preference::ALL {
                object.insert(pref.key().to_string(), Value::Bool(self.get(pref)));
            }
            Value::Object(object)
        }

        pub fn to_json_string(&self) -> Result<String, PreferencesError> {
            serde_json::to_string_pretty(self).map_err(PreferencesError::Serialize)
        }
    }
}

#[cfg(feature = "serde")]
pub use persist::PreferencesError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_all_drift() {
        let prefs = Preferences::default();
        assert!(!prefs.invert_voltage);
        assert!(prefs.drift_applies_to_active_steps);
        assert!(prefs.drift_applies_to_filtered_steps);
        assert!(prefs.drift_applies_to_drone);
        assert!(!prefs.reset_also_clears_drift);
    }

    #[test]
    fn toggle_flips_only_one_field() {
        let mut prefs = Preferences::default();
        prefs.toggle(Preference::DriftDrone);
        assert!(!prefs.drift_applies_to_drone);
        assert_eq!(
            prefs,
            Preferences {
                drift_applies_to_drone: false,
                ..Preferences::default()
            }
        );
    }

    #[cfg(feature = "serde")]
    mod json {
        use super::super::*;
        use serde_json::json;

        #[test]
        fn writes_flat_camel_case_object() {
            let prefs = Preferences {
                invert_voltage: true,
                ..Preferences::default()
            };
            let value = serde_json::to_value(prefs).expect("serialize");
            assert_eq!(
                value,
                json!({
                    "invertVoltage": true,
                    "driftAppliesToActiveSteps": true,
                    "driftAppliesToFilteredSteps": true,
                    "driftAppliesToDrone": true,
                    "resetAlsoClearsDrift": false,
                })
            );
            assert_eq!(value, prefs.to_json_value());
        }

        #[test]
        fn missing_keys_keep_defaults() {
            let prefs = Preferences::from_json_str(r#"{"resetAlsoClearsDrift": true}"#)
                .expect("valid object");
            assert_eq!(
                prefs,
                Preferences {
                    reset_also_clears_drift: true,
                    ..Preferences::default()
                }
            );
        }

        #[test]
        fn malformed_values_keep_defaults() {
            let prefs = Preferences::from_json_str(
                r#"{"invertVoltage": "yes", "driftAppliesToDrone": false, "extra": 3}"#,
            )
            .expect("valid object");
            assert!(!prefs.invert_voltage);
            assert!(!prefs.drift_applies_to_drone);
        }

        #[test]
        fn non_object_is_rejected() {
            assert!(matches!(
                Preferences::from_json_str("[true, false]"),
                Err(PreferencesError::NotAnObject)
            ));
            assert!(matches!(
                Preferences::from_json_str("{not json"),
                Err(PreferencesError::Parse(_))
            ));
        }

        #[test]
        fn string_round_trip() {
            let prefs = Preferences {
                drift_applies_to_filtered_steps: false,
                reset_also_clears_drift: true,
                ..Preferences::default()
            };
            let text = prefs.to_json_string().expect("serialize");
            assert_eq!(Preferences::from_json_str(&text).expect("parse"), prefs);
        }
    }
}
