#![forbid(unsafe_code)]

//! Behavioral tunables of the interaction core.
//!
//! [`SheetConfig`] collects the constants the gesture interpreter and motion
//! controller use: release sensitivity, overdrag resistance and the
//! animation fallbacks applied when a presentable supplies unusable values.
//!
//! # Loading
//!
//! ```toml
//! # pansheet.toml
//! snap_movement_sensitivity = 0.8
//! overdrag_resistance = 3.0
//! ```
//!
//! ```rust,ignore
//! let config = SheetConfig::from_toml_file("pansheet.toml")?;
//! let config = SheetConfig::from_json_str(json)?;
//! ```
//!
//! Loading requires the `config` feature. Loaded configs are validated and
//! rejected with [`SheetConfigError::Validation`].
//!
//! # Defaults
//!
//! `SheetConfig::default()` reproduces the built-in behavior exactly.

#[cfg(feature = "config")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use pansheet_core::animation::{AnimationParams, DEFAULT_SPRING_DAMPING, DEFAULT_TRANSITION_DURATION};
use pansheet_core::drag::{DEFAULT_SNAP_SENSITIVITY, DEFAULT_VELOCITY_SCALE};

/// Divisor applied to drag deltas while the sheet is above its long form.
pub const DEFAULT_OVERDRAG_RESISTANCE: f64 = 2.0;

/// Interaction tunables.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SheetConfig {
    /// How readily a release counts as a flick, in `[0, 1]`.
    /// Higher values flick at lower velocities.
    pub snap_movement_sensitivity: f64,
    /// Release velocity (points per second) that corresponds to a
    /// sensitivity of zero.
    pub velocity_scale: f64,
    /// Drag deltas above the long-form anchor are divided by this.
    pub overdrag_resistance: f64,
    /// Seconds; used when the presentable's duration is zero.
    pub default_transition_duration: f64,
    /// Used when the presentable's damping is outside `(0, 1]`.
    pub default_spring_damping: f64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            snap_movement_sensitivity: DEFAULT_SNAP_SENSITIVITY,
            velocity_scale: DEFAULT_VELOCITY_SCALE,
            overdrag_resistance: DEFAULT_OVERDRAG_RESISTANCE,
            default_transition_duration: DEFAULT_TRANSITION_DURATION.as_secs_f64(),
            default_spring_damping: DEFAULT_SPRING_DAMPING,
        }
    }
}

impl SheetConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, SheetConfigError> {
        let config: Self = toml::from_str(s).map_err(SheetConfigError::Toml)?;
        config.checked()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SheetConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(SheetConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, SheetConfigError> {
        let config: Self = serde_json::from_str(s).map_err(SheetConfigError::Json)?;
        config.checked()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SheetConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(SheetConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(0.0..=1.0).contains(&self.snap_movement_sensitivity) {
            errors.push(format!(
                "snap_movement_sensitivity must be in [0, 1], got {}",
                self.snap_movement_sensitivity
            ));
        }
        if !(self.velocity_scale.is_finite() && self.velocity_scale > 0.0) {
            errors.push(format!(
                "velocity_scale must be > 0, got {}",
                self.velocity_scale
            ));
        }
        if !(self.overdrag_resistance.is_finite() && self.overdrag_resistance >= 1.0) {
            errors.push(format!(
                "overdrag_resistance must be >= 1, got {}",
                self.overdrag_resistance
            ));
        }
        if !(self.default_transition_duration.is_finite() && self.default_transition_duration > 0.0)
        {
            errors.push(format!(
                "default_transition_duration must be > 0, got {}",
                self.default_transition_duration
            ));
        }
        if !(self.default_spring_damping > 0.0 && self.default_spring_damping <= 1.0) {
            errors.push(format!(
                "default_spring_damping must be in (0, 1], got {}",
                self.default_spring_damping
            ));
        }

        errors
    }

    /// Return `self` if valid, the collected problems otherwise.
    pub fn checked(self) -> Result<Self, SheetConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(SheetConfigError::Validation(errors))
        }
    }

    /// Animation parameters to fall back on.
    ///
    /// Unusable values (negative, non-finite or out of range) use the
    /// built-in defaults, so unvalidated configs never panic here.
    pub fn fallback_animation(&self) -> AnimationParams {
        let duration = Duration::try_from_secs_f64(self.default_transition_duration)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(DEFAULT_TRANSITION_DURATION);
        let damping = self.default_spring_damping;
        let spring_damping = if damping > 0.0 && damping <= 1.0 {
            damping
        } else {
            DEFAULT_SPRING_DAMPING
        };
        AnimationParams {
            duration,
            spring_damping,
            ..AnimationParams::fallback()
        }
    }
}

/// Errors from loading a [`SheetConfig`].
#[derive(Debug)]
pub enum SheetConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for SheetConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for SheetConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
