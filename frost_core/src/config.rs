//! # Configuration
//!
//! `FrostConfig` is read from a TOML file. Every section and field is
//! optional; anything left out takes the shipped default.
//!
//! ```toml
//! [calibration]
//! default_kw = 0.65
//! alt_method_scale = 0.8
//!
//! [climate]
//! mean_surface_temp_c = 12.51
//! freezing_hours = 3624
//!
//! [reference]
//! data_dir = "/srv/frostline/tables"
//! lookup_timeout_ms = 5000
//!
//! [storage]
//! history_path = "/home/me/.frostline/history.json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::calculations::ClimateInput;
use crate::errors::{CalcError, CalcResult};

/// Default moisture-reduction coefficient when no plasticity range matches (clay)
pub const DEFAULT_KW: f64 = 0.65;

/// Default scale from the primary method's Hn to the comparative method's
pub const DEFAULT_ALT_METHOD_SCALE: f64 = 0.8;

/// Default budget for the reference-data lookups of one request
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 5_000;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrostConfig {
    pub calibration: CalibrationSettings,
    pub climate: ClimateSettings,
    pub reference: ReferenceSettings,
    pub storage: StorageSettings,
}

/// Calibrated literals that are not part of the reference tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    /// kw used when no coefficient range matches the plasticity index
    pub default_kw: f64,
    /// Hn_alt = Hn × alt_method_scale
    pub alt_method_scale: f64,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        CalibrationSettings {
            default_kw: DEFAULT_KW,
            alt_method_scale: DEFAULT_ALT_METHOD_SCALE,
        }
    }
}

impl CalibrationSettings {
    /// Validate calibration values.
    pub fn validate(&self) -> CalcResult<()> {
        if !(0.0..=1.0).contains(&self.default_kw) {
            return Err(CalcError::invalid_parameter(
                "calibration.default_kw",
                self.default_kw.to_string(),
                "Must be within [0, 1]",
            ));
        }
        if !self.alt_method_scale.is_finite() || self.alt_method_scale < 0.0 {
            return Err(CalcError::invalid_parameter(
                "calibration.alt_method_scale",
                self.alt_method_scale.to_string(),
                "Must be a non-negative number",
            ));
        }
        Ok(())
    }
}

/// Site climate used when a request leaves θmp or τf blank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateSettings {
    pub mean_surface_temp_c: Option<f64>,
    pub freezing_hours: Option<f64>,
}

impl ClimateSettings {
    /// Fill blanks in a request's climate from these settings.
    ///
    /// Values the request already carries win.
    pub fn fill(&self, input: ClimateInput) -> ClimateInput {
        ClimateInput {
            mean_surface_temp_c: input.mean_surface_temp_c.or(self.mean_surface_temp_c),
            freezing_hours: input.freezing_hours.or(self.freezing_hours),
        }
    }
}

/// Where reference tables come from and how long lookups may take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceSettings {
    /// Directory holding the TOML tables; embedded tables when unset
    pub data_dir: Option<PathBuf>,
    pub lookup_timeout_ms: u64,
}

impl Default for ReferenceSettings {
    fn default() -> Self {
        ReferenceSettings {
            data_dir: None,
            lookup_timeout_ms: DEFAULT_LOOKUP_TIMEOUT_MS,
        }
    }
}

impl ReferenceSettings {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

/// Local persistence paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub history_path: Option<PathBuf>,
}

impl StorageSettings {
    /// Configured history path, or `~/.frostline/history.json`
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_path
            .clone()
            .or_else(|| app_dir().map(|dir| dir.join("history.json")))
    }
}

/// Per-user application directory (`~/.frostline`)
pub fn app_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".frostline"))
}

/// Default config file location (`~/.frostline/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    app_dir().map(|dir| dir.join("config.toml"))
}

impl FrostConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> CalcResult<Self> {
        let config: FrostConfig = toml::from_str(contents)
            .map_err(|e| CalcError::serialization(format!("Invalid config: {}", e)))?;
        config.calibration.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, falling back to defaults.
    ///
    /// A missing file is silently treated as empty. An unreadable or invalid
    /// file is logged and ignored.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return FrostConfig::default();
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return FrostConfig::default();
            }
        };

        match Self::from_toml_str(&content) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "Loaded config");
                config
            }
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                FrostConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FrostConfig::default();
        assert_eq!(config.calibration.default_kw, 0.65);
        assert_eq!(config.calibration.alt_method_scale, 0.8);
        assert_eq!(config.reference.lookup_timeout(), Duration::from_secs(5));
        assert!(config.reference.data_dir.is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config = FrostConfig::from_toml_str(
            r#"
            [calibration]
            alt_method_scale = 0.75

            [climate]
            freezing_hours = 4000
            "#,
        )
        .unwrap();
        assert_eq!(config.calibration.alt_method_scale, 0.75);
        assert_eq!(config.calibration.default_kw, 0.65);
        assert_eq!(config.climate.freezing_hours, Some(4000.0));
        assert_eq!(config.climate.mean_surface_temp_c, None);
    }

    #[test]
    fn test_invalid_calibration_rejected() {
        let err = FrostConfig::from_toml_str("[calibration]\ndefault_kw = 1.5\n").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
    }

    #[test]
    fn test_load_falls_back_on_garbage() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[calibration\n").unwrap();
        assert_eq!(FrostConfig::load(&path), FrostConfig::default());
        assert_eq!(FrostConfig::load(&tmp.path().join("missing.toml")), FrostConfig::default());
    }

    #[test]
    fn test_climate_fill_keeps_request_values() {
        let settings = ClimateSettings {
            mean_surface_temp_c: Some(10.0),
            freezing_hours: Some(3000.0),
        };
        let filled = settings.fill(ClimateInput {
            mean_surface_temp_c: Some(12.0),
            freezing_hours: None,
        });
        assert_eq!(filled.mean_surface_temp_c, Some(12.0));
        assert_eq!(filled.freezing_hours, Some(3000.0));
    }
}
