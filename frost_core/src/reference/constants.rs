//! Named physical constants and climate defaults.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Physical constants shared by every calculation.
///
/// Values come from the reference tables; [`Constants::default`] mirrors the
/// shipped `constants.toml` so tests and callers without a source agree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constants {
    /// Latent heat of water phase change L (kJ/kg)
    pub latent_heat: f64,
    /// Default absolute mean surface temperature θmp (°C)
    pub mean_surface_temp_c: f64,
    /// Default freezing-period duration τf (h)
    pub freezing_hours: f64,
    /// Frost-heave coefficient kf
    pub heave_coefficient: f64,
    /// Gravitational acceleration g (m/s²)
    pub gravity: f64,
}

impl Default for Constants {
    fn default() -> Self {
        Constants {
            latent_heat: 334.0,
            mean_surface_temp_c: 12.51,
            freezing_hours: 3624.0,
            heave_coefficient: 0.10,
            gravity: 9.81,
        }
    }
}

impl Constants {
    /// Validate constant values.
    pub fn validate(&self) -> CalcResult<()> {
        let positive = [
            ("latent_heat", self.latent_heat),
            ("freezing_hours", self.freezing_hours),
            ("gravity", self.gravity),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalcError::invalid_parameter(field, value.to_string(), "Must be positive"));
            }
        }

        let non_negative = [
            ("mean_surface_temp_c", self.mean_surface_temp_c),
            ("heave_coefficient", self.heave_coefficient),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(CalcError::invalid_parameter(field, value.to_string(), "Must be non-negative"));
            }
        }
        Ok(())
    }
}
