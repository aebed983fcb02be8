//! # Phase-change Capacity (η)
//!
//! For every layer the engine needs the frozen-state thermal capacity
//! including the latent heat of the water that actually freezes:
//!
//! ```text
//! η_f  = 0.5·θmp·Cf + ρd·(w − ww)·L
//! η_f0 = 0.5·t0·Cf  + ρd·(w − ww)·L        (soil only)
//! ```
//!
//! `ww` is the unfrozen water content. It is zero for construction layers
//! and `kw·wp` for the subgrade soil.

use serde::{Deserialize, Serialize};

use super::request::{Layer, SoilProperties};
use crate::errors::{CalcError, CalcResult};

/// A construction layer with its computed η_f.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDerived {
    pub layer: Layer,
    pub eta_f: f64,
}

/// η terms of the subgrade soil.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilEta {
    /// Unfrozen water content ww = kw·wp
    pub ww: f64,
    pub eta_f: f64,
    pub eta_f0: f64,
}

fn require_non_negative(field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CalcError::invalid_parameter(field, value.to_string(), "Must be a non-negative number"));
    }
    Ok(())
}

/// ww = kw·wp
pub fn unfrozen_water(kw: f64, wp: f64) -> CalcResult<f64> {
    require_non_negative("kw", kw)?;
    require_non_negative("wp", wp)?;
    Ok(kw * wp)
}

/// η = 0.5·temperature·Cf + ρd·(w − ww)·L
///
/// `temperature` is θmp for η_f and t0 for η_f0. The result may be negative
/// when more water stays unfrozen than the layer holds; callers guard the
/// roots and divisions that follow.
pub fn eta(temperature: f64, c_f: f64, rho_d: f64, w: f64, ww: f64, latent_heat: f64) -> CalcResult<f64> {
    require_non_negative("temperature", temperature)?;
    require_non_negative("c_f", c_f)?;
    require_non_negative("rho_d", rho_d)?;
    require_non_negative("w", w)?;
    require_non_negative("ww", ww)?;
    require_non_negative("latent_heat", latent_heat)?;

    Ok(0.5 * temperature * c_f + rho_d * (w - ww) * latent_heat)
}

/// Compute η_f for every construction layer, preserving order.
pub fn derive_layers(layers: &[Layer], theta_mp: f64, latent_heat: f64) -> CalcResult<Vec<LayerDerived>> {
    layers
        .iter()
        .map(|layer| {
            let eta_f = eta(theta_mp, layer.c_f, layer.density_kg_m3, layer.moisture, 0.0, latent_heat)?;
            Ok(LayerDerived {
                layer: layer.clone(),
                eta_f,
            })
        })
        .collect()
}

/// Compute ww, η_f and η_f0 of the subgrade soil.
pub fn soil_eta(soil: &SoilProperties, kw: f64, theta_mp: f64, latent_heat: f64) -> CalcResult<SoilEta> {
    let ww = unfrozen_water(kw, soil.wp)?;
    Ok(SoilEta {
        ww,
        eta_f: eta(theta_mp, soil.c_f, soil.rho_d, soil.w, ww, latent_heat)?,
        eta_f0: eta(soil.t0, soil.c_f, soil.rho_d, soil.w, ww, latent_heat)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clay() -> SoilProperties {
        SoilProperties {
            t0: 1.5,
            ip: 0.18,
            wp: 0.20,
            lambda_f: 1.5,
            c_f: 2135.0,
            rho_d: 1640.0,
            w: 0.21,
        }
    }

    #[test]
    fn test_soil_eta_fixture() {
        let eta = soil_eta(&clay(), 0.65, 12.51, 334.0).unwrap();
        assert!((eta.ww - 0.13).abs() < 1e-12);
        assert!((eta.eta_f - 57175.225).abs() < 1e-6);
        assert!((eta.eta_f0 - 45422.05).abs() < 1e-6);
    }

    #[test]
    fn test_construction_layer_has_no_unfrozen_water() {
        let layers = vec![Layer::new("Cement concrete", 0.2, 2300.0, 0.03, 1.9, 1675.0)];
        let derived = derive_layers(&layers, 12.51, 334.0).unwrap();
        // 0.5·12.51·1675 + 2300·0.03·334
        assert!((derived[0].eta_f - 33523.125).abs() < 1e-6);
        assert_eq!(derived[0].layer.id, layers[0].id);
    }

    #[test]
    fn test_negative_input_rejected() {
        let err = eta(12.51, -1.0, 2300.0, 0.03, 0.0, 334.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
        assert!(unfrozen_water(f64::NAN, 0.2).is_err());
    }

    #[test]
    fn test_eta_may_go_negative() {
        let soil = SoilProperties { w: 0.12, ..clay() };
        let eta = soil_eta(&soil, 0.65, 12.51, 334.0).unwrap();
        assert!(eta.eta_f > 0.0);
        assert!(eta.eta_f0 < 0.0);
    }
}
