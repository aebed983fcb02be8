//! # Frost Penetration Depth
//!
//! ```text
//! part1 = 1.9 · √(2 · λf_soil · τf)
//! part2 = √(θmp / η_f,soil) − √(t0 / η_f0,soil)
//! Hn    = max(0, part1 · part2 − Σ)
//! Hn_alt = Hn · alt_scale
//! Hf    = Hn + Σ h_i
//! ```
//!
//! Hn is the depth of frost below the construction, Hf the full frozen
//! column from the surface.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Empirical factor of the frost-depth formula
pub const DEPTH_FACTOR: f64 = 1.9;

/// Everything the depth formula consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthInputs {
    pub soil_lambda_f: f64,
    pub soil_t0: f64,
    pub soil_eta_f: f64,
    pub soil_eta_f0: f64,
    /// θmp (°C)
    pub mean_surface_temp_c: f64,
    /// τf (h)
    pub freezing_hours: f64,
    /// Σ σ_i (m)
    pub summation: f64,
    /// Σ h_i of construction layers (m)
    pub construction_thickness_m: f64,
    pub alt_method_scale: f64,
}

/// Depth results with the intermediate parts kept for the report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrostDepth {
    pub part1: f64,
    pub part2: f64,
    /// part1·part2 − Σ before flooring
    pub hn_raw: f64,
    pub hn: f64,
    pub hn_alt: f64,
    pub hf: f64,
}

fn checked_sqrt(quantity: &str, radicand: f64) -> CalcResult<f64> {
    if radicand < 0.0 || radicand.is_nan() {
        return Err(CalcError::invalid_domain(quantity, radicand, "Square root of a negative number"));
    }
    Ok(radicand.sqrt())
}

fn checked_ratio(quantity: &str, numerator: f64, denominator: f64) -> CalcResult<f64> {
    if denominator == 0.0 {
        return Err(CalcError::division_by_zero(quantity, "Divisor is zero"));
    }
    Ok(numerator / denominator)
}

pub fn frost_depth(inputs: &DepthInputs) -> CalcResult<FrostDepth> {
    let part1 = DEPTH_FACTOR * checked_sqrt("part1", 2.0 * inputs.soil_lambda_f * inputs.freezing_hours)?;

    let surface = checked_ratio("eta_f_soil", inputs.mean_surface_temp_c, inputs.soil_eta_f)?;
    let onset = checked_ratio("eta_f0_soil", inputs.soil_t0, inputs.soil_eta_f0)?;
    let part2 = checked_sqrt("part2.surface", surface)? - checked_sqrt("part2.onset", onset)?;

    let hn_raw = part1 * part2 - inputs.summation;
    let hn = hn_raw.max(0.0);
    let hn_alt = hn * inputs.alt_method_scale;
    let hf = hn + inputs.construction_thickness_m;

    if ![part1, part2, hn_raw, hn_alt, hf].iter().all(|v| v.is_finite()) {
        return Err(CalcError::invalid_domain("hn", hn_raw, "Depth is not a finite number"));
    }

    if hn_raw < 0.0 {
        tracing::debug!(hn_raw, "Construction exceeds frost depth, Hn floored at 0");
    }

    Ok(FrostDepth {
        part1,
        part2,
        hn_raw,
        hn,
        hn_alt,
        hf,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_clay() -> DepthInputs {
        DepthInputs {
            soil_lambda_f: 1.5,
            soil_t0: 1.5,
            soil_eta_f: 57175.225,
            soil_eta_f0: 45422.05,
            mean_surface_temp_c: 12.51,
            freezing_hours: 3624.0,
            summation: 0.0,
            construction_thickness_m: 0.0,
            alt_method_scale: 0.8,
        }
    }

    #[test]
    fn test_bare_soil_fixture() {
        let depth = frost_depth(&bare_clay()).unwrap();
        assert!((depth.part1 - 198.11087804560353).abs() < 1e-9);
        assert!((depth.part2 - 0.009045308455104038).abs() < 1e-12);
        assert!((depth.hn - 1.791974).abs() < 1e-6);
        assert_eq!(depth.hn, depth.part1 * depth.part2);
        assert!((depth.hn_alt - depth.hn * 0.8).abs() < 1e-12);
        assert_eq!(depth.hf, depth.hn);
    }

    #[test]
    fn test_single_layer() {
        let depth = frost_depth(&DepthInputs {
            summation: 0.13607148729614907,
            construction_thickness_m: 0.2,
            ..bare_clay()
        })
        .unwrap();
        assert!((depth.hn - 1.6559025129378335).abs() < 1e-9);
        assert!((depth.hf - 1.8559025129378335).abs() < 1e-9);
    }

    #[test]
    fn test_floor_at_zero() {
        let depth = frost_depth(&DepthInputs {
            summation: 5.0,
            construction_thickness_m: 3.0,
            ..bare_clay()
        })
        .unwrap();
        assert!(depth.hn_raw < 0.0);
        assert_eq!(depth.hn, 0.0);
        assert_eq!(depth.hn_alt, 0.0);
        assert_eq!(depth.hf, 3.0);
    }

    #[test]
    fn test_negative_radicand_is_invalid_domain() {
        let err = frost_depth(&DepthInputs {
            soil_eta_f0: -3876.35,
            ..bare_clay()
        })
        .unwrap_err();
        match err {
            CalcError::InvalidDomain { quantity, radicand, .. } => {
                assert_eq!(quantity, "part2.onset");
                assert!(radicand < 0.0);
            }
            other => panic!("expected InvalidDomain, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_eta_is_division_by_zero() {
        let err = frost_depth(&DepthInputs {
            soil_eta_f: 0.0,
            ..bare_clay()
        })
        .unwrap_err();
        assert_eq!(err.error_code(), "DIVISION_BY_ZERO");
    }
}
