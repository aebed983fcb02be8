//! # Frost Depth Calculation
//!
//! The synchronous engine. Given a validated request and the reference rows
//! it resolved to, runs the whole formula chain:
//!
//! 1. soil overrides → [`SoilProperties`]
//! 2. plasticity → kw (table, then calibrated fallback)
//! 3. η_f per layer, η_f/η_f0 for the soil
//! 4. Σ equivalent thickness
//! 5. Hn, Hn_alt, Hf
//! 6. ratio, mz, sf, risk
//!
//! The function is pure: identical inputs give bit-identical results.
//!
//! ## Example
//!
//! ```rust
//! use frost_core::calculations::{calculate, CalculationRequest, Layer, ResolvedReference};
//! use frost_core::config::CalibrationSettings;
//! use frost_core::reference::{resolve_soil, EmbeddedReference};
//!
//! let tables = EmbeddedReference::tables().unwrap();
//! let reference = ResolvedReference {
//!     soil: resolve_soil(&tables.soils, "14_3").unwrap().clone(),
//!     ranges: tables.ranges.clone(),
//!     constants: tables.constants,
//! };
//! let request = CalculationRequest::new("14_3")
//!     .with_layer(Layer::new("Cement concrete", 0.2, 2300.0, 0.03, 1.9, 1675.0));
//!
//! let result = calculate(&request, &reference, &CalibrationSettings::default()).unwrap();
//! assert!((result.hn_m - 1.6559).abs() < 1e-4);
//! ```

use serde::{Deserialize, Serialize};

use super::depth::{frost_depth, DepthInputs};
use super::eta::{derive_layers, soil_eta};
use super::heave::estimate_heave;
use super::request::{CalculationRequest, SoilProperties};
use super::result::{assemble, CalculationResult, TrailContext};
use super::summation::summation;
use crate::config::CalibrationSettings;
use crate::errors::CalcResult;
use crate::reference::{resolve_kw, CoefficientRange, Constants, SoilRecord};

/// Reference rows one calculation runs against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedReference {
    pub soil: SoilRecord,
    pub ranges: Vec<CoefficientRange>,
    pub constants: Constants,
}

/// Run the frost-depth formula chain.
pub fn calculate(
    request: &CalculationRequest,
    reference: &ResolvedReference,
    calibration: &CalibrationSettings,
) -> CalcResult<CalculationResult> {
    request.validate()?;
    calibration.validate()?;

    let soil = SoilProperties::resolve(&reference.soil, &request.soil);
    let kw = resolve_kw(&reference.ranges, soil.ip, calibration.default_kw)?;

    let constants = &reference.constants;
    let theta_mp = request
        .climate
        .mean_surface_temp_c
        .unwrap_or(constants.mean_surface_temp_c);
    let freezing_hours = request.climate.freezing_hours.unwrap_or(constants.freezing_hours);

    let layers = derive_layers(&request.layers, theta_mp, constants.latent_heat)?;
    let soil_terms = soil_eta(&soil, kw.kw, theta_mp, constants.latent_heat)?;
    let sum = summation(&layers, soil.lambda_f, soil_terms.eta_f)?;

    let construction_thickness_m = request.construction_thickness_m();
    let depth = frost_depth(&DepthInputs {
        soil_lambda_f: soil.lambda_f,
        soil_t0: soil.t0,
        soil_eta_f: soil_terms.eta_f,
        soil_eta_f0: soil_terms.eta_f0,
        mean_surface_temp_c: theta_mp,
        freezing_hours,
        summation: sum.total,
        construction_thickness_m,
        alt_method_scale: calibration.alt_method_scale,
    })?;
    let heave = estimate_heave(depth.hn, depth.hf, constants.heave_coefficient);

    tracing::debug!(
        soil = %reference.soil.code,
        kw = kw.kw,
        summation = sum.total,
        hn = depth.hn,
        "Frost depth calculated"
    );

    assemble(
        &reference.soil.code,
        &layers,
        &sum,
        &soil_terms,
        &depth,
        &heave,
        &TrailContext {
            mean_surface_temp_c: theta_mp,
            freezing_hours,
            latent_heat: constants.latent_heat,
            heave_coefficient: constants.heave_coefficient,
            kw: kw.kw,
            kw_source: kw.source,
            soil_t0: soil.t0,
            soil_lambda_f: soil.lambda_f,
            construction_thickness_m,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{heave::RiskLevel, Layer, SoilInput};
    use crate::errors::CalcError;
    use crate::reference::{resolve_soil, EmbeddedReference, KwSource};

    fn clay_reference() -> ResolvedReference {
        let tables = EmbeddedReference::tables().unwrap();
        ResolvedReference {
            soil: resolve_soil(&tables.soils, "14_3").unwrap().clone(),
            ranges: tables.ranges.clone(),
            constants: tables.constants,
        }
    }

    fn concrete(thickness: f64) -> Layer {
        Layer::new("Cement concrete", thickness, 2300.0, 0.03, 1.9, 1675.0)
    }

    fn run(request: &CalculationRequest) -> CalcResult<CalculationResult> {
        calculate(request, &clay_reference(), &CalibrationSettings::default())
    }

    #[test]
    fn test_single_concrete_layer() {
        let request = CalculationRequest::new("14_3").with_layer(concrete(0.2));
        let result = run(&request).unwrap();

        assert!((result.trail.ww_soil - 0.13).abs() < 1e-12);
        assert!((result.trail.eta_f_soil - 57175.225).abs() < 1e-6);
        assert!((result.trail.eta_f0_soil - 45422.05).abs() < 1e-6);
        assert!((result.trail.part1 * result.trail.part2 - 1.7919740002339826).abs() < 1e-9);
        assert_eq!(result.trail.kw_source, KwSource::Range { id: 5 });

        assert!((result.hn_m - 1.6559025129378335).abs() < 1e-9);
        assert!((result.hn_alt_m - 1.6559025129378335 * 0.8).abs() < 1e-9);
        assert!((result.hf_m - 1.8559025129378335).abs() < 1e-9);
        assert_eq!(result.mz, 0.4);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.layers.len(), 1);
        assert_eq!(result.layers[0].layer_id, request.layers[0].id);
    }

    #[test]
    fn test_five_layer_pavement() {
        let request = CalculationRequest::new("14_3")
            .with_layer(concrete(0.44))
            .with_layer(concrete(0.2))
            .with_layer(concrete(0.3))
            .with_layer(concrete(0.2))
            .with_layer(Layer::new("Sand concrete", 0.2, 2000.0, 0.05, 1.8, 1840.0));
        let result = run(&request).unwrap();

        assert!((result.trail.summation - 0.9374166329281047).abs() < 1e-9);
        assert!((result.hn_m - 0.8545573673058778).abs() < 1e-9);
        assert!((result.hf_m - 2.194557367305878).abs() < 1e-9);
        assert!((result.ratio - 0.38939850925608976).abs() < 1e-9);
        assert_eq!(result.mz, 0.7);
        assert!((result.sf_cm - 5.981901571141146).abs() < 1e-9);
        assert_eq!(result.risk_level, RiskLevel::Medium);

        let names: Vec<&str> = result.layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names.last(), Some(&"Sand concrete"));
        for (diag, layer) in result.layers.iter().zip(&request.layers) {
            assert_eq!(diag.layer_id, layer.id);
        }
    }

    #[test]
    fn test_thickness_monotonically_reduces_depth() {
        let mut previous = f64::INFINITY;
        for step in 1..=40 {
            let thickness = step as f64 * 0.1;
            let result = run(&CalculationRequest::new("14_3").with_layer(concrete(thickness))).unwrap();
            if result.hn_m > 0.0 {
                assert!(result.hn_m < previous, "Hn did not decrease at {} m", thickness);
            } else {
                assert!(result.frost_contained());
                assert_eq!(result.hf_m, thickness);
            }
            previous = result.hn_m;
        }
        assert_eq!(previous, 0.0);
    }

    #[test]
    fn test_identical_requests_identical_results() {
        let request = CalculationRequest::new("14_3")
            .with_layer(concrete(0.3))
            .with_layer(Layer::new("Sand concrete", 0.2, 2000.0, 0.05, 1.8, 1840.0));
        let a = run(&request).unwrap();
        let b = run(&request).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.hn_m.to_bits(), b.hn_m.to_bits());
    }

    #[test]
    fn test_climate_overrides_take_precedence() {
        let base = CalculationRequest::new("14_3").with_layer(concrete(0.2));
        let longer = base.clone().with_climate(crate::calculations::ClimateInput {
            mean_surface_temp_c: None,
            freezing_hours: Some(5000.0),
        });
        let a = run(&base).unwrap();
        let b = run(&longer).unwrap();
        assert_eq!(a.trail.freezing_hours, 3624.0);
        assert_eq!(b.trail.freezing_hours, 5000.0);
        assert!(b.hn_m > a.hn_m);
    }

    #[test]
    fn test_dry_soil_is_invalid_domain() {
        let request = CalculationRequest::new("14_3")
            .with_layer(concrete(0.2))
            .with_soil(SoilInput {
                w: Some(0.12),
                ..SoilInput::default()
            });
        let err = run(&request).unwrap_err();
        assert!(matches!(err, CalcError::InvalidDomain { .. }), "{:?}", err);
    }

    #[test]
    fn test_unmatched_plasticity_uses_default_kw() {
        let request = CalculationRequest::new("14_3")
            .with_layer(concrete(0.2))
            .with_soil(SoilInput {
                ip: Some(1.5),
                ..SoilInput::default()
            });
        let calibration = CalibrationSettings {
            default_kw: 0.6,
            ..CalibrationSettings::default()
        };
        let result = calculate(&request, &clay_reference(), &calibration).unwrap();
        assert_eq!(result.trail.kw, 0.6);
        assert_eq!(result.trail.kw_source, KwSource::Default);
    }

    #[test]
    fn test_invalid_request_fails_before_math() {
        let mut layer = concrete(0.2);
        layer.moisture = 1.5;
        let err = run(&CalculationRequest::new("14_3").with_layer(layer)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
    }
}
