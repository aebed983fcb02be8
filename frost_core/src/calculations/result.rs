//! # Calculation Result
//!
//! Final values of one calculation together with the diagnostic trail a
//! report needs to show how they were reached.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::depth::FrostDepth;
use super::eta::{LayerDerived, SoilEta};
use super::heave::{classify_risk, HeaveEstimate, RiskLevel};
use super::summation::Summation;
use crate::errors::{CalcError, CalcResult};
use crate::reference::KwSource;

/// Per-layer diagnostics, in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDiagnostic {
    pub layer_id: Uuid,
    pub name: String,
    pub thickness_m: f64,
    pub lambda_f: f64,
    pub eta_f: f64,
    /// Equivalent soil thickness σ_i (m)
    pub sigma: f64,
}

/// Intermediate quantities of the formula chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormulaTrail {
    // === Inputs actually used ===
    pub mean_surface_temp_c: f64,
    pub freezing_hours: f64,
    pub latent_heat: f64,
    pub heave_coefficient: f64,
    pub kw: f64,
    pub kw_source: KwSource,

    // === Soil ===
    pub soil_t0: f64,
    pub soil_lambda_f: f64,
    pub ww_soil: f64,
    pub eta_f_soil: f64,
    pub eta_f0_soil: f64,

    // === Depth ===
    pub part1: f64,
    pub part2: f64,
    /// Σ σ_i (m)
    pub summation: f64,
    /// Σ h_i (m)
    pub construction_thickness_m: f64,
    /// part1·part2 − Σ before flooring (m)
    pub hn_raw: f64,
}

/// Result of a frost-depth calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "soil_code": "14_3",
///   "hn_m": 1.656,
///   "hn_alt_m": 1.325,
///   "hf_m": 1.856,
///   "ratio": 0.892,
///   "mz": 0.4,
///   "sf_cm": 6.62,
///   "risk_level": "high",
///   "layers": [ ... ],
///   "trail": { ... }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub soil_code: String,

    /// Frost penetration depth below the construction Hn (m)
    pub hn_m: f64,

    /// Hn by the comparative method (m)
    pub hn_alt_m: f64,

    /// Frozen column from the surface Hf = Hn + Σh (m)
    pub hf_m: f64,

    /// Hn / Hf
    pub ratio: f64,

    /// Heave reduction factor
    pub mz: f64,

    /// Estimated heave (cm)
    pub sf_cm: f64,

    pub risk_level: RiskLevel,

    pub layers: Vec<LayerDiagnostic>,

    pub trail: FormulaTrail,
}

impl CalculationResult {
    /// True when the construction alone stops frost from reaching the soil
    pub fn frost_contained(&self) -> bool {
        self.hn_m == 0.0
    }
}

/// Inputs of [`assemble`] that are not already bundled elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct TrailContext {
    pub mean_surface_temp_c: f64,
    pub freezing_hours: f64,
    pub latent_heat: f64,
    pub heave_coefficient: f64,
    pub kw: f64,
    pub kw_source: KwSource,
    pub soil_t0: f64,
    pub soil_lambda_f: f64,
    pub construction_thickness_m: f64,
}

/// Package final values and diagnostics.
///
/// Layer diagnostics pair each derived layer with its σ term by position;
/// a mismatch between the two is an internal error.
pub fn assemble(
    soil_code: &str,
    layers: &[LayerDerived],
    summation: &Summation,
    soil: &SoilEta,
    depth: &FrostDepth,
    heave: &HeaveEstimate,
    context: &TrailContext,
) -> CalcResult<CalculationResult> {
    if layers.len() != summation.terms.len() {
        return Err(CalcError::Internal {
            message: format!(
                "{} layers but {} summation terms",
                layers.len(),
                summation.terms.len()
            ),
        });
    }

    let diagnostics = layers
        .iter()
        .zip(&summation.terms)
        .map(|(derived, term)| LayerDiagnostic {
            layer_id: derived.layer.id,
            name: derived.layer.name.clone(),
            thickness_m: derived.layer.thickness_m,
            lambda_f: derived.layer.lambda_f,
            eta_f: derived.eta_f,
            sigma: term.sigma,
        })
        .collect();

    Ok(CalculationResult {
        soil_code: soil_code.to_string(),
        hn_m: depth.hn,
        hn_alt_m: depth.hn_alt,
        hf_m: depth.hf,
        ratio: heave.ratio,
        mz: heave.mz,
        sf_cm: heave.sf_cm,
        risk_level: classify_risk(depth.hn),
        layers: diagnostics,
        trail: FormulaTrail {
            mean_surface_temp_c: context.mean_surface_temp_c,
            freezing_hours: context.freezing_hours,
            latent_heat: context.latent_heat,
            heave_coefficient: context.heave_coefficient,
            kw: context.kw,
            kw_source: context.kw_source,
            soil_t0: context.soil_t0,
            soil_lambda_f: context.soil_lambda_f,
            ww_soil: soil.ww,
            eta_f_soil: soil.eta_f,
            eta_f0_soil: soil.eta_f0,
            part1: depth.part1,
            part2: depth.part2,
            summation: summation.total,
            construction_thickness_m: context.construction_thickness_m,
            hn_raw: depth.hn_raw,
        },
    })
}
