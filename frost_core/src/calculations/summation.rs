//! # Layer Summation
//!
//! Each construction layer is converted to the thickness of subgrade soil
//! with the same thermal resistance to frost:
//!
//! ```text
//! σ_i = h_i · √( (λf_soil · η_f,i) / (λf_i · η_f,soil) )
//! Σ   = Σ σ_i
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::eta::LayerDerived;
use crate::errors::{CalcError, CalcResult};

/// Equivalent soil thickness of one construction layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummationTerm {
    pub layer_id: Uuid,
    pub sigma: f64,
}

/// All σ terms in layer order, with their sum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summation {
    pub terms: Vec<SummationTerm>,
    pub total: f64,
}

/// Sum the equivalent thicknesses of `layers` relative to the soil.
///
/// An empty slice gives Σ = 0. A zero divisor is `DivisionByZero`; a negative
/// radicand is `InvalidDomain`.
pub fn summation(layers: &[LayerDerived], soil_lambda_f: f64, soil_eta_f: f64) -> CalcResult<Summation> {
    if layers.is_empty() {
        return Ok(Summation::default());
    }
    if soil_eta_f == 0.0 {
        return Err(CalcError::division_by_zero("eta_f_soil", "Soil η_f is zero"));
    }

    let mut terms = Vec::with_capacity(layers.len());
    let mut total = 0.0;

    for (i, derived) in layers.iter().enumerate() {
        let layer = &derived.layer;
        if layer.lambda_f <= 0.0 {
            return Err(CalcError::division_by_zero(
                format!("layers[{}].lambda_f", i),
                "Thermal conductivity must be positive",
            ));
        }

        let radicand = (soil_lambda_f * derived.eta_f) / (layer.lambda_f * soil_eta_f);
        if radicand < 0.0 {
            return Err(CalcError::invalid_domain(
                format!("sigma[{}]", i),
                radicand,
                "Layer and soil η_f have opposite signs",
            ));
        }

        let sigma = layer.thickness_m * radicand.sqrt();
        tracing::trace!(layer = %layer.name, sigma, "Summation term");
        terms.push(SummationTerm {
            layer_id: layer.id,
            sigma,
        });
        total += sigma;
    }

    Ok(Summation { terms, total })
}
