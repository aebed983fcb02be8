//! # Calculation Service
//!
//! Async front door of the engine. One call:
//!
//! 1. validates the request before touching the reference source
//! 2. issues the soil, coefficient and constants lookups concurrently
//! 3. waits for all three (bounded by the lookup timeout)
//! 4. runs the synchronous [`calculate`]
//!
//! Dropping the returned future while lookups are pending cancels the
//! request. Nothing is retried.

use std::time::Duration;

use tracing::Instrument;

use crate::calculations::{calculate, CalculationRequest, CalculationResult, ResolvedReference};
use crate::config::{CalibrationSettings, ClimateSettings, FrostConfig};
use crate::errors::{CalcError, CalcResult};
use crate::reference::ReferenceSource;

/// Settings threaded into every service call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceOptions {
    pub calibration: CalibrationSettings,
    pub climate: ClimateSettings,
    pub lookup_timeout: Duration,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        FrostConfig::default().into()
    }
}

impl From<FrostConfig> for ServiceOptions {
    fn from(config: FrostConfig) -> Self {
        ServiceOptions {
            calibration: config.calibration,
            climate: config.climate,
            lookup_timeout: config.reference.lookup_timeout(),
        }
    }
}

/// Fetch the reference rows for `soil_code` from `source`.
///
/// All three lookups run concurrently and must all succeed.
pub async fn resolve_reference<S: ReferenceSource>(
    source: &S,
    soil_code: &str,
    lookup_timeout: Duration,
) -> CalcResult<ResolvedReference> {
    let lookups = async {
        tokio::try_join!(
            source.soil_by_code(soil_code),
            source.coefficient_ranges(),
            source.constants(),
        )
    };

    let (soil, ranges, constants) = tokio::time::timeout(lookup_timeout, lookups)
        .await
        .map_err(|_| {
            tracing::warn!(source = source.name(), ?lookup_timeout, "Reference lookup timed out");
            CalcError::reference_unavailable(
                source.name(),
                format!("Lookups did not complete within {} ms", lookup_timeout.as_millis()),
            )
        })??;

    let soil = soil.ok_or_else(|| CalcError::soil_not_found(soil_code))?;
    Ok(ResolvedReference {
        soil,
        ranges,
        constants,
    })
}

/// Validate, resolve and calculate one request.
pub async fn calculate_frost_depth<S: ReferenceSource>(
    source: &S,
    request: &CalculationRequest,
    options: &ServiceOptions,
) -> CalcResult<CalculationResult> {
    request.validate()?;

    let span = tracing::info_span!("calculate", soil = %request.soil_code, layers = request.layers.len());
    async {
        let reference = resolve_reference(source, &request.soil_code, options.lookup_timeout).await?;
        tracing::debug!(source = source.name(), "Reference data resolved");

        let mut request = request.clone();
        request.climate = options.climate.fill(request.climate);

        let result = calculate(&request, &reference, &options.calibration)?;
        tracing::info!(hn = result.hn_m, risk = %result.risk_level, "Calculation complete");
        Ok(result)
    }
    .instrument(span)
    .await
}
