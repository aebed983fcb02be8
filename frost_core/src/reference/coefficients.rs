//! Plasticity index → moisture-reduction coefficient kw.
//!
//! Ranges are scanned in table order and the first row satisfying
//! `ip_min <= ip <= ip_max` wins, so a value sitting on a shared boundary
//! (e.g. `ip = 0.07`) takes the lower row. When nothing matches, the
//! calibrated default (clay, 0.65) is returned and the miss is logged.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// One row of the coefficient table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientRange {
    /// Row identifier
    pub id: u32,
    /// Soil group the row describes
    #[serde(default)]
    pub soil_group: String,
    /// Lower plasticity bound (inclusive)
    pub ip_min: f64,
    /// Upper plasticity bound (inclusive)
    pub ip_max: f64,
    /// Moisture-reduction coefficient
    pub kw: f64,
}

impl CoefficientRange {
    /// Whether `ip` falls within this row (both bounds inclusive)
    pub fn contains(&self, ip: f64) -> bool {
        self.ip_min <= ip && ip <= self.ip_max
    }
}

/// Where a kw value came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KwSource {
    /// Matched the table row with this id
    Range { id: u32 },
    /// No row matched; calibrated default used
    Default,
}

/// A resolved coefficient together with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KwSelection {
    pub kw: f64,
    pub source: KwSource,
}

impl KwSelection {
    /// Whether the value came from the fallback rather than the table
    pub fn is_default(&self) -> bool {
        matches!(self.source, KwSource::Default)
    }
}

/// Map a plasticity index to kw.
///
/// # Example
///
/// ```rust
/// use frost_core::reference::{resolve_kw, CoefficientRange, KwSource};
///
/// let ranges = vec![
///     CoefficientRange { id: 2, soil_group: "Sandy loams".into(), ip_min: 0.02, ip_max: 0.07, kw: 0.35 },
///     CoefficientRange { id: 3, soil_group: "Loams".into(), ip_min: 0.07, ip_max: 0.13, kw: 0.50 },
/// ];
/// let boundary = resolve_kw(&ranges, 0.07, 0.65).unwrap();
/// assert_eq!(boundary.kw, 0.35);
/// assert_eq!(boundary.source, KwSource::Range { id: 2 });
/// ```
pub fn resolve_kw(ranges: &[CoefficientRange], ip: f64, default_kw: f64) -> CalcResult<KwSelection> {
    if !ip.is_finite() || ip < 0.0 {
        return Err(CalcError::invalid_parameter(
            "ip",
            ip.to_string(),
            "Plasticity index must be a non-negative number",
        ));
    }

    match ranges.iter().find(|range| range.contains(ip)) {
        Some(range) => Ok(KwSelection {
            kw: range.kw,
            source: KwSource::Range { id: range.id },
        }),
        None => {
            tracing::warn!(ip, default_kw, "No coefficient range matches plasticity index, using default kw");
            Ok(KwSelection {
                kw: default_kw,
                source: KwSource::Default,
            })
        }
    }
}

/// Check that a coefficient table is well formed.
///
/// Rows must have `ip_min <= ip_max`, a kw within `[0, 1]`, and be ordered by
/// ascending `ip_min`. Touching boundaries between adjacent rows are allowed.
pub fn validate_ranges(ranges: &[CoefficientRange]) -> CalcResult<()> {
    for (i, range) in ranges.iter().enumerate() {
        let field = format!("range[{}]", i);
        if !(range.ip_min.is_finite() && range.ip_max.is_finite()) || range.ip_min > range.ip_max {
            return Err(CalcError::invalid_parameter(
                field,
                format!("{}..{}", range.ip_min, range.ip_max),
                "ip_min must not exceed ip_max",
            ));
        }
        if !(0.0..=1.0).contains(&range.kw) {
            return Err(CalcError::invalid_parameter(field, range.kw.to_string(), "kw must be within [0, 1]"));
        }
        if i > 0 && range.ip_min < ranges[i - 1].ip_min {
            return Err(CalcError::invalid_parameter(
                field,
                range.ip_min.to_string(),
                "Ranges must be ordered by ascending ip_min",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<CoefficientRange> {
        [
            (1, 0.0, 0.02, 0.0),
            (2, 0.02, 0.07, 0.35),
            (3, 0.07, 0.13, 0.50),
            (4, 0.13, 0.17, 0.55),
            (5, 0.17, 1.0, 0.65),
        ]
        .into_iter()
        .map(|(id, ip_min, ip_max, kw)| CoefficientRange {
            id,
            soil_group: String::new(),
            ip_min,
            ip_max,
            kw,
        })
        .collect()
    }

    #[test]
    fn test_interior_values() {
        let ranges = table();
        assert_eq!(resolve_kw(&ranges, 0.01, 0.65).unwrap().kw, 0.0);
        assert_eq!(resolve_kw(&ranges, 0.10, 0.65).unwrap().kw, 0.50);
        assert_eq!(resolve_kw(&ranges, 0.18, 0.65).unwrap().kw, 0.65);
    }

    #[test]
    fn test_first_match_wins_on_shared_boundary() {
        let ranges = table();
        let sel = resolve_kw(&ranges, 0.13, 0.65).unwrap();
        assert_eq!(sel.kw, 0.50);
        assert_eq!(sel.source, KwSource::Range { id: 3 });
    }

    #[test]
    fn test_default_when_no_match() {
        let ranges = table();
        let sel = resolve_kw(&ranges, 1.2, 0.65).unwrap();
        assert_eq!(sel.kw, 0.65);
        assert!(sel.is_default());

        let empty = resolve_kw(&[], 0.1, 0.6).unwrap();
        assert_eq!(empty.kw, 0.6);
    }

    #[test]
    fn test_negative_ip_rejected() {
        let ranges = table();
        assert!(matches!(
            resolve_kw(&ranges, -0.01, 0.65),
            Err(CalcError::InvalidParameter { .. })
        ));
        assert!(resolve_kw(&ranges, f64::NAN, 0.65).is_err());
    }

    #[test]
    fn test_validate_ranges() {
        assert!(validate_ranges(&table()).is_ok());

        let mut inverted = table();
        inverted[1].ip_min = 0.08;
        assert!(validate_ranges(&inverted).is_err());

        let mut unordered = table();
        unordered.swap(0, 1);
        assert!(validate_ranges(&unordered).is_err());
    }
}
