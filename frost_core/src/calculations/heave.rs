//! # Risk and Heave
//!
//! Turns the frost depth into a qualitative risk level and an estimate of
//! surface heave:
//!
//! ```text
//! r  = Hn / Hf
//! mz = table lookup on r
//! sf = Hn · mz · kf          (reported in cm)
//! ```
//!
//! Thresholds do not depend on soil type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::units::{Centimeters, Meters};

/// Hn below this is low risk (m)
pub const MEDIUM_RISK_DEPTH_M: f64 = 0.5;

/// Hn at or above this is high risk (m)
pub const HIGH_RISK_DEPTH_M: f64 = 1.0;

/// Upper ratio bound and mz value, checked in order
pub const MZ_CURVE: [(f64, f64); 6] = [(0.1, 1.0), (0.2, 0.9), (0.3, 0.8), (0.4, 0.7), (0.5, 0.6), (0.6, 0.5)];

/// mz for ratios above the last curve point
pub const MZ_FLOOR: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn display_name(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    /// Report color (hex)
    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Low => "#2e7d32",
            RiskLevel::Medium => "#f9a825",
            RiskLevel::High => "#c62828",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

pub fn classify_risk(hn_m: f64) -> RiskLevel {
    if hn_m < MEDIUM_RISK_DEPTH_M {
        RiskLevel::Low
    } else if hn_m < HIGH_RISK_DEPTH_M {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// r = Hn / Hf, or 0 when there is no frozen column at all
pub fn depth_ratio(hn_m: f64, hf_m: f64) -> f64 {
    if hf_m == 0.0 {
        0.0
    } else {
        hn_m / hf_m
    }
}

/// Heave reduction factor mz for a depth ratio
pub fn mz_for_ratio(ratio: f64) -> f64 {
    MZ_CURVE
        .iter()
        .find(|(upper, _)| ratio <= *upper)
        .map(|(_, mz)| *mz)
        .unwrap_or(MZ_FLOOR)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeaveEstimate {
    pub ratio: f64,
    pub mz: f64,
    pub sf_cm: f64,
}

/// Estimate surface heave from Hn, Hf and the heave coefficient kf.
pub fn estimate_heave(hn_m: f64, hf_m: f64, heave_coefficient: f64) -> HeaveEstimate {
    let ratio = depth_ratio(hn_m, hf_m);
    let mz = mz_for_ratio(ratio);
    let sf = Centimeters::from(Meters(hn_m * mz * heave_coefficient));
    HeaveEstimate {
        ratio,
        mz,
        sf_cm: sf.value(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_boundaries() {
        assert_eq!(classify_risk(0.0), RiskLevel::Low);
        assert_eq!(classify_risk(0.499), RiskLevel::Low);
        assert_eq!(classify_risk(0.5), RiskLevel::Medium);
        assert_eq!(classify_risk(0.999), RiskLevel::Medium);
        assert_eq!(classify_risk(1.0), RiskLevel::High);
    }

    #[test]
    fn test_mz_boundaries() {
        assert_eq!(mz_for_ratio(0.0), 1.0);
        assert_eq!(mz_for_ratio(0.1), 1.0);
        assert_eq!(mz_for_ratio(0.10001), 0.9);
        assert_eq!(mz_for_ratio(0.38939850925608976), 0.7);
        assert_eq!(mz_for_ratio(0.6), 0.5);
        assert_eq!(mz_for_ratio(0.60001), 0.4);
        assert_eq!(mz_for_ratio(1.0), 0.4);
    }

    #[test]
    fn test_ratio_with_empty_column() {
        assert_eq!(depth_ratio(0.0, 0.0), 0.0);
        assert_eq!(estimate_heave(0.0, 0.0, 0.1).sf_cm, 0.0);
    }

    #[test]
    fn test_single_layer_heave() {
        let heave = estimate_heave(1.6559025129378335, 1.8559025129378335, 0.10);
        assert!((heave.ratio - 0.8922357189530357).abs() < 1e-12);
        assert_eq!(heave.mz, 0.4);
        assert!((heave.sf_cm - 6.623610051751334).abs() < 1e-9);
    }

    #[test]
    fn test_risk_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&RiskLevel::Medium).unwrap(), "\"medium\"");
        assert_eq!(RiskLevel::High.to_string(), "High");
    }
}
