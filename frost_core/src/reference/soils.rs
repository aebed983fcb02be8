//! Subgrade soil records.
//!
//! Each record carries the frozen-state thermal properties of one
//! engineering-geological element (ИГЭ code such as `"14_3"`). The soil acts
//! as the implicit last layer of every cross-section.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Soil classification group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilType {
    Sand,
    SandyLoam,
    Loam,
    Clay,
}

impl SoilType {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            SoilType::Sand => "Sand",
            SoilType::SandyLoam => "Sandy loam",
            SoilType::Loam => "Loam",
            SoilType::Clay => "Clay",
        }
    }
}

impl std::fmt::Display for SoilType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Consistency of cohesive soils (loams and clays)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    SoftPlastic,
    StiffPlastic,
    SemiHard,
}

impl Consistency {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Consistency::SoftPlastic => "soft-plastic",
            Consistency::StiffPlastic => "stiff-plastic",
            Consistency::SemiHard => "semi-hard",
        }
    }
}

/// Immutable soil reference record.
///
/// ## JSON Example
///
/// ```json
/// {
///   "code": "14_3",
///   "name": "Clay, semi-hard",
///   "soil_type": "clay",
///   "consistency": "semi_hard",
///   "t0": 1.5,
///   "ip": 0.18,
///   "wp": 0.20,
///   "lambda_f": 1.5,
///   "c_f": 2135.0,
///   "rho_d": 1640.0,
///   "w": 0.21
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilRecord {
    /// Element code (exact lookup key)
    pub code: String,
    /// Display name
    pub name: String,
    /// Classification group
    pub soil_type: SoilType,
    /// Consistency, for cohesive soils only
    #[serde(default)]
    pub consistency: Option<Consistency>,
    /// Temperature at the start of frost heave t0 (°C)
    pub t0: f64,
    /// Plasticity index Ip (fraction)
    pub ip: f64,
    /// Moisture at the plastic limit Wp (fraction)
    pub wp: f64,
    /// Thermal conductivity, frozen λf (W/(m·°C))
    pub lambda_f: f64,
    /// Volumetric heat capacity, frozen Cf (kJ/(m³·°C))
    pub c_f: f64,
    /// Dry density ρd (kg/m³)
    pub rho_d: f64,
    /// Natural moisture W (fraction)
    pub w: f64,
}

impl SoilRecord {
    /// Label used in pickers: `"14_3 - Clay, semi-hard"`
    pub fn label(&self) -> String {
        format!("{} - {}", self.code, self.name)
    }
}

/// Look up a soil by its exact code.
///
/// # Returns
///
/// * `Ok(&SoilRecord)` - The matching record
/// * `Err(CalcError::NotFound)` - No record has this code
pub fn resolve_soil<'a>(soils: &'a [SoilRecord], code: &str) -> CalcResult<&'a SoilRecord> {
    soils
        .iter()
        .find(|soil| soil.code == code)
        .ok_or_else(|| CalcError::soil_not_found(code))
}
