//! # Reference Data
//!
//! Read-only tables the engine resolves against: soils, construction
//! materials, plasticity → kw ranges and physical constants.
//!
//! Tables are stored as TOML (see `frost_core/data/`). They reach the engine
//! through a [`ReferenceSource`], the asynchronous reference-data
//! collaborator. Two sources ship with the crate:
//!
//! - [`EmbeddedReference`] - tables compiled into the binary
//! - [`DirectoryReference`] - the same files read from a directory at runtime
//!
//! ## Example
//!
//! ```rust
//! use frost_core::reference::{EmbeddedReference, resolve_soil};
//!
//! let tables = EmbeddedReference::tables().unwrap();
//! let clay = resolve_soil(&tables.soils, "14_3").unwrap();
//! assert_eq!(clay.t0, 1.5);
//! ```

pub mod coefficients;
pub mod constants;
pub mod directory;
pub mod embedded;
pub mod materials;
pub mod soils;

pub use coefficients::{resolve_kw, validate_ranges, CoefficientRange, KwSelection, KwSource};
pub use constants::Constants;
pub use directory::DirectoryReference;
pub use embedded::EmbeddedReference;
pub use materials::{material_by_id, material_by_name, MaterialRecord};
pub use soils::{resolve_soil, Consistency, SoilRecord, SoilType};

use std::collections::HashSet;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// File names of the four reference tables
pub const SOILS_FILE: &str = "soils.toml";
pub const MATERIALS_FILE: &str = "materials.toml";
pub const COEFFICIENTS_FILE: &str = "coefficients.toml";
pub const CONSTANTS_FILE: &str = "constants.toml";

#[derive(Deserialize)]
pub(crate) struct SoilTable {
    #[serde(default)]
    pub(crate) soil: Vec<SoilRecord>,
}

#[derive(Deserialize)]
pub(crate) struct MaterialTable {
    #[serde(default)]
    pub(crate) material: Vec<MaterialRecord>,
}

#[derive(Deserialize)]
pub(crate) struct CoefficientTable {
    #[serde(default)]
    pub(crate) range: Vec<CoefficientRange>,
}

/// All reference tables, parsed and validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub soils: Vec<SoilRecord>,
    pub materials: Vec<MaterialRecord>,
    pub ranges: Vec<CoefficientRange>,
    pub constants: Constants,
}

impl ReferenceTables {
    /// Parse the four TOML documents and validate the result.
    pub fn from_toml_strs(soils: &str, materials: &str, coefficients: &str, constants: &str) -> CalcResult<Self> {
        let soils: SoilTable = parse_toml(SOILS_FILE, soils)?;
        let materials: MaterialTable = parse_toml(MATERIALS_FILE, materials)?;
        let ranges: CoefficientTable = parse_toml(COEFFICIENTS_FILE, coefficients)?;
        let constants: Constants = parse_toml(CONSTANTS_FILE, constants)?;

        let tables = ReferenceTables {
            soils: soils.soil,
            materials: materials.material,
            ranges: ranges.range,
            constants,
        };
        tables.validate()?;
        Ok(tables)
    }

    /// Check cross-row invariants: unique keys, ordered ranges, sane constants.
    pub fn validate(&self) -> CalcResult<()> {
        let mut codes = HashSet::new();
        for soil in &self.soils {
            if !codes.insert(soil.code.as_str()) {
                return Err(CalcError::invalid_parameter("soil.code", &soil.code, "Duplicate soil code"));
            }
        }

        let mut ids = HashSet::new();
        for material in &self.materials {
            if !ids.insert(material.id) {
                return Err(CalcError::invalid_parameter(
                    "material.id",
                    material.id.to_string(),
                    "Duplicate material id",
                ));
            }
        }

        validate_ranges(&self.ranges)?;
        self.constants.validate()
    }
}

fn parse_toml<T: serde::de::DeserializeOwned>(file: &str, contents: &str) -> CalcResult<T> {
    toml::from_str(contents).map_err(|e| CalcError::serialization(format!("Invalid TOML in {}: {}", file, e)))
}

/// The reference-data collaborator.
///
/// The three lookups the engine needs (`soil_by_code`, `coefficient_ranges`,
/// `constants`) are independent of one another, so callers may await them
/// concurrently. Failures of the underlying store are reported as
/// [`CalcError::ReferenceDataUnavailable`]; an unknown soil code is
/// `Ok(None)`, not an error.
pub trait ReferenceSource: Send + Sync {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    /// Look up one soil by exact code
    fn soil_by_code(&self, code: &str) -> impl Future<Output = CalcResult<Option<SoilRecord>>> + Send;

    /// The ordered plasticity → kw table
    fn coefficient_ranges(&self) -> impl Future<Output = CalcResult<Vec<CoefficientRange>>> + Send;

    /// Physical constants and climate defaults
    fn constants(&self) -> impl Future<Output = CalcResult<Constants>> + Send;

    /// All soils, in table order
    fn soils(&self) -> impl Future<Output = CalcResult<Vec<SoilRecord>>> + Send;

    /// All construction materials, in table order
    fn materials(&self) -> impl Future<Output = CalcResult<Vec<MaterialRecord>>> + Send;

    /// Resolve kw for a plasticity index against this source's table
    fn coefficient_for_plasticity(
        &self,
        ip: f64,
        default_kw: f64,
    ) -> impl Future<Output = CalcResult<KwSelection>> + Send {
        async move {
            let ranges = self.coefficient_ranges().await?;
            resolve_kw(&ranges, ip, default_kw)
        }
    }
}
