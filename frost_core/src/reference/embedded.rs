//! Reference tables compiled into the binary.
//!
//! The TOML files under `frost_core/data/` are embedded with `include_str!`
//! and parsed once, on first use.

use once_cell::sync::Lazy;

use super::{
    CoefficientRange, Constants, MaterialRecord, ReferenceSource, ReferenceTables, SoilRecord,
};
use crate::errors::{CalcError, CalcResult};

const SOILS_TOML: &str = include_str!("../../data/soils.toml");
const MATERIALS_TOML: &str = include_str!("../../data/materials.toml");
const COEFFICIENTS_TOML: &str = include_str!("../../data/coefficients.toml");
const CONSTANTS_TOML: &str = include_str!("../../data/constants.toml");

static EMBEDDED_TABLES: Lazy<CalcResult<ReferenceTables>> = Lazy::new(|| {
    ReferenceTables::from_toml_strs(SOILS_TOML, MATERIALS_TOML, COEFFICIENTS_TOML, CONSTANTS_TOML)
});

/// Reference source backed by the tables shipped with the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedReference;

impl EmbeddedReference {
    pub fn new() -> Self {
        EmbeddedReference
    }

    /// Borrow the parsed tables directly (synchronous access for listings).
    pub fn tables() -> CalcResult<&'static ReferenceTables> {
        EMBEDDED_TABLES
            .as_ref()
            .map_err(|e| CalcError::reference_unavailable("embedded", e.to_string()))
    }
}

impl ReferenceSource for EmbeddedReference {
    fn name(&self) -> &str {
        "embedded"
    }

    async fn soil_by_code(&self, code: &str) -> CalcResult<Option<SoilRecord>> {
        let tables = Self::tables()?;
        Ok(tables.soils.iter().find(|s| s.code == code).cloned())
    }

    async fn coefficient_ranges(&self) -> CalcResult<Vec<CoefficientRange>> {
        Ok(Self::tables()?.ranges.clone())
    }

    async fn constants(&self) -> CalcResult<Constants> {
        Ok(Self::tables()?.constants)
    }

    async fn soils(&self) -> CalcResult<Vec<SoilRecord>> {
        Ok(Self::tables()?.soils.clone())
    }

    async fn materials(&self) -> CalcResult<Vec<MaterialRecord>> {
        Ok(Self::tables()?.materials.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{resolve_kw, KwSource};

    #[test]
    fn test_embedded_tables_load() {
        let tables = EmbeddedReference::tables().unwrap();
        assert_eq!(tables.soils.len(), 9);
        assert_eq!(tables.materials.len(), 22);
        assert_eq!(tables.ranges.len(), 5);
        assert_eq!(tables.constants, Constants::default());
    }

    #[test]
    fn test_every_soil_resolves_to_a_table_row() {
        let tables = EmbeddedReference::tables().unwrap();
        for soil in &tables.soils {
            let sel = resolve_kw(&tables.ranges, soil.ip, 0.65).unwrap();
            assert!(matches!(sel.source, KwSource::Range { .. }), "{} fell back", soil.code);
        }
    }

    #[test]
    fn test_only_peat_cannot_prefill() {
        let tables = EmbeddedReference::tables().unwrap();
        let blocked: Vec<u32> = tables
            .materials
            .iter()
            .filter(|m| !m.can_prefill())
            .map(|m| m.id)
            .collect();
        assert_eq!(blocked, vec![22]);
    }

    #[tokio::test]
    async fn test_async_lookups() {
        let source = EmbeddedReference::new();
        let soil = source.soil_by_code("14_3").await.unwrap().unwrap();
        assert_eq!(soil.wp, 0.20);
        assert!(source.soil_by_code("99_9").await.unwrap().is_none());

        let sel = source.coefficient_for_plasticity(soil.ip, 0.65).await.unwrap();
        assert_eq!(sel.kw, 0.65);
        assert_eq!(sel.source, KwSource::Range { id: 5 });
    }
}
