//! Reference tables read from a directory at runtime.
//!
//! The directory must hold the same four files that ship embedded:
//! `soils.toml`, `materials.toml`, `coefficients.toml`, `constants.toml`.
//! Every lookup re-reads only the file it needs, so edits to the tables are
//! picked up by the next calculation.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::{
    validate_ranges, CoefficientRange, CoefficientTable, Constants, MaterialRecord, MaterialTable,
    ReferenceSource, SoilRecord, SoilTable, COEFFICIENTS_FILE, CONSTANTS_FILE, MATERIALS_FILE,
    SOILS_FILE,
};
use crate::errors::{CalcError, CalcResult};

/// Reference source reading TOML tables from a directory.
#[derive(Debug, Clone)]
pub struct DirectoryReference {
    dir: PathBuf,
    name: String,
}

impl DirectoryReference {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let name = format!("directory {}", dir.display());
        DirectoryReference { dir, name }
    }

    /// Directory the tables are read from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_table<T: DeserializeOwned>(&self, file: &str) -> CalcResult<T> {
        let path = self.dir.join(file);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| CalcError::reference_unavailable(&self.name, format!("{}: {}", path.display(), e)))?;

        toml::from_str(&contents).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Malformed reference table");
            CalcError::reference_unavailable(&self.name, format!("Invalid TOML in {}: {}", path.display(), e))
        })
    }
}

impl ReferenceSource for DirectoryReference {
    fn name(&self) -> &str {
        &self.name
    }

    async fn soil_by_code(&self, code: &str) -> CalcResult<Option<SoilRecord>> {
        let table: SoilTable = self.read_table(SOILS_FILE).await?;
        Ok(table.soil.into_iter().find(|s| s.code == code))
    }

    async fn coefficient_ranges(&self) -> CalcResult<Vec<CoefficientRange>> {
        let table: CoefficientTable = self.read_table(COEFFICIENTS_FILE).await?;
        validate_ranges(&table.range)
            .map_err(|e| CalcError::reference_unavailable(&self.name, e.to_string()))?;
        Ok(table.range)
    }

    async fn constants(&self) -> CalcResult<Constants> {
        let constants: Constants = self.read_table(CONSTANTS_FILE).await?;
        constants
            .validate()
            .map_err(|e| CalcError::reference_unavailable(&self.name, e.to_string()))?;
        Ok(constants)
    }

    async fn soils(&self) -> CalcResult<Vec<SoilRecord>> {
        let table: SoilTable = self.read_table(SOILS_FILE).await?;
        Ok(table.soil)
    }

    async fn materials(&self) -> CalcResult<Vec<MaterialRecord>> {
        let table: MaterialTable = self.read_table(MATERIALS_FILE).await?;
        Ok(table.material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_tables(dir: &Path) {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        for file in [SOILS_FILE, MATERIALS_FILE, COEFFICIENTS_FILE, CONSTANTS_FILE] {
            std::fs::copy(data.join(file), dir.join(file)).unwrap();
        }
    }

    #[tokio::test]
    async fn test_reads_shipped_tables() {
        let tmp = tempfile::tempdir().unwrap();
        write_tables(tmp.path());

        let source = DirectoryReference::new(tmp.path());
        let soil = source.soil_by_code("13_2").await.unwrap().unwrap();
        assert_eq!(soil.lambda_f, 1.2);
        assert_eq!(source.coefficient_ranges().await.unwrap().len(), 5);
        assert_eq!(source.constants().await.unwrap().latent_heat, 334.0);
        assert_eq!(source.materials().await.unwrap().len(), 22);
    }

    #[tokio::test]
    async fn test_missing_directory_is_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        let source = DirectoryReference::new(tmp.path().join("nope"));
        let err = source.constants().await.unwrap_err();
        assert!(matches!(err, CalcError::ReferenceDataUnavailable { .. }));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_malformed_ranges_are_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        write_tables(tmp.path());
        std::fs::write(
            tmp.path().join(COEFFICIENTS_FILE),
            "[[range]]\nid = 1\nip_min = 0.5\nip_max = 0.1\nkw = 0.3\n",
        )
        .unwrap();

        let source = DirectoryReference::new(tmp.path());
        assert!(matches!(
            source.coefficient_ranges().await,
            Err(CalcError::ReferenceDataUnavailable { .. })
        ));
    }
}
