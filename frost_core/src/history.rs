//! # Calculation History
//!
//! A JSON file of flattened calculation records, newest first, capped at
//! [`HISTORY_LIMIT`] entries. Every mutation takes the file lock, re-reads
//! the file so concurrent writers are not clobbered, and saves atomically.
//!
//! ## Example
//!
//! ```rust,no_run
//! use frost_core::history::HistoryStore;
//! use std::path::Path;
//!
//! let store = HistoryStore::open(Path::new("history.json"))?;
//! for record in store.list() {
//!     println!("{} {} Hn={:.2} m", record.timestamp, record.soil_code, record.hn_m);
//! }
//! # Ok::<(), frost_core::errors::CalcError>(())
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::{CalculationRequest, CalculationResult, Layer, RiskLevel};
use crate::errors::{CalcError, CalcResult};
use crate::file_io::{load_json, save_json, validate_version, FileLock};

/// Schema version of the history file
pub const HISTORY_SCHEMA_VERSION: &str = "0.1.0";

/// Maximum number of records kept
pub const HISTORY_LIMIT: usize = 100;

/// One saved calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub soil_code: String,
    pub soil_name: String,
    pub hn_m: f64,
    pub hn_alt_m: f64,
    pub sf_cm: f64,
    pub risk_level: RiskLevel,
    pub mean_surface_temp_c: f64,
    pub freezing_hours: f64,
    pub layers: Vec<Layer>,
}

impl HistoryRecord {
    pub fn new(request: &CalculationRequest, soil_name: impl Into<String>, result: &CalculationResult) -> Self {
        HistoryRecord {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            soil_code: result.soil_code.clone(),
            soil_name: soil_name.into(),
            hn_m: result.hn_m,
            hn_alt_m: result.hn_alt_m,
            sf_cm: result.sf_cm,
            risk_level: result.risk_level,
            mean_surface_temp_c: result.trail.mean_surface_temp_c,
            freezing_hours: result.trail.freezing_hours,
            layers: request.layers.clone(),
        }
    }
}

/// On-disk layout of the history file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryFile {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub records: Vec<HistoryRecord>,
}

impl Default for HistoryFile {
    fn default() -> Self {
        let now = Utc::now();
        HistoryFile {
            version: HISTORY_SCHEMA_VERSION.to_string(),
            created_at: now,
            modified_at: now,
            records: Vec::new(),
        }
    }
}

/// File-backed calculation history.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    user_id: String,
    file: HistoryFile,
}

impl HistoryStore {
    /// Open the history at `path`. A missing file is an empty history.
    pub fn open(path: &Path) -> CalcResult<Self> {
        Ok(HistoryStore {
            path: path.to_path_buf(),
            user_id: whoami(),
            file: read_history(path)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records, newest first
    pub fn list(&self) -> &[HistoryRecord] {
        &self.file.records
    }

    pub fn get(&self, id: Uuid) -> Option<&HistoryRecord> {
        self.file.records.iter().find(|r| r.id == id)
    }

    /// Find a record by full id or by a unique id prefix
    pub fn find(&self, key: &str) -> CalcResult<&HistoryRecord> {
        if let Ok(id) = Uuid::parse_str(key) {
            return self.get(id).ok_or_else(|| CalcError::not_found("History record", key));
        }

        let mut matches = self.file.records.iter().filter(|r| r.id.to_string().starts_with(key));
        match (matches.next(), matches.next()) {
            (Some(record), None) if !key.is_empty() => Ok(record),
            (Some(_), Some(_)) => Err(CalcError::invalid_parameter("id", key, "Prefix matches several records")),
            _ => Err(CalcError::not_found("History record", key)),
        }
    }

    /// Save a calculation as the newest record.
    pub fn record(
        &mut self,
        request: &CalculationRequest,
        soil_name: impl Into<String>,
        result: &CalculationResult,
    ) -> CalcResult<HistoryRecord> {
        let record = HistoryRecord::new(request, soil_name, result);
        let saved = record.clone();
        self.mutate(move |records| {
            records.insert(0, record);
            records.truncate(HISTORY_LIMIT);
            Ok(())
        })?;
        tracing::info!(id = %saved.id, path = %self.path.display(), "History record saved");
        Ok(saved)
    }

    /// Remove one record.
    pub fn delete(&mut self, id: Uuid) -> CalcResult<HistoryRecord> {
        let mut removed = None;
        self.mutate(|records| {
            let index = records
                .iter()
                .position(|r| r.id == id)
                .ok_or_else(|| CalcError::not_found("History record", id.to_string()))?;
            removed = Some(records.remove(index));
            Ok(())
        })?;
        removed.ok_or_else(|| CalcError::Internal {
            message: "History delete removed nothing".to_string(),
        })
    }

    /// Remove every record, returning how many were dropped.
    pub fn clear(&mut self) -> CalcResult<usize> {
        let mut count = 0;
        self.mutate(|records| {
            count = records.len();
            records.clear();
            Ok(())
        })?;
        Ok(count)
    }

    fn mutate<F>(&mut self, apply: F) -> CalcResult<()>
    where
        F: FnOnce(&mut Vec<HistoryRecord>) -> CalcResult<()>,
    {
        let _lock = FileLock::acquire(&self.path, &self.user_id)?;

        let mut file = read_history(&self.path)?;
        apply(&mut file.records)?;
        file.modified_at = Utc::now();
        save_json(&file, &self.path)?;

        self.file = file;
        Ok(())
    }
}

fn read_history(path: &Path) -> CalcResult<HistoryFile> {
    if !path.exists() {
        return Ok(HistoryFile::default());
    }
    let file: HistoryFile = load_json(path)?;
    validate_version(&file.version, HISTORY_SCHEMA_VERSION)?;
    Ok(file)
}

fn whoami() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{calculate, ResolvedReference};
    use crate::config::CalibrationSettings;
    use crate::reference::{resolve_soil, EmbeddedReference};

    fn sample(thickness: f64) -> (CalculationRequest, CalculationResult) {
        let tables = EmbeddedReference::tables().unwrap();
        let reference = ResolvedReference {
            soil: resolve_soil(&tables.soils, "14_3").unwrap().clone(),
            ranges: tables.ranges.clone(),
            constants: tables.constants,
        };
        let request = CalculationRequest::new("14_3")
            .with_layer(Layer::new("Cement concrete", thickness, 2300.0, 0.03, 1.9, 1675.0));
        let result = calculate(&request, &reference, &CalibrationSettings::default()).unwrap();
        (request, result)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(&tmp.path().join("history.json")).unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_newest_first_and_persisted() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("history.json");
        let mut store = HistoryStore::open(&path).unwrap();

        let (req_a, res_a) = sample(0.2);
        let (req_b, res_b) = sample(0.4);
        let a = store.record(&req_a, "Clay, semi-hard", &res_a).unwrap();
        let b = store.record(&req_b, "Clay, semi-hard", &res_b).unwrap();

        let ids: Vec<Uuid> = store.list().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);

        let reopened = HistoryStore::open(&path).unwrap();
        assert_eq!(reopened.list(), store.list());
        assert_eq!(reopened.get(a.id).unwrap().layers[0].thickness_m, 0.2);
        assert!(!crate::file_io::lock_path_for(&path).exists());
    }

    #[test]
    fn test_capped_at_limit() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::open(&tmp.path().join("history.json")).unwrap();
        let (request, result) = sample(0.2);

        let first = store.record(&request, "Clay", &result).unwrap();
        for _ in 0..HISTORY_LIMIT {
            store.record(&request, "Clay", &result).unwrap();
        }
        assert_eq!(store.list().len(), HISTORY_LIMIT);
        assert!(store.get(first.id).is_none());
    }

    #[test]
    fn test_delete_and_clear() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::open(&tmp.path().join("history.json")).unwrap();
        let (request, result) = sample(0.2);

        let a = store.record(&request, "Clay", &result).unwrap();
        store.record(&request, "Clay", &result).unwrap();

        assert_eq!(store.delete(a.id).unwrap().id, a.id);
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.delete(a.id).unwrap_err().error_code(), "NOT_FOUND");

        assert_eq!(store.clear().unwrap(), 1);
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_find_by_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::open(&tmp.path().join("history.json")).unwrap();
        let (request, result) = sample(0.2);
        let a = store.record(&request, "Clay", &result).unwrap();

        let prefix = &a.id.to_string()[..8];
        assert_eq!(store.find(prefix).unwrap().id, a.id);
        assert_eq!(store.find(&a.id.to_string()).unwrap().id, a.id);
        assert!(store.find("").is_err());
    }

    #[test]
    fn test_newer_schema_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("history.json");
        let file = HistoryFile {
            version: "0.9.0".to_string(),
            ..HistoryFile::default()
        };
        save_json(&file, &path).unwrap();

        let err = HistoryStore::open(&path).unwrap_err();
        assert!(matches!(err, CalcError::VersionMismatch { .. }));
    }
}
