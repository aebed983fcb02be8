//! # File I/O
//!
//! Low-level persistence helpers shared by the history store:
//! - **Atomic saves**: write to `*.tmp`, fsync, rename over the target
//! - **File locking**: an `fs2` exclusive lock on a `.lock` sidecar that also
//!   records who holds it
//! - **Version validation**: schema compatibility of stored documents
//!
//! ## Example
//!
//! ```rust,no_run
//! use frost_core::file_io::{save_json, FileLock};
//! use std::path::Path;
//!
//! let path = Path::new("history.json");
//! let lock = FileLock::acquire(path, "surveyor")?;
//! save_json(&vec![1, 2, 3], path)?;
//! drop(lock);
//! # Ok::<(), frost_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Locks older than this are taken over regardless of owner
pub const STALE_LOCK_HOURS: i64 = 24;

/// Metadata written into a `.lock` sidecar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// Whether the holder is gone (dead pid on this host) or the lock is too old
    pub fn is_stale(&self) -> bool {
        if hostname().as_deref() == Some(self.machine.as_str()) && !process_alive(self.pid) {
            return true;
        }
        (Utc::now() - self.locked_at).num_hours() > STALE_LOCK_HOURS
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists()
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// Exclusive lock on a data file, released on drop.
///
/// Holds an OS-level lock (fs2) on the sidecar for process safety and writes
/// [`LockInfo`] into it so other users can see who has the file.
#[derive(Debug)]
pub struct FileLock {
    target: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire the lock for `path`.
    ///
    /// Fails with `FileLocked` when a live holder exists. Stale sidecars are
    /// taken over with a warning.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = read_lock_info(&lock_path) {
            if !existing.is_stale() {
                return Err(CalcError::file_locked(
                    path.display().to_string(),
                    format!("{} ({})", existing.user_id, existing.machine),
                    existing.locked_at.to_rfc3339(),
                ));
            }
            tracing::warn!(
                path = %lock_path.display(),
                holder = %existing.user_id,
                pid = existing.pid,
                "Taking over stale lock"
            );
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| CalcError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(|e| CalcError::serialization(e.to_string()))?;
        lock_file
            .write_all(lock_json.as_bytes())
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| CalcError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        tracing::debug!(path = %path.display(), "Lock acquired");
        Ok(FileLock {
            target: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current live holder of `path`, if any.
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path)).filter(|info| !info.is_stale())
    }

    /// The locked data file
    pub fn target(&self) -> &Path {
        &self.target
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `history.json` → `history.json.lock`
pub fn lock_path_for(path: &Path) -> PathBuf {
    sidecar(path, "lock")
}

fn tmp_path_for(path: &Path) -> PathBuf {
    sidecar(path, "tmp")
}

fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Serialize `value` as pretty JSON and replace `path` atomically.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CalcError::serialization(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| CalcError::file_error("create directory", parent.display().to_string(), e.to_string()))?;
    }

    let tmp_path = tmp_path_for(path);
    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .write_all(json.as_bytes())
        .and_then(|_| tmp_file.sync_all())
        .map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
        })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })
}

/// Read and parse a JSON document.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> CalcResult<T> {
    let contents =
        fs::read_to_string(path).map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

    serde_json::from_str(&contents)
        .map_err(|e| CalcError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))
}

/// Check that a stored schema version can be read by `expected`.
///
/// Major versions must match. While the major version is 0, a newer minor
/// version in the file is rejected as well.
pub fn validate_version(file_version: &str, expected: &str) -> CalcResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let expected_parts = parse(expected);

    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: expected.to_string(),
    };

    match (file_parts.as_slice(), expected_parts.as_slice()) {
        ([file_major, ..], [expected_major, ..]) if file_major != expected_major => Err(mismatch()),
        ([0, file_minor, ..], [0, expected_minor, ..]) if file_minor > expected_minor => Err(mismatch()),
        ([_, ..], [_, ..]) => Ok(()),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_paths() {
        let path = Path::new("/data/history.json");
        assert_eq!(lock_path_for(path), Path::new("/data/history.json.lock"));
        assert_eq!(tmp_path_for(path), Path::new("/data/history.json.tmp"));
    }

    #[test]
    fn test_atomic_save_leaves_no_tmp_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("values.json");

        save_json(&vec![1.5, 2.5], &path).unwrap();
        assert!(path.exists());
        assert!(!tmp_path_for(&path).exists());

        let loaded: Vec<f64> = load_json(&path).unwrap();
        assert_eq!(loaded, vec![1.5, 2.5]);
    }

    #[test]
    fn test_load_reports_bad_json() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_json::<Vec<f64>>(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        assert_eq!(load_json::<Vec<f64>>(&tmp.path().join("missing.json")).unwrap_err().error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_lock_acquire_and_release() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("history.json");

        let lock = FileLock::acquire(&path, "surveyor").unwrap();
        assert_eq!(lock.info.user_id, "surveyor");
        assert!(lock_path_for(&path).exists());
        assert_eq!(FileLock::check(&path).map(|i| i.user_id), Some("surveyor".to_string()));

        let second = FileLock::acquire(&path, "someone else").unwrap_err();
        assert!(second.is_recoverable());

        drop(lock);
        assert!(!lock_path_for(&path).exists());
        assert!(FileLock::check(&path).is_none());
    }

    #[test]
    fn test_old_lock_is_stale() {
        let mut info = LockInfo::new("surveyor");
        assert!(!info.is_stale());
        info.locked_at = Utc::now() - chrono::Duration::hours(STALE_LOCK_HOURS + 1);
        assert!(info.is_stale());
    }

    #[test]
    fn test_stale_lock_is_taken_over() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("history.json");

        let mut old = LockInfo::new("ghost");
        old.locked_at = Utc::now() - chrono::Duration::hours(48);
        fs::write(lock_path_for(&path), serde_json::to_string(&old).unwrap()).unwrap();

        let lock = FileLock::acquire(&path, "surveyor").unwrap();
        assert_eq!(lock.info.user_id, "surveyor");
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version("0.1.0", "0.1.0").is_ok());
        assert!(validate_version("0.1.5", "0.1.0").is_ok());
        assert!(validate_version("0.0.9", "0.1.0").is_ok());
        assert!(validate_version("1.0.0", "0.1.0").is_err());
        assert!(validate_version("0.2.0", "0.1.0").is_err());
        assert!(validate_version("garbage", "0.1.0").is_err());
    }
}
