//! # File I/O Module
//!
//! Handles reference store file operations with safety features:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **File locking**: Keep two ingestion runs from interleaving writes
//! - **Version validation**: Ensure schema compatibility
//!
//! Lock files sit next to the store with a `.lock` suffix and record who
//! holds the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use deck_core::file_io::{load_or_default, save_store, FileLock};
//! use std::path::Path;
//!
//! let path = Path::new("data/reference.json");
//!
//! // Acquire lock before modifying
//! let lock = FileLock::acquire(path, "deckwise ingest")?;
//!
//! let mut store = load_or_default(path)?;
//! store.truncate_materials();
//! save_store(&store, path)?;
//!
//! // Lock is released when dropped
//! drop(lock);
//! # Ok::<(), deck_core::errors::DeckError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{DeckError, DeckResult};
use crate::store::{ReferenceStore, STORE_SCHEMA_VERSION};

/// Locks older than this are considered abandoned
const STALE_LOCK_HOURS: i64 = 24;

/// Lock file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Who holds the lock (user or command name)
    pub holder: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create new lock info for the current process
    pub fn new(holder: impl Into<String>) -> Self {
        LockInfo {
            holder: holder.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
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

/// File lock guard that releases the lock when dropped.
///
/// Uses both:
/// 1. OS-level file locking (via fs2) for process safety
/// 2. a `.lock` file with metadata so a refused caller can see who holds it
#[derive(Debug)]
pub struct FileLock {
    store_path: PathBuf,
    lock_path: PathBuf,
    /// Keeps the OS lock alive
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a store file.
    ///
    /// The store file itself need not exist yet.
    ///
    /// # Returns
    ///
    /// * `Ok(FileLock)` - Lock acquired
    /// * `Err(DeckError::FileLocked)` - Another live process holds the lock
    pub fn acquire(path: &Path, holder: impl Into<String>) -> DeckResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(holder);

        if let Some(existing) = read_lock_info(&lock_path) {
            if !is_lock_stale(&existing) {
                return Err(DeckError::file_locked(
                    path.display().to_string(),
                    format!("{} ({}, pid {})", existing.holder, existing.machine, existing.pid),
                    existing.locked_at.to_rfc3339(),
                ));
            }
            log::warn!(
                "taking over stale lock on {} held by {}",
                path.display(),
                existing.holder
            );
        }

        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                DeckError::file_error("create directory", parent.display().to_string(), e.to_string())
            })?;
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| DeckError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        // Non-blocking
        lock_file.try_lock_exclusive().map_err(|_| {
            DeckError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(|e| DeckError::serialization(e.to_string()))?;
        lock_file
            .write_all(lock_json.as_bytes())
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| DeckError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        log::debug!("acquired lock {}", lock_path.display());
        Ok(FileLock {
            store_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Check if a store is locked without acquiring the lock.
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path)).filter(|info| !is_lock_stale(info))
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // OS lock goes with the handle
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn lock_path_for(store_path: &Path) -> PathBuf {
    sibling_with_suffix(store_path, "lock")
}

/// `reference.json` -> `reference.json.<suffix>`
fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut sibling = path.to_path_buf();
    let extension = sibling
        .extension()
        .map(|e| format!("{}.{}", e.to_string_lossy(), suffix))
        .unwrap_or_else(|| suffix.to_string());
    sibling.set_extension(extension);
    sibling
}

fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// A lock is stale when its process is gone or it is more than a day old
fn is_lock_stale(info: &LockInfo) -> bool {
    if hostname().is_some_and(|machine| machine == info.machine) {
        #[cfg(unix)]
        {
            if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                return true;
            }
        }
    }

    (Utc::now() - info.locked_at).num_hours() > STALE_LOCK_HOURS
}

/// Save the store with atomic write semantics.
///
/// The save process:
/// 1. Serialize the store to pretty JSON
/// 2. Write to a temporary file (`.tmp`) next to the target
/// 3. Sync to disk
/// 4. Rename over the target
pub fn save_store(store: &ReferenceStore, path: &Path) -> DeckResult<()> {
    let json = serde_json::to_string_pretty(store).map_err(|e| DeckError::serialization(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            DeckError::file_error("create directory", parent.display().to_string(), e.to_string())
        })?;
    }

    let tmp_path = sibling_with_suffix(path, "tmp");
    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        DeckError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;
    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        DeckError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;
    tmp_file.sync_all().map_err(|e| {
        DeckError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        DeckError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    log::debug!(
        "saved {} location(s) and {} material(s) to {}",
        store.locations.len(),
        store.materials.len(),
        path.display()
    );
    Ok(())
}

/// Load a store from a file.
///
/// # Returns
///
/// * `Err(DeckError::VersionMismatch)` - File schema is incompatible
/// * `Err(DeckError::SerializationError)` - Invalid JSON
/// * `Err(DeckError::FileError)` - I/O error
pub fn load_store(path: &Path) -> DeckResult<ReferenceStore> {
    let contents = fs::read_to_string(path)
        .map_err(|e| DeckError::file_error("read", path.display().to_string(), e.to_string()))?;

    let mut store: ReferenceStore = serde_json::from_str(&contents)
        .map_err(|e| DeckError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;

    validate_version(&store.meta.version)?;
    store.normalize();
    Ok(store)
}

/// Load a store, or start an empty one if the file does not exist yet.
pub fn load_or_default(path: &Path) -> DeckResult<ReferenceStore> {
    if path.exists() {
        load_store(path)
    } else {
        log::info!("no reference store at {}, starting empty", path.display());
        Ok(ReferenceStore::new())
    }
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> DeckResult<()> {
    let mismatch = || DeckError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: STORE_SCHEMA_VERSION.to_string(),
    };
    let parse = |version: &str| -> Vec<u32> { version.split('.').filter_map(|p| p.parse().ok()).collect() };

    let file_parts = parse(file_version);
    let current_parts = parse(STORE_SCHEMA_VERSION);

    let (Some(file_major), Some(current_major)) = (file_parts.first(), current_parts.first()) else {
        return Err(mismatch());
    };
    if file_major != current_major {
        return Err(mismatch());
    }

    // 0.x: a newer minor may carry breaking changes
    if *current_major == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{ClimateData, MaterialCategory};

    #[test]
    fn test_lock_path_generation() {
        let lock_path = lock_path_for(Path::new("/srv/deckwise/reference.json"));
        assert_eq!(lock_path, Path::new("/srv/deckwise/reference.json.lock"));
        assert_eq!(lock_path_for(Path::new("store")), Path::new("store.lock"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reference.json");

        let mut store = ReferenceStore::new();
        store.upsert_location("Kerala", "Idukki", ClimateData::default());
        store.upsert_material(MaterialCategory::DeckConcrete, "M30");
        save_store(&store, &path).unwrap();

        let loaded = load_store(&path).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_atomic_save_leaves_no_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("reference.json");

        save_store(&ReferenceStore::new(), &path).unwrap();
        assert!(path.exists());
        assert!(!sibling_with_suffix(&path, "tmp").exists());
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = load_or_default(&dir.path().join("absent.json")).unwrap();
        assert!(store.locations.is_empty());
        assert!(load_store(&dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reference.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(load_store(&path).unwrap_err().error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_newer_schema_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reference.json");
        let mut store = ReferenceStore::new();
        store.meta.version = "0.9.0".to_string();
        save_store(&store, &path).unwrap();
        assert_eq!(load_store(&path).unwrap_err().error_code(), "VERSION_MISMATCH");
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(STORE_SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.3").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reference.json");

        let lock = FileLock::acquire(&path, "ingest-locations").unwrap();
        assert_eq!(lock.info.holder, "ingest-locations");
        assert_eq!(lock.store_path(), path.as_path());

        let lock_path = lock_path_for(&path);
        assert!(lock_path.exists());

        drop(lock);
        assert!(!lock_path.exists());
        assert!(FileLock::check(&path).is_none());
    }

    #[test]
    fn test_second_lock_refused_while_held() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reference.json");

        let _held = FileLock::acquire(&path, "first").unwrap();
        let err = FileLock::acquire(&path, "second").unwrap_err();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_old_lock_is_stale() {
        let mut info = LockInfo::new("someone");
        info.machine = "elsewhere".to_string();
        assert!(!is_lock_stale(&info));
        info.locked_at = Utc::now() - chrono::Duration::hours(STALE_LOCK_HOURS + 1);
        assert!(is_lock_stale(&info));
    }
}
