//! # Registration Markers
//!
//! A registration marker records that this visitor already completed the
//! lead form for a region. It is the only state that outlives a visit and
//! is keyed purely by region code, never by contact identity.
//!
//! The store is a flat string key→value namespace. A marker is the key
//! `healingbuds_registered_<code>` holding the value `"true"`; any other
//! value (or absence) reads as not registered. There is no expiry and no
//! schema version.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hb_core::RegionCode;
use parking_lot::{Mutex, RwLock};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Key prefix shared by every marker.
pub const MARKER_KEY_PREFIX: &str = "healingbuds_registered_";

/// The only value that reads as registered.
pub const MARKER_VALUE: &str = "true";

/// Storage key for a region's marker.
pub fn marker_key(region: &RegionCode) -> String {
    format!("{MARKER_KEY_PREFIX}{}", region.as_str())
}

/// Errors from a persistent marker store.
#[derive(Error, Debug)]
pub enum MarkerStoreError {
    /// The backing file could not be read or written.
    #[error("marker store I/O error at {path}: {source}")]
    Io {
        /// Path of the marker file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The backing file exists but is not a JSON string map.
    #[error("marker file {path} is corrupt: {source}")]
    Corrupt {
        /// Path of the marker file.
        path: PathBuf,
        /// The underlying parse error.
        source: serde_json::Error,
    },
}

/// Key-value port for registration markers.
///
/// Reads and writes are synchronous. Implementations are shared behind an
/// `Arc` between successive gates, so all methods take `&self`.
pub trait RegistrationMarkerStore: Send + Sync {
    /// Whether the region carries a marker.
    fn get(&self, region: &RegionCode) -> Result<bool, MarkerStoreError>;

    /// Set or clear the marker for a region.
    fn set(&self, region: &RegionCode, registered: bool) -> Result<(), MarkerStoreError>;

    /// Every region currently marked, in key order.
    fn registered_regions(&self) -> Result<Vec<RegionCode>, MarkerStoreError>;
}

fn apply(entries: &mut BTreeMap<String, String>, region: &RegionCode, registered: bool) {
    let key = marker_key(region);
    if registered {
        entries.insert(key, MARKER_VALUE.to_string());
    } else {
        entries.remove(&key);
    }
}

fn marked(entries: &BTreeMap<String, String>) -> Vec<RegionCode> {
    entries
        .iter()
        .filter(|(_, v)| v.as_str() == MARKER_VALUE)
        .filter_map(|(k, _)| {
            let suffix = k.strip_prefix(MARKER_KEY_PREFIX)?;
            match RegionCode::new(suffix) {
                Ok(code) => Some(code),
                Err(e) => {
                    tracing::warn!(key = %k, error = %e, "ignoring marker with invalid region code");
                    None
                }
            }
        })
        .collect()
}

// ── In-Memory Store ──────────────────────────────────────────────────

/// Process-local marker store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarkerStore {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl InMemoryMarkerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a raw key. Lets tests seed values other than `"true"`.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().insert(key.into(), value.into());
    }
}

impl RegistrationMarkerStore for InMemoryMarkerStore {
    fn get(&self, region: &RegionCode) -> Result<bool, MarkerStoreError> {
        Ok(self
            .entries
            .read()
            .get(&marker_key(region))
            .is_some_and(|v| v == MARKER_VALUE))
    }

    fn set(&self, region: &RegionCode, registered: bool) -> Result<(), MarkerStoreError> {
        apply(&mut self.entries.write(), region, registered);
        Ok(())
    }

    fn registered_regions(&self) -> Result<Vec<RegionCode>, MarkerStoreError> {
        Ok(marked(&self.entries.read()))
    }
}

// ── File-Backed Store ────────────────────────────────────────────────

/// Marker store persisted as a flat JSON object in a single file.
///
/// A missing file reads as empty. The whole map is rewritten on each
/// `set` through a temporary file renamed over the old one; the mutex
/// serialises read-modify-write within the process.
#[derive(Debug)]
pub struct FileMarkerStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileMarkerStore {
    /// Open a store at `path`. The file is created lazily on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, MarkerStoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(MarkerStoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| MarkerStoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn store(&self, entries: &BTreeMap<String, String>) -> Result<(), MarkerStoreError> {
        let io_err = |source| MarkerStoreError::Io {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent).map_err(io_err)?;
                parent
            }
            None => Path::new("."),
        };
        let json = serde_json::to_string_pretty(entries).map_err(|source| {
            MarkerStoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        // Readers see the old map or the new one, never a partial write.
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

impl RegistrationMarkerStore for FileMarkerStore {
    fn get(&self, region: &RegionCode) -> Result<bool, MarkerStoreError> {
        let _guard = self.lock.lock();
        Ok(self
            .load()?
            .get(&marker_key(region))
            .is_some_and(|v| v == MARKER_VALUE))
    }

    fn set(&self, region: &RegionCode, registered: bool) -> Result<(), MarkerStoreError> {
        let _guard = self.lock.lock();
        let mut entries = self.load()?;
        apply(&mut entries, region, registered);
        self.store(&entries)?;
        tracing::debug!(region = %region, registered, path = %self.path.display(), "marker written");
        Ok(())
    }

    fn registered_regions(&self) -> Result<Vec<RegionCode>, MarkerStoreError> {
        let _guard = self.lock.lock();
        Ok(marked(&self.load()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> RegionCode {
        RegionCode::new(s).unwrap()
    }

    #[test]
    fn key_format() {
        assert_eq!(marker_key(&code("GB")), "healingbuds_registered_gb");
    }

    #[test]
    fn in_memory_set_get_clear() {
        let store = InMemoryMarkerStore::new();
        assert!(!store.get(&code("gb")).unwrap());
        store.set(&code("gb"), true).unwrap();
        assert!(store.get(&code("gb")).unwrap());
        assert!(!store.get(&code("pt")).unwrap());
        store.set(&code("gb"), false).unwrap();
        assert!(!store.get(&code("gb")).unwrap());
    }

    #[test]
    fn only_literal_true_counts() {
        let store = InMemoryMarkerStore::new();
        store.insert_raw("healingbuds_registered_gb", "yes");
        store.insert_raw("healingbuds_registered_pt", "true");
        assert!(!store.get(&code("gb")).unwrap());
        assert!(store.get(&code("pt")).unwrap());
        assert_eq!(store.registered_regions().unwrap(), vec![code("pt")]);
    }

    #[test]
    fn clones_share_entries() {
        let a = InMemoryMarkerStore::new();
        let b = a.clone();
        a.set(&code("th"), true).unwrap();
        assert!(b.get(&code("th")).unwrap());
    }

    #[test]
    fn registered_regions_skips_foreign_keys() {
        let store = InMemoryMarkerStore::new();
        store.insert_raw("theme", "true");
        store.insert_raw("healingbuds_registered_!!", "true");
        store.set(&code("gb"), true).unwrap();
        assert_eq!(store.registered_regions().unwrap(), vec![code("gb")]);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("markers.json");

        let first = FileMarkerStore::new(&path);
        assert!(!first.get(&code("gb")).unwrap());
        first.set(&code("gb"), true).unwrap();

        let second = FileMarkerStore::new(&path);
        assert!(second.get(&code("gb")).unwrap());
        assert_eq!(second.registered_regions().unwrap(), vec![code("gb")]);

        let raw = std::fs::read_to_string(&path).unwrap();
        let map: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(map.get("healingbuds_registered_gb").map(String::as_str), Some("true"));
    }

    #[test]
    fn file_store_rewrites_leave_only_the_marker_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markers.json");
        let store = FileMarkerStore::new(&path);
        for c in ["gb", "pt", "th"] {
            store.set(&code(c), true).unwrap();
        }
        store.set(&code("pt"), false).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("markers.json")]);
        assert_eq!(store.registered_regions().unwrap(), vec![code("gb"), code("th")]);
    }

    #[test]
    fn file_store_reports_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markers.json");
        std::fs::write(&path, "not json").unwrap();
        let store = FileMarkerStore::new(&path);
        let err = store.get(&code("gb")).unwrap_err();
        assert!(matches!(err, MarkerStoreError::Corrupt { .. }));
    }

    #[test]
    fn file_store_treats_empty_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markers.json");
        std::fs::write(&path, "").unwrap();
        let store = FileMarkerStore::new(&path);
        assert!(store.registered_regions().unwrap().is_empty());
    }
}
