//! Persisting folded datasets between runs.
//!
//! The pipeline never decides on its own when a cached dataset is out of
//! date: the caller computes a [`Fingerprint`] of the source data (for
//! example with [`crate::discovery::directory_fingerprint`]) and the cache
//! compares it with the one stored next to the dataset.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dataset::tensor::MeanDataset;
use crate::error::{FoldError, Result};

/// Opaque summary of the source data a dataset was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub u64);

/// Storage for folded datasets, keyed by experiment name.
pub trait DatasetCache {
    fn load(&self, key: &str) -> Result<Option<MeanDataset>>;

    /// Store `dataset` together with the fingerprint of its source data.
    fn store(&mut self, key: &str, dataset: &MeanDataset, fingerprint: Fingerprint) -> Result<()>;

    /// Whether the entry for `key` is missing or was built from other data.
    fn is_stale(&self, key: &str, fingerprint: Fingerprint) -> Result<bool>;
}

// ---------------------------------------------------------------------------
// JSON files on disk
// ---------------------------------------------------------------------------

/// One `<key>.json` plus one `<key>.fingerprint.json` per entry.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    dir: PathBuf,
}

impl JsonFileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn dataset_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn fingerprint_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.fingerprint.json"))
    }
}

impl DatasetCache for JsonFileCache {
    fn load(&self, key: &str) -> Result<Option<MeanDataset>> {
        let path = self.dataset_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|e| FoldError::io(&path, e))?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn store(&mut self, key: &str, dataset: &MeanDataset, fingerprint: Fingerprint) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| FoldError::io(&self.dir, e))?;
        let path = self.dataset_path(key);
        fs::write(&path, serde_json::to_vec(dataset)?).map_err(|e| FoldError::io(&path, e))?;
        let path = self.fingerprint_path(key);
        fs::write(&path, serde_json::to_vec(&fingerprint)?).map_err(|e| FoldError::io(&path, e))
    }

    fn is_stale(&self, key: &str, fingerprint: Fingerprint) -> Result<bool> {
        let path = self.fingerprint_path(key);
        if !path.exists() || !self.dataset_path(key).exists() {
            return Ok(true);
        }
        let text = fs::read_to_string(&path).map_err(|e| FoldError::io(&path, e))?;
        let stored: Fingerprint = serde_json::from_str(&text)?;
        Ok(stored != fingerprint)
    }
}

// ---------------------------------------------------------------------------
// In memory
// ---------------------------------------------------------------------------

/// Cache that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: BTreeMap<String, (MeanDataset, Fingerprint)>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DatasetCache for MemoryCache {
    fn load(&self, key: &str) -> Result<Option<MeanDataset>> {
        Ok(self.entries.get(key).map(|(ds, _)| ds.clone()))
    }

    fn store(&mut self, key: &str, dataset: &MeanDataset, fingerprint: Fingerprint) -> Result<()> {
        self.entries
            .insert(key.to_string(), (dataset.clone(), fingerprint));
        Ok(())
    }

    fn is_stale(&self, key: &str, fingerprint: Fingerprint) -> Result<bool> {
        Ok(self.entries.get(key).map_or(true, |(_, fp)| *fp != fingerprint))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::data::model::Axis;

    fn dataset() -> MeanDataset {
        let axes = vec![Axis {
            name: "time".into(),
            values: vec![0.0.into(), 1.0.into()],
        }];
        MeanDataset::new(axes, "time")
    }

    #[test]
    fn json_cache_tracks_fingerprint() {
        let dir = tempdir().expect("tempdir");
        let mut cache = JsonFileCache::new(dir.path().join("cache"));

        assert!(cache.is_stale("exp", Fingerprint(1)).expect("stale"));
        assert_eq!(cache.load("exp").expect("load"), None);

        cache.store("exp", &dataset(), Fingerprint(1)).expect("store");
        assert!(!cache.is_stale("exp", Fingerprint(1)).expect("stale"));
        assert!(cache.is_stale("exp", Fingerprint(2)).expect("stale"));
        assert_eq!(cache.load("exp").expect("load"), Some(dataset()));
    }

    #[test]
    fn corrupt_entry_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let cache = JsonFileCache::new(dir.path());
        fs::write(dir.path().join("exp.json"), "{").expect("write");
        assert!(matches!(cache.load("exp"), Err(FoldError::Json(_))));
    }

    #[test]
    fn memory_cache_behaves_like_disk() {
        let mut cache = MemoryCache::new();
        assert!(cache.is_stale("exp", Fingerprint(7)).expect("stale"));
        cache.store("exp", &dataset(), Fingerprint(7)).expect("store");
        assert!(!cache.is_stale("exp", Fingerprint(7)).expect("stale"));
        assert_eq!(cache.len(), 1);
    }
}
