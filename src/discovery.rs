//! Locating the run exports that belong to an experiment.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use globset::Glob;
use log::warn;

use crate::cache::Fingerprint;
use crate::error::{FoldError, Result};

/// Files directly inside `data_dir` whose name matches
/// `{prefix}{experiment}_*`, sorted by path. A missing `data_dir` holds no
/// files.
pub fn experiment_files(data_dir: &Path, prefix: &str, experiment: &str) -> Result<Vec<PathBuf>> {
    let matcher = Glob::new(&format!("{prefix}{experiment}_*"))?.compile_matcher();

    let Some(entries) = read_dir_if_exists(data_dir)? else {
        warn!("data directory {} does not exist", data_dir.display());
        return Ok(Vec::new());
    };
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FoldError::io(data_dir, e))?;
        let path = entry.path();
        if path.is_file() && matcher.is_match(entry.file_name()) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Newest modification time among the files directly inside `dir`, as a
/// cache fingerprint. An empty or missing directory gives `Fingerprint(0)`.
pub fn directory_fingerprint(dir: &Path) -> Result<Fingerprint> {
    let mut newest = 0u64;
    let Some(entries) = read_dir_if_exists(dir)? else {
        return Ok(Fingerprint(0));
    };
    for entry in entries {
        let entry = entry.map_err(|e| FoldError::io(dir, e))?;
        let path = entry.path();
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .map_err(|e| FoldError::io(&path, e))?;
        let millis = modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        newest = newest.max(millis);
    }
    Ok(Fingerprint(newest))
}

fn read_dir_if_exists(dir: &Path) -> Result<Option<fs::ReadDir>> {
    match fs::read_dir(dir) {
        Ok(entries) => Ok(Some(entries)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(FoldError::io(dir, e)),
    }
}
