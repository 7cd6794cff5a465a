//! JSON snapshot files.
//!
//! The store is exported to `data/snapshot.json` under the data directory
//! and loaded whole at startup. Writes are atomic (write to temp file, then
//! rename).

use crate::errors;
use crate::storage::Snapshot;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const SNAPSHOT_FILE: &str = "data/snapshot.json";

pub fn snapshot_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SNAPSHOT_FILE)
}

/// Read the snapshot from `data_dir`.
///
/// # Errors
///
/// Returns an actionable error if the file is missing, or a parse error
/// with the file path if it is malformed.
pub fn load_snapshot(data_dir: &Path) -> Result<Snapshot> {
    let path = snapshot_path(data_dir);
    if !path.exists() {
        return Err(errors::snapshot_missing(data_dir).into());
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to deserialize snapshot: {}", path.display()))
}

/// Write the snapshot into `data_dir`, creating `data/` if needed.
pub fn save_snapshot(data_dir: &Path, snapshot: &Snapshot) -> Result<()> {
    let path = snapshot_path(data_dir);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create data directory")?;
    }

    let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize data")?;

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, json).context("Failed to write temporary file")?;
    fs::rename(&temp_path, &path).context("Failed to rename temporary file")?;

    Ok(())
}
