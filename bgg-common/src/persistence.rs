//! JSON persistence for basic and detailed record lists
//!
//! Lists are written pretty-printed, ordered by rank ascending with unranked
//! records last. Writes go through a sibling temp file and a rename so an
//! interrupted save never leaves a truncated file behind.

use crate::models::{BasicRecord, DetailedRecord};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Save basic records, ordered by rank
pub fn save_basic_records(records: &[BasicRecord], path: &Path) -> Result<()> {
    let mut ordered: Vec<&BasicRecord> = records.iter().collect();
    ordered.sort_by_key(|r| rank_key(r.rank));
    write_json(&ordered, path)?;
    info!(file = %path.display(), count = records.len(), "Basic records saved");
    Ok(())
}

/// Load basic records previously written by [`save_basic_records`]
pub fn load_basic_records(path: &Path) -> Result<Vec<BasicRecord>> {
    let records: Vec<BasicRecord> = read_json(path)?;
    info!(file = %path.display(), count = records.len(), "Basic records loaded");
    Ok(records)
}

/// Save detailed records, ordered by rank
pub fn save_detailed_records(records: &[DetailedRecord], path: &Path) -> Result<()> {
    let mut ordered: Vec<&DetailedRecord> = records.iter().collect();
    ordered.sort_by_key(|r| rank_key(r.rank));
    write_json(&ordered, path)?;
    info!(file = %path.display(), count = records.len(), "Detailed records saved");
    Ok(())
}

/// Load detailed records previously written by [`save_detailed_records`]
pub fn load_detailed_records(path: &Path) -> Result<Vec<DetailedRecord>> {
    let records: Vec<DetailedRecord> = read_json(path)?;
    info!(file = %path.display(), count = records.len(), "Detailed records loaded");
    Ok(records)
}

/// Checkpoint file name for an output file: `TopGames.json` → `TopGames_progress_300.json`
pub fn progress_file_name(output: &Path, processed: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let file_name = match output.extension() {
        Some(ext) => format!("{}_progress_{}.{}", stem, processed, ext.to_string_lossy()),
        None => format!("{}_progress_{}", stem, processed),
    };
    output.with_file_name(file_name)
}

// Unranked sorts after every ranked record; sort_by_key is stable
fn rank_key(rank: Option<u32>) -> (bool, u32) {
    match rank {
        Some(r) => (false, r),
        None => (true, 0),
    }
}

fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::NotFound(format!("File not found: {}", path.display())));
    }
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
