//! Validation-split extraction.
//!
//! Reads a precomputed cross-validation split manifest and copies the
//! validation volumes of one fold out of a training image directory.

use crate::dataset::manifest::case_id_of;
use crate::error::PipelineError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// One cross-validation fold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitRecord {
    #[serde(default)]
    pub train: Vec<String>,
    pub val: Vec<String>,
}

/// Load one fold from a split manifest.
///
/// The manifest is either a JSON object keyed by split name or a JSON array
/// indexed by fold number; `key` addresses both forms.
pub fn load_split(path: &Path, key: &str) -> Result<SplitRecord> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let manifest: Value = serde_json::from_str(&raw)
        .with_context(|| format!("invalid split manifest {}", path.display()))?;

    let record = match &manifest {
        Value::Object(map) => map.get(key).cloned(),
        Value::Array(folds) => key
            .parse::<usize>()
            .ok()
            .and_then(|index| folds.get(index).cloned()),
        _ => None,
    }
    .ok_or_else(|| PipelineError::SplitNotFound(key.to_string()))?;

    serde_json::from_value(record)
        .with_context(|| format!("malformed split {key:?} in {}", path.display()))
}

/// Copy every volume whose case id is listed in `val_cases` into
/// `output_dir` (created if missing), preserving filenames.
///
/// The case id is extracted from each filename (file ending and channel
/// suffix stripped) and compared for equality. Earlier tooling matched by
/// substring containment, which also selects `case10_0000` when asked for
/// `case1`; exact comparison closes that hole.
pub fn copy_validation_cases(
    images_dir: &Path,
    output_dir: &Path,
    val_cases: &[String],
    file_ending: &str,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let mut entries = fs::read_dir(images_dir)
        .with_context(|| format!("failed to list {}", images_dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("failed to list {}", images_dir.display()))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut copied = Vec::new();
    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(case_id) = case_id_of(&name, file_ending) else {
            continue;
        };
        if val_cases.iter().any(|case| case == case_id) {
            let destination = output_dir.join(&name);
            fs::copy(entry.path(), &destination).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    entry.path().display(),
                    destination.display()
                )
            })?;
            copied.push(destination);
        }
    }

    info!(
        "copied {} validation volumes to {}",
        copied.len(),
        output_dir.display()
    );
    Ok(copied)
}
