//! Dataset identity and on-disk layout.

pub mod manifest;

use crate::config::PathConfig;
use crate::error::PipelineError;
use anyhow::{Context, Result};
use std::fs;

/// Folder-name prefix shared by every dataset with the given id, e.g. `Dataset033_`.
fn dataset_prefix(dataset_id: u32) -> String {
    format!("Dataset{dataset_id:03}_")
}

/// Resolve a numeric dataset id to its canonical folder name
/// (`Dataset{id:03}_<Suffix>`).
///
/// The raw root is searched first, then the preprocessed root. An id with no
/// matching directory in either root is a fatal error.
pub fn resolve_dataset_name(paths: &PathConfig, dataset_id: u32) -> Result<String> {
    let prefix = dataset_prefix(dataset_id);
    let searched = vec![paths.raw_root.clone(), paths.preprocessed_root.clone()];

    for root in &searched {
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            // A missing root just means the dataset cannot be there.
            Err(_) => continue,
        };
        for entry in entries {
            let entry =
                entry.with_context(|| format!("failed to list {}", root.display()))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(&prefix) && entry.path().is_dir() {
                return Ok(name);
            }
        }
    }

    Err(PipelineError::DatasetNotFound {
        id: dataset_id,
        searched,
    }
    .into())
}
