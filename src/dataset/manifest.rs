//! `dataset.json` manifest handling.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Image and label files belonging to one training case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseFiles {
    pub images: Vec<PathBuf>,
    pub label: PathBuf,
}

/// The user-provided `dataset.json` describing a raw dataset.
///
/// Only the fields this crate consumes are modeled; everything else is
/// carried opaquely in `extra` so round-tripping does not lose information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub file_ending: String,
    #[serde(default)]
    pub channel_names: BTreeMap<String, String>,
    #[serde(default)]
    pub labels: BTreeMap<String, serde_json::Value>,
    #[serde(rename = "numTraining", default)]
    pub num_training: Option<u32>,
    /// Optional explicit case map; paths are relative to the dataset folder.
    #[serde(default)]
    pub dataset: Option<BTreeMap<String, CaseFiles>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DatasetManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid dataset manifest {}", path.display()))
    }

    /// Enumerate the training cases with absolute file paths.
    ///
    /// Uses the manifest's explicit `dataset` map when present; otherwise
    /// derives case ids from the label files in `labelsTr` and collects the
    /// matching channel images from `imagesTr`.
    pub fn training_cases(&self, dataset_dir: &Path) -> Result<BTreeMap<String, CaseFiles>> {
        if let Some(map) = &self.dataset {
            return Ok(map
                .iter()
                .map(|(case_id, files)| {
                    (
                        case_id.clone(),
                        CaseFiles {
                            images: files
                                .images
                                .iter()
                                .map(|p| absolutize(dataset_dir, p))
                                .collect(),
                            label: absolutize(dataset_dir, &files.label),
                        },
                    )
                })
                .collect());
        }

        let labels_dir = dataset_dir.join("labelsTr");
        let images_dir = dataset_dir.join("imagesTr");
        let mut cases = BTreeMap::new();

        let entries = fs::read_dir(&labels_dir)
            .with_context(|| format!("failed to list {}", labels_dir.display()))?;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(case_id) = name.strip_suffix(&self.file_ending) else {
                continue;
            };
            let images = list_channel_images(&images_dir, case_id, &self.file_ending)?;
            cases.insert(
                case_id.to_string(),
                CaseFiles {
                    images,
                    label: entry.path(),
                },
            );
        }
        Ok(cases)
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Collect the `<case>_NNNN<ending>` channel files of one case, sorted by channel.
fn list_channel_images(
    images_dir: &Path,
    case_id: &str,
    file_ending: &str,
) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    if let Ok(entries) = fs::read_dir(images_dir) {
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if case_id_of(&name, file_ending) == Some(case_id) {
                images.push(entry.path());
            }
        }
    }
    images.sort();
    Ok(images)
}

/// Extract the case id from an image or label filename.
///
/// Strips the dataset's file ending and, when present, the four-digit
/// `_NNNN` channel suffix: `case02_0000.nii.gz` and `case02.nii.gz` both
/// yield `case02`. Filenames without the ending yield `None`.
pub fn case_id_of<'a>(file_name: &'a str, file_ending: &str) -> Option<&'a str> {
    let stem = file_name.strip_suffix(file_ending)?;
    if let Some((case_id, channel)) = stem.rsplit_once('_') {
        if channel.len() == 4 && channel.bytes().all(|b| b.is_ascii_digit()) {
            return Some(case_id);
        }
    }
    Some(stem)
}

#[cfg(test)]
mod tests {
    use super::case_id_of;

    #[test]
    fn strips_channel_suffix_and_ending() {
        assert_eq!(case_id_of("case02_0000.nii.gz", ".nii.gz"), Some("case02"));
        assert_eq!(case_id_of("case02.nii.gz", ".nii.gz"), Some("case02"));
    }

    #[test]
    fn keeps_underscores_that_are_not_channels() {
        assert_eq!(case_id_of("ms_spine_01.nii.gz", ".nii.gz"), Some("ms_spine_01"));
        assert_eq!(case_id_of("case_12345.nii.gz", ".nii.gz"), Some("case_12345"));
    }

    #[test]
    fn rejects_other_endings() {
        assert_eq!(case_id_of("case02_0000.mha", ".nii.gz"), None);
    }
}
