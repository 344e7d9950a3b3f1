//! Path configuration
//!
//! The external framework reads its dataset roots from process-wide
//! environment variables. This crate threads them through every component as
//! explicit values instead and only exports them into the environment of
//! spawned framework commands, so components can be tested in isolation.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default worker count forwarded to the external framework's process pools.
///
/// Honors the framework's own `nnUNet_def_n_proc` override.
pub static DEFAULT_NUM_PROCESSES: Lazy<usize> = Lazy::new(|| {
    std::env::var("nnUNet_def_n_proc")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8)
});

/// Root directories of the raw and preprocessed dataset trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    pub raw_root: PathBuf,
    pub preprocessed_root: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            raw_root: PathBuf::from("nnUNet_raw"),
            preprocessed_root: PathBuf::from("nnUNet_preprocessed"),
        }
    }
}

impl PathConfig {
    pub fn new(raw_root: impl Into<PathBuf>, preprocessed_root: impl Into<PathBuf>) -> Self {
        Self {
            raw_root: raw_root.into(),
            preprocessed_root: preprocessed_root.into(),
        }
    }

    pub fn raw_dataset_dir(&self, dataset_name: &str) -> PathBuf {
        self.raw_root.join(dataset_name)
    }

    pub fn images_tr_dir(&self, dataset_name: &str) -> PathBuf {
        self.raw_dataset_dir(dataset_name).join("imagesTr")
    }

    pub fn labels_tr_dir(&self, dataset_name: &str) -> PathBuf {
        self.raw_dataset_dir(dataset_name).join("labelsTr")
    }

    pub fn images_ts_dir(&self, dataset_name: &str) -> PathBuf {
        self.raw_dataset_dir(dataset_name).join("imagesTs")
    }

    /// The user-provided manifest in the raw tree.
    pub fn raw_dataset_json(&self, dataset_name: &str) -> PathBuf {
        self.raw_dataset_dir(dataset_name).join("dataset.json")
    }

    pub fn preprocessed_dataset_dir(&self, dataset_name: &str) -> PathBuf {
        self.preprocessed_root.join(dataset_name)
    }

    /// The manifest copy the external framework places in the preprocessed tree.
    pub fn preprocessed_dataset_json(&self, dataset_name: &str) -> PathBuf {
        self.preprocessed_dataset_dir(dataset_name).join("dataset.json")
    }

    pub fn fingerprint_file(&self, dataset_name: &str) -> PathBuf {
        self.preprocessed_dataset_dir(dataset_name)
            .join("dataset_fingerprint.json")
    }

    pub fn plans_file(&self, dataset_name: &str, plans_identifier: &str) -> PathBuf {
        self.preprocessed_dataset_dir(dataset_name)
            .join(format!("{plans_identifier}.json"))
    }

    pub fn gt_segmentations_dir(&self, dataset_name: &str) -> PathBuf {
        self.preprocessed_dataset_dir(dataset_name)
            .join("gt_segmentations")
    }

    pub fn splits_file(&self, dataset_name: &str) -> PathBuf {
        self.preprocessed_dataset_dir(dataset_name)
            .join("splits_final.json")
    }
}
