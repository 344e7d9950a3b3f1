//! Per-configuration preprocessing driver and ground-truth label cache.

use super::{InferenceRun, PreprocessorFactory, PreprocessorOptions, TrainingRun};
use crate::config::PathConfig;
use crate::dataset::{self, manifest::DatasetManifest};
use crate::error::PipelineError;
use crate::plans::PlansFile;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Which configurations to run, and with how many external worker processes.
#[derive(Debug, Clone)]
pub struct PreprocessRequest {
    pub configurations: Vec<String>,
    pub num_processes: Vec<usize>,
}

impl PreprocessRequest {
    pub fn new(configurations: Vec<String>, num_processes: Vec<usize>) -> Self {
        Self {
            configurations,
            num_processes,
        }
    }

    /// Pair every configuration with its worker count.
    ///
    /// A single worker count broadcasts to all configurations; any other
    /// length mismatch is fatal.
    pub fn normalized(&self) -> Result<Vec<(String, usize)>, PipelineError> {
        let wanted = self.configurations.len();
        let counts = if self.num_processes.len() == 1 {
            vec![self.num_processes[0]; wanted]
        } else {
            self.num_processes.clone()
        };
        if counts.len() != wanted {
            return Err(PipelineError::NumProcessesMismatch {
                configurations: wanted,
                num_processes: self.num_processes.len(),
            });
        }
        Ok(self.configurations.iter().cloned().zip(counts).collect())
    }
}

/// Driver switches beyond the per-configuration request.
#[derive(Debug, Default)]
pub struct DriverOptions {
    pub inference: bool,
    /// Pre-loaded plan; when absent the canonical plans file is read from disk.
    pub plans: Option<PlansFile>,
    pub output_dir_for_inference: Option<PathBuf>,
    pub input_dir: Option<PathBuf>,
    pub verbose: bool,
}

/// Outcome of [`copy_gt_segmentations`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GtCopyStats {
    pub copied: usize,
    pub up_to_date: usize,
}

/// Run the requested configurations of a dataset's plan, in order.
///
/// Configurations absent from the plan are skipped with an informational
/// message. In training mode the ground-truth labels are cached under the
/// preprocessed root afterwards; inference mode runs against a single input
/// directory and never touches the labels.
pub fn preprocess_dataset(
    paths: &PathConfig,
    factory: &dyn PreprocessorFactory,
    dataset_id: u32,
    plans_identifier: &str,
    request: &PreprocessRequest,
    options: &DriverOptions,
) -> Result<()> {
    // Validate the request before anything else runs.
    let pairs = request.normalized()?;

    let dataset_name = dataset::resolve_dataset_name(paths, dataset_id)?;
    info!("preprocessing dataset {dataset_name}");

    let plans = match &options.plans {
        Some(plans) => plans.clone(),
        None => PlansFile::load(&paths.plans_file(&dataset_name, plans_identifier))?,
    };

    let preprocessor_options = PreprocessorOptions {
        verbose: options.verbose,
        inference: options.inference,
        add_small_object_classes_in_npz: true,
        add_confluent_instances_in_npz: true,
    };

    for (configuration, num_processes) in pairs {
        info!("configuration: {configuration}");
        let Some(plan) = plans.configuration(&configuration) else {
            let available: Vec<&str> = plans.available_configurations().collect();
            info!(
                "configuration {configuration} not found in plans file {plans_identifier}.json \
                 of dataset {dataset_name} (available: {available:?}), skipping"
            );
            continue;
        };

        let preprocessor = factory.create(plan, &preprocessor_options)?;
        if options.inference {
            let input_dir = options.input_dir.clone().unwrap_or_else(|| {
                let default = paths.images_ts_dir(&dataset_name);
                info!(
                    "no input directory given for inference, defaulting to {}",
                    default.display()
                );
                default
            });
            let output_dir = options.output_dir_for_inference.clone().unwrap_or_else(|| {
                paths
                    .preprocessed_dataset_dir(&dataset_name)
                    .join(&configuration)
            });
            preprocessor.run_for_inference(&InferenceRun {
                dataset_id,
                configuration: configuration.clone(),
                plans_identifier: plans_identifier.to_string(),
                num_processes,
                input_dir,
                output_dir,
            })?;
        } else {
            preprocessor.run(&TrainingRun {
                dataset_id,
                configuration: configuration.clone(),
                plans_identifier: plans_identifier.to_string(),
                num_processes,
            })?;
        }
    }

    if !options.inference {
        copy_gt_segmentations(paths, &dataset_name)?;
    }
    Ok(())
}

/// Cache every training label under `gt_segmentations/` in the preprocessed
/// tree, so validation can still run once the raw data is gone (compute
/// clusters often only keep the preprocessed data around).
///
/// A label is recopied only when the source file is newer than the cached
/// copy, so re-runs with unchanged sources are no-ops.
pub fn copy_gt_segmentations(paths: &PathConfig, dataset_name: &str) -> Result<GtCopyStats> {
    let gt_dir = paths.gt_segmentations_dir(dataset_name);
    fs::create_dir_all(&gt_dir)
        .with_context(|| format!("failed to create {}", gt_dir.display()))?;

    let manifest = DatasetManifest::load(&paths.raw_dataset_json(dataset_name))?;
    let cases = manifest.training_cases(&paths.raw_dataset_dir(dataset_name))?;

    let bar = ProgressBar::new(cases.len() as u64);
    let mut stats = GtCopyStats::default();
    for (case_id, files) in &cases {
        let cached = gt_dir.join(format!("{case_id}{}", manifest.file_ending));
        if copy_if_newer(&files.label, &cached)? {
            stats.copied += 1;
        } else {
            stats.up_to_date += 1;
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    info!(
        "ground-truth cache: {} copied, {} already up to date",
        stats.copied, stats.up_to_date
    );
    Ok(stats)
}

/// Copy `src` to `dst` unless an up-to-date copy is already present.
fn copy_if_newer(src: &Path, dst: &Path) -> Result<bool> {
    let src_meta = fs::metadata(src)
        .with_context(|| format!("failed to stat {}", src.display()))?;
    if let Ok(dst_meta) = fs::metadata(dst) {
        if let (Ok(src_mtime), Ok(dst_mtime)) = (src_meta.modified(), dst_meta.modified()) {
            if src_mtime <= dst_mtime {
                return Ok(false);
            }
        }
    }
    fs::copy(src, dst)
        .with_context(|| format!("failed to copy {} to {}", src.display(), dst.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_num_processes_broadcasts() {
        let request = PreprocessRequest::new(
            vec!["2d".into(), "3d_fullres".into(), "3d_lowres".into()],
            vec![4],
        );
        let pairs = request.normalized().unwrap();
        assert_eq!(pairs.len(), 3);
        assert!(pairs.iter().all(|(_, n)| *n == 4));
    }

    #[test]
    fn matching_lengths_pass_through() {
        let request =
            PreprocessRequest::new(vec!["2d".into(), "3d_fullres".into()], vec![8, 4]);
        let pairs = request.normalized().unwrap();
        assert_eq!(pairs, vec![("2d".to_string(), 8), ("3d_fullres".to_string(), 4)]);
    }

    #[test]
    fn mismatched_lengths_are_fatal() {
        let request = PreprocessRequest::new(
            vec!["2d".into(), "3d_fullres".into(), "3d_lowres".into()],
            vec![8, 4],
        );
        let err = request.normalized().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::NumProcessesMismatch {
                configurations: 3,
                num_processes: 2
            }
        ));
    }

    #[test]
    fn copy_if_newer_skips_fresh_copies() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src.nii.gz");
        let dst = tmp.path().join("dst.nii.gz");
        fs::write(&src, b"label").unwrap();

        assert!(copy_if_newer(&src, &dst).unwrap());
        assert!(!copy_if_newer(&src, &dst).unwrap());
        assert_eq!(fs::read(&dst).unwrap(), b"label");
    }
}
