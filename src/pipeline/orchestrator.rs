//! Top-level preprocessing sequence.

use super::driver::{preprocess_dataset, DriverOptions, PreprocessRequest};
use super::PipelineBackend;
use crate::config::PathConfig;
use crate::dataset;
use crate::error::PipelineError;
use crate::plans::DEFAULT_PLANS_IDENTIFIER;
use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

/// Arguments of one `preprocess` invocation.
#[derive(Debug, Clone)]
pub struct PreprocessArgs {
    pub dataset_id: u32,
    pub check_integrity: bool,
    pub num_processes: usize,
    pub overwrite_fingerprint: bool,
    pub inference: bool,
    pub output_dir_for_inference: Option<PathBuf>,
    pub verbose: bool,
}

/// Run the full training-mode sequence for one dataset: integrity check,
/// fingerprint, experiment planning, artifact assertions, `3d_fullres`
/// preprocessing and the ground-truth label cache.
///
/// In inference mode everything up to and including the artifact assertions
/// is skipped and the driver runs against the test-image directory.
///
/// Strictly sequential; the first failing step aborts the run and there is
/// no partial-state rollback.
pub fn preprocess(
    paths: &PathConfig,
    backend: &PipelineBackend<'_>,
    args: &PreprocessArgs,
) -> Result<()> {
    let dataset_name = dataset::resolve_dataset_name(paths, args.dataset_id)?;

    if !args.inference {
        if args.check_integrity {
            info!("verifying integrity of dataset {dataset_name}");
            backend
                .verifier
                .verify(&paths.raw_dataset_dir(&dataset_name), args.num_processes)?;
        }

        info!("extracting fingerprint of dataset {dataset_name}");
        backend.fingerprint.extract(
            args.dataset_id,
            args.num_processes,
            args.overwrite_fingerprint,
            args.verbose,
        )?;

        info!("planning experiment for dataset {dataset_name}");
        backend.planner.plan(args.dataset_id)?;

        assert_artifacts(paths, &dataset_name)?;
    }

    let request = PreprocessRequest::new(
        vec!["3d_fullres".to_string()],
        vec![args.num_processes],
    );
    let options = DriverOptions {
        inference: args.inference,
        output_dir_for_inference: args.output_dir_for_inference.clone(),
        verbose: args.verbose,
        ..Default::default()
    };
    preprocess_dataset(
        paths,
        backend.preprocessors,
        args.dataset_id,
        DEFAULT_PLANS_IDENTIFIER,
        &request,
        &options,
    )
}

/// Contract boundary with the external framework: after planning, the
/// preprocessed dataset directory must hold the manifest, the fingerprint
/// and the plan. The first missing path is reported.
fn assert_artifacts(paths: &PathConfig, dataset_name: &str) -> Result<()> {
    let dir = paths.preprocessed_dataset_dir(dataset_name);
    if !dir.is_dir() {
        return Err(PipelineError::MissingArtifact(dir).into());
    }
    for file in [
        paths.preprocessed_dataset_json(dataset_name),
        paths.fingerprint_file(dataset_name),
        paths.plans_file(dataset_name, DEFAULT_PLANS_IDENTIFIER),
    ] {
        if !file.is_file() {
            return Err(PipelineError::MissingArtifact(file).into());
        }
    }
    Ok(())
}
