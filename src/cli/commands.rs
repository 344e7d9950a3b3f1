//! CLI command implementations

use anyhow::Result;
use std::path::PathBuf;

use lesionprep::config::{PathConfig, DEFAULT_NUM_PROCESSES};
use lesionprep::dataset;
use lesionprep::dataset::manifest::DatasetManifest;
use lesionprep::pipeline::external::ExternalPipeline;
use lesionprep::pipeline::orchestrator::{self, PreprocessArgs};
use lesionprep::split;

#[allow(clippy::too_many_arguments)]
pub fn preprocess(
    paths: PathConfig,
    dataset_id: u32,
    check_dataset_integrity: bool,
    num_processes: Option<usize>,
    overwrite_existing_dataset_fingerprint: bool,
    inference: bool,
    output_dir_for_inference: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let external = ExternalPipeline::new(paths.clone());
    let args = PreprocessArgs {
        dataset_id,
        check_integrity: check_dataset_integrity,
        num_processes: num_processes.unwrap_or(*DEFAULT_NUM_PROCESSES),
        overwrite_fingerprint: overwrite_existing_dataset_fingerprint,
        inference,
        output_dir_for_inference,
        verbose,
    };
    orchestrator::preprocess(&paths, &external.backend(), &args)?;

    println!("Preprocessing of dataset {dataset_id} finished.");
    Ok(())
}

pub fn inference_split(paths: PathConfig, dataset_id: u32, split_key: &str) -> Result<()> {
    let dataset_name = dataset::resolve_dataset_name(&paths, dataset_id)?;
    let manifest = DatasetManifest::load(&paths.raw_dataset_json(&dataset_name))?;
    let record = split::load_split(&paths.splits_file(&dataset_name), split_key)?;

    let copied = split::copy_validation_cases(
        &paths.images_tr_dir(&dataset_name),
        &paths.images_ts_dir(&dataset_name),
        &record.val,
        &manifest.file_ending,
    )?;

    println!(
        "Copied {} validation volumes for split {split_key} of {dataset_name}.",
        copied.len()
    );
    Ok(())
}
