//! Collaborator interfaces around the external preprocessing framework.
//!
//! Fingerprint extraction, experiment planning, integrity verification and
//! the per-configuration preprocessors are pre-existing, opaque components.
//! They are modeled as traits so the sequencing in [`driver`] and
//! [`orchestrator`] can be exercised against fakes; [`external`] provides
//! the subprocess-backed production implementations.

pub mod driver;
pub mod external;
pub mod orchestrator;

use crate::plans::ConfigurationPlan;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Checks that a raw dataset obeys the framework's naming and structure
/// contract.
pub trait IntegrityVerifier {
    fn verify(&self, dataset_dir: &Path, num_processes: usize) -> Result<()>;
}

/// Computes the dataset fingerprint that drives experiment planning.
pub trait FingerprintExtractor {
    fn extract(
        &self,
        dataset_id: u32,
        num_processes: usize,
        overwrite_existing: bool,
        verbose: bool,
    ) -> Result<()>;
}

/// Derives configuration plans from the dataset fingerprint.
pub trait ExperimentPlanner {
    fn plan(&self, dataset_id: u32) -> Result<()>;
}

/// Construction-time switches for a configuration preprocessor.
#[derive(Debug, Clone)]
pub struct PreprocessorOptions {
    pub verbose: bool,
    pub inference: bool,
    /// Extra small-object class channels in the compressed output.
    /// Semantics are owned by the external preprocessor.
    pub add_small_object_classes_in_npz: bool,
    /// Confluent-instance channels in the compressed output.
    pub add_confluent_instances_in_npz: bool,
}

/// One full-dataset (training mode) preprocessing run.
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub dataset_id: u32,
    pub configuration: String,
    pub plans_identifier: String,
    pub num_processes: usize,
}

/// One inference-mode preprocessing run over a single input directory.
#[derive(Debug, Clone)]
pub struct InferenceRun {
    pub dataset_id: u32,
    pub configuration: String,
    pub plans_identifier: String,
    pub num_processes: usize,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// A preprocessor bound to one plan configuration.
pub trait Preprocessor {
    fn run(&self, run: &TrainingRun) -> Result<()>;
    fn run_for_inference(&self, run: &InferenceRun) -> Result<()>;
}

/// Resolves the preprocessor a plan configuration is bound to.
pub trait PreprocessorFactory {
    fn create(
        &self,
        plan: &ConfigurationPlan,
        options: &PreprocessorOptions,
    ) -> Result<Box<dyn Preprocessor>>;
}

/// The set of external collaborators the orchestrator sequences.
pub struct PipelineBackend<'a> {
    pub verifier: &'a dyn IntegrityVerifier,
    pub fingerprint: &'a dyn FingerprintExtractor,
    pub planner: &'a dyn ExperimentPlanner,
    pub preprocessors: &'a dyn PreprocessorFactory,
}
