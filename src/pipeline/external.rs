//! Subprocess-backed collaborator implementations.
//!
//! The production pipeline lives in the external framework's console tools.
//! Every trait method spawns the matching command with the dataset roots
//! exported into the child environment, waits for it, and turns a non-zero
//! exit status into a fatal error. Stdout/stderr are inherited so the
//! framework's own progress reporting stays visible. No retries, timeouts
//! or output parsing.

use super::{
    ExperimentPlanner, FingerprintExtractor, InferenceRun, IntegrityVerifier, PipelineBackend,
    Preprocessor, PreprocessorFactory, PreprocessorOptions, TrainingRun,
};
use crate::config::PathConfig;
use crate::error::PipelineError;
use crate::plans::ConfigurationPlan;
use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Console command names of the external framework.
#[derive(Debug, Clone)]
pub struct ExternalTools {
    pub verify: String,
    pub fingerprint: String,
    pub plan: String,
    pub preprocess: String,
}

impl Default for ExternalTools {
    fn default() -> Self {
        Self {
            verify: "nnUNetv2_verify_dataset_integrity".to_string(),
            fingerprint: "nnUNetv2_extract_fingerprint".to_string(),
            plan: "nnUNetv2_plan_experiment".to_string(),
            preprocess: "nnUNetv2_preprocess".to_string(),
        }
    }
}

/// Glue to the external framework's console tools.
pub struct ExternalPipeline {
    paths: PathConfig,
    tools: ExternalTools,
}

impl ExternalPipeline {
    pub fn new(paths: PathConfig) -> Self {
        Self {
            paths,
            tools: ExternalTools::default(),
        }
    }

    pub fn with_tools(paths: PathConfig, tools: ExternalTools) -> Self {
        Self { paths, tools }
    }

    /// Bundle this pipeline up as the orchestrator's collaborator set.
    pub fn backend(&self) -> PipelineBackend<'_> {
        PipelineBackend {
            verifier: self,
            fingerprint: self,
            planner: self,
            preprocessors: self,
        }
    }

    fn command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        // The framework still reads its roots from the environment; the
        // explicit configuration is scoped to the child process.
        cmd.env("nnUNet_raw", &self.paths.raw_root)
            .env("nnUNet_preprocessed", &self.paths.preprocessed_root);
        cmd
    }
}

fn run_command(mut cmd: Command) -> Result<()> {
    let rendered = format!("{cmd:?}");
    debug!("running {rendered}");
    let status = cmd
        .status()
        .with_context(|| format!("failed to spawn {rendered}"))?;
    if !status.success() {
        return Err(PipelineError::ExternalCommandFailed {
            command: rendered,
            status,
        }
        .into());
    }
    Ok(())
}

impl IntegrityVerifier for ExternalPipeline {
    fn verify(&self, dataset_dir: &Path, num_processes: usize) -> Result<()> {
        let mut cmd = self.command(&self.tools.verify);
        cmd.arg(dataset_dir)
            .args(["-np", &num_processes.to_string()]);
        run_command(cmd)
    }
}

impl FingerprintExtractor for ExternalPipeline {
    fn extract(
        &self,
        dataset_id: u32,
        num_processes: usize,
        overwrite_existing: bool,
        verbose: bool,
    ) -> Result<()> {
        let mut cmd = self.command(&self.tools.fingerprint);
        cmd.args(["-d", &dataset_id.to_string()])
            .args(["-np", &num_processes.to_string()]);
        if overwrite_existing {
            cmd.arg("--clean");
        }
        if verbose {
            cmd.arg("--verbose");
        }
        run_command(cmd)
    }
}

impl ExperimentPlanner for ExternalPipeline {
    fn plan(&self, dataset_id: u32) -> Result<()> {
        let mut cmd = self.command(&self.tools.plan);
        cmd.args(["-d", &dataset_id.to_string()]);
        run_command(cmd)
    }
}

impl PreprocessorFactory for ExternalPipeline {
    fn create(
        &self,
        plan: &ConfigurationPlan,
        options: &PreprocessorOptions,
    ) -> Result<Box<dyn Preprocessor>> {
        Ok(Box::new(CommandPreprocessor {
            paths: self.paths.clone(),
            program: self.tools.preprocess.clone(),
            preprocessor_name: plan.preprocessor_name.clone(),
            options: options.clone(),
        }))
    }
}

/// Drives the external preprocessing command for one configuration.
struct CommandPreprocessor {
    paths: PathConfig,
    program: String,
    preprocessor_name: String,
    options: PreprocessorOptions,
}

impl CommandPreprocessor {
    fn base_command(
        &self,
        dataset_id: u32,
        configuration: &str,
        plans_identifier: &str,
        num_processes: usize,
    ) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.env("nnUNet_raw", &self.paths.raw_root)
            .env("nnUNet_preprocessed", &self.paths.preprocessed_root)
            .args(["-d", &dataset_id.to_string()])
            .args(["-c", configuration])
            .args(["-plans_name", plans_identifier])
            .args(["-np", &num_processes.to_string()])
            .args(["-preprocessor_name", &self.preprocessor_name]);
        if self.options.add_small_object_classes_in_npz {
            cmd.arg("--add_small_object_classes_in_npz");
        }
        if self.options.add_confluent_instances_in_npz {
            cmd.arg("--add_confluent_instances_in_npz");
        }
        if self.options.verbose {
            cmd.arg("--verbose");
        }
        cmd
    }
}

impl Preprocessor for CommandPreprocessor {
    fn run(&self, run: &TrainingRun) -> Result<()> {
        run_command(self.base_command(
            run.dataset_id,
            &run.configuration,
            &run.plans_identifier,
            run.num_processes,
        ))
    }

    fn run_for_inference(&self, run: &InferenceRun) -> Result<()> {
        let mut cmd = self.base_command(
            run.dataset_id,
            &run.configuration,
            &run.plans_identifier,
            run.num_processes,
        );
        cmd.arg("--inference")
            .arg("-i")
            .arg(&run.input_dir)
            .arg("-o")
            .arg(&run.output_dir);
        run_command(cmd)
    }
}
