//! Error taxonomy of the orchestration layer.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Fatal errors raised by this crate itself.
///
/// Failures inside the external framework propagate unmodified as plain
/// [`anyhow::Error`]s; nothing here is retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No dataset directory with the `Dataset{id:03}_` prefix exists under
    /// the configured roots.
    #[error("could not find a dataset with id {id} in {searched:?}")]
    DatasetNotFound { id: u32, searched: Vec<PathBuf> },

    /// `num_processes` has neither length 1 nor one entry per configuration.
    #[error(
        "num_processes must either have len 1 or as many elements as there are configurations; \
         number of configurations: {configurations}, length of num_processes: {num_processes}"
    )]
    NumProcessesMismatch {
        configurations: usize,
        num_processes: usize,
    },

    /// A file the external framework should have produced is absent.
    #[error("expected artifact does not exist: {0}")]
    MissingArtifact(PathBuf),

    /// The requested key is not present in the split manifest.
    #[error("split {0:?} not found in split manifest")]
    SplitNotFound(String),

    /// An external framework command exited with a failure status.
    #[error("external command {command} failed: {status}")]
    ExternalCommandFailed { command: String, status: ExitStatus },
}
