//! Preprocessing orchestration for nnU-Net-style lesion segmentation datasets.
//!
//! The heavy lifting (dataset fingerprinting, experiment planning, the
//! resampling/normalization preprocessing itself) lives in an external
//! framework. This crate only sequences it: verify a raw dataset's layout,
//! extract its fingerprint, plan the experiment, run the configured
//! preprocessors, and cache the ground-truth labels next to the preprocessed
//! data. A second entry point copies a precomputed validation split out of a
//! training image directory.
//!
//! ## Main Components
//!
//! - `config`: explicit raw/preprocessed root configuration
//! - `dataset`: dataset id resolution and `dataset.json` handling
//! - `plans`: the plans file produced by the experiment planner
//! - `pipeline`: collaborator traits, the preprocessing driver and the
//!   top-level orchestrator
//! - `split`: validation-split extraction from `splits_final.json`

pub mod config;
pub mod dataset;
pub mod error;
pub mod pipeline;
pub mod plans;
pub mod split;

pub use config::PathConfig;
pub use error::PipelineError;
