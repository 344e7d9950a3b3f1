//! Plans-file model.
//!
//! The experiment planner writes `<plans_identifier>.json` into the
//! preprocessed dataset directory. This crate only needs the set of
//! available configurations and the preprocessor bound to each one; all
//! other plan parameters are carried opaquely for the external framework.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Identifier of the default plans produced by the experiment planner.
pub const DEFAULT_PLANS_IDENTIFIER: &str = "nnUNetPlans";

/// Parameters of a single named configuration (e.g. `2d`, `3d_fullres`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationPlan {
    /// Name of the preprocessor component bound to this configuration.
    #[serde(default = "default_preprocessor_name")]
    pub preprocessor_name: String,
    #[serde(flatten)]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl Default for ConfigurationPlan {
    fn default() -> Self {
        Self {
            preprocessor_name: default_preprocessor_name(),
            params: BTreeMap::new(),
        }
    }
}

fn default_preprocessor_name() -> String {
    "DefaultPreprocessor".to_string()
}

/// A plans file as produced by the experiment planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlansFile {
    pub dataset_name: String,
    pub plans_name: String,
    #[serde(default)]
    pub configurations: BTreeMap<String, ConfigurationPlan>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PlansFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read plans file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid plans file {}", path.display()))
    }

    /// Names of the configurations this plan provides.
    pub fn available_configurations(&self) -> impl Iterator<Item = &str> {
        self.configurations.keys().map(String::as_str)
    }

    pub fn configuration(&self, name: &str) -> Option<&ConfigurationPlan> {
        self.configurations.get(name)
    }
}
