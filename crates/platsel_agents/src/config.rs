//! Pipeline configuration.
//!
//! Resolution order: defaults, then an optional TOML or YAML file, then
//! environment variables, then whatever the caller (usually the CLI) sets
//! last.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AgentError, AgentResult};
use crate::model::ModelConfig;

pub const ENV_MODEL: &str = "PLATSEL_MODEL";
pub const ENV_MODEL_FALLBACK: &str = "GOOGLE_CLOUD_MODEL_NAME";
pub const ENV_USE_LOOP: &str = "PLATSEL_USE_LOOP";
pub const ENV_MAX_ITERATIONS: &str = "PLATSEL_MAX_ITERATIONS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Run the linked-epic loop instead of a single evaluation
    pub use_loop: bool,
    /// Upper bound on loop iterations
    pub max_iterations: Option<usize>,
    pub model: ModelConfig,
    /// Where execution logs are written, if anywhere
    pub log_dir: Option<PathBuf>,
}

impl PipelineConfig {
    /// Defaults overlaid with `path` (when given) and the process environment.
    pub fn resolve(path: Option<&Path>) -> AgentResult<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Load a `.toml`, `.yaml` or `.yml` file.
    pub fn load(path: &Path) -> AgentResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| AgentError::config(format!("cannot read {}: {}", path.display(), e)))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let config = match extension.as_str() {
            "toml" => toml::from_str(&content)
                .map_err(|e| AgentError::config(format!("{}: {}", path.display(), e)))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| AgentError::config(format!("{}: {}", path.display(), e)))?,
            other => {
                return Err(AgentError::config(format!(
                    "unsupported config format '{}' for {}",
                    other,
                    path.display()
                )))
            }
        };

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Overlay the process environment.
    pub fn apply_env(&mut self) -> AgentResult<()> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Overlay variables read through `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> AgentResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(model) = non_empty(ENV_MODEL).or_else(|| non_empty(ENV_MODEL_FALLBACK)) {
            self.model.model = model.trim().to_string();
        }

        if let Some(value) = non_empty(ENV_USE_LOOP) {
            self.use_loop = parse_bool(&value)
                .ok_or_else(|| AgentError::config(format!("{} must be a boolean, got '{}'", ENV_USE_LOOP, value)))?;
        }

        if let Some(value) = non_empty(ENV_MAX_ITERATIONS) {
            let limit = value.trim().parse::<usize>().map_err(|_| {
                AgentError::config(format!("{} must be a number, got '{}'", ENV_MAX_ITERATIONS, value))
            })?;
            self.max_iterations = Some(limit);
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
