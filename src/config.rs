//! Configuration System
//!
//! Layered configuration for the content pipeline: built-in defaults, the global
//! config file, workspace config files, then `EKLAVYA__SECTION__KEY` environment
//! variables. Credentials are never part of the configuration.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use crate::provider::{ProviderConfig, ProviderType};

mod merge;
mod sources;

pub use sources::global_file::global_config_path;

pub const MIN_MCQ_COUNT: usize = 1;
pub const MAX_MCQ_COUNT: usize = 10;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EklavyaConfig {
    /// Model provider used by both roles
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub review: ReviewConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Number of MCQs every draft must contain
    #[serde(default = "default_mcq_count")]
    pub mcq_count: usize,
}

fn default_mcq_count() -> usize {
    crate::agent::DEFAULT_MCQ_COUNT
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            mcq_count: default_mcq_count(),
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_MCQ_COUNT..=MAX_MCQ_COUNT).contains(&self.mcq_count) {
            return Err(format!(
                "mcq_count must be between {} and {}, got {}",
                MIN_MCQ_COUNT, MAX_MCQ_COUNT, self.mcq_count
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Reject reviewer statuses other than pass/fail instead of treating them as pass
    #[serde(default)]
    pub strict_verdict: bool,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Provider(String),
    Generation(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(msg) => write!(f, "Provider: {}", msg),
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl EklavyaConfig {
    /// Validate the entire configuration, collecting every problem found.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.provider.validate() {
            errors.push(ValidationError::Provider(e));
        }
        if let Err(e) = self.generation.validate() {
            errors.push(ValidationError::Generation(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Render as TOML. Safe to print: the configuration holds no credentials.
    pub fn to_toml_string(&self) -> Result<String, ApiError> {
        toml::to_string_pretty(self).map_err(|e| ApiError::Serialization(e.to_string()))
    }
}

/// Loads [`EklavyaConfig`] from its layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, global config file,
    /// `config/config.toml`, `config/{EKLAVYA_ENV}.toml`, environment.
    pub fn load(workspace_root: &Path) -> Result<EklavyaConfig, ApiError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = builder.add_source(sources::environment());

        let config: EklavyaConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Load from one explicit file, bypassing the global and workspace files.
    /// Environment overrides still apply.
    pub fn load_from_file(path: &Path) -> Result<EklavyaConfig, ApiError> {
        if !path.is_file() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let config: EklavyaConfig = merge::merge_policy::builder_with_defaults()?
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .add_source(sources::environment())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }
}
