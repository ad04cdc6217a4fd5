//! Provider profile: the configured (credential-free) description of which model to call.

use crate::error::ApiError;
use crate::provider::{CompletionOptions, ModelProvider};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Groq,
    #[serde(rename = "openai")]
    OpenAI,
    Ollama,
}

impl ProviderType {
    /// Environment variable holding the credential, if the provider needs one.
    pub fn default_api_key_env(self) -> Option<&'static str> {
        match self {
            ProviderType::Groq => Some("GROQ_API_KEY"),
            ProviderType::OpenAI => Some("OPENAI_API_KEY"),
            ProviderType::Ollama => None,
        }
    }

    pub fn requires_credential(self) -> bool {
        !matches!(self, ProviderType::Ollama)
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderType::Groq => "groq",
            ProviderType::OpenAI => "openai",
            ProviderType::Ollama => "ollama",
        };
        f.write_str(name)
    }
}

/// Provider section of the configuration. Holds no secrets; the credential is
/// supplied per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_type")]
    pub provider_type: ProviderType,

    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL override for the provider's API
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Environment variable the CLI reads the credential from
    #[serde(default)]
    pub api_key_env: Option<String>,

    #[serde(default)]
    pub default_options: CompletionOptions,
}

fn default_provider_type() -> ProviderType {
    ProviderType::Groq
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            model: default_model(),
            endpoint: None,
            api_key_env: None,
            default_options: CompletionOptions::default(),
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }

        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!(
                    "Endpoint must start with http:// or https://: {}",
                    endpoint
                ));
            }
        }

        if let Some(temperature) = self.default_options.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(format!(
                    "Temperature must be between 0.0 and 2.0, got {}",
                    temperature
                ));
            }
        }

        if let Some(top_p) = self.default_options.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err(format!("top_p must be between 0.0 and 1.0, got {}", top_p));
            }
        }

        Ok(())
    }

    /// Environment variable consulted for the credential.
    pub fn effective_api_key_env(&self) -> Option<String> {
        self.api_key_env
            .clone()
            .or_else(|| self.provider_type.default_api_key_env().map(str::to_string))
    }

    /// Combine this profile with a run's credential into a resolved provider.
    pub fn to_model_provider(&self, credential: Option<&str>) -> Result<ModelProvider, ApiError> {
        let require_key = || -> Result<String, ApiError> {
            match credential.map(str::trim) {
                Some(key) if !key.is_empty() => Ok(key.to_string()),
                _ => Err(ApiError::MissingCredential(
                    self.effective_api_key_env()
                        .unwrap_or_else(|| "an API key".to_string()),
                )),
            }
        };

        match self.provider_type {
            ProviderType::Groq => Ok(ModelProvider::Groq {
                model: self.model.clone(),
                api_key: require_key()?,
                base_url: self.endpoint.clone(),
            }),
            ProviderType::OpenAI => Ok(ModelProvider::OpenAI {
                model: self.model.clone(),
                api_key: require_key()?,
                base_url: self.endpoint.clone(),
            }),
            ProviderType::Ollama => Ok(ModelProvider::Ollama {
                model: self.model.clone(),
                base_url: self.endpoint.clone(),
            }),
        }
    }
}
