//! Error types for the Eklavya content pipeline.

use thiserror::Error;

/// Failures reaching the language model.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Provider authentication failed: {0}")]
    AuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Provider model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider request failed: {0}")]
    RequestFailed(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

/// What was wrong with a model response that could not be accepted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OutputDefect {
    #[error("response is not valid JSON: {0}")]
    NotJson(String),

    #[error("response is missing required field `{0}`")]
    MissingField(String),

    #[error("response does not match the expected shape: {0}")]
    InvalidShape(String),

    #[error("response violates a content constraint: {0}")]
    Constraint(String),
}

/// The model's raw response could not be turned into the expected record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Model output invalid: {defect}")]
pub struct ModelOutputInvalid {
    /// Raw text exactly as returned by the model.
    pub raw: String,
    pub defect: OutputDefect,
}

impl ModelOutputInvalid {
    pub fn new(raw: impl Into<String>, defect: OutputDefect) -> Self {
        Self {
            raw: raw.into(),
            defect,
        }
    }

    pub fn is_missing_field(&self) -> bool {
        matches!(self.defect, OutputDefect::MissingField(_))
    }
}

/// Error returned by a single agent call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    ModelOutputInvalid(#[from] ModelOutputInvalid),
}

/// Errors outside a pipeline run: configuration, request validation, runtime setup.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing credential: set {0} or pass --api-key")]
    MissingCredential(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}
