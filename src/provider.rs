//! Model Provider Abstraction
//!
//! The language model sits behind a single request/response operation. Agents hold
//! an `Arc<dyn ModelProviderClient>` so tests can substitute a scripted client while
//! production runs talk to an OpenAI-compatible chat completions endpoint (Groq,
//! OpenAI) or a local Ollama server.

use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod profile;

pub use profile::{ProviderConfig, ProviderType};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// A fully resolved provider, credential included. Never serialized.
#[derive(Clone, PartialEq)]
pub enum ModelProvider {
    Groq {
        model: String,
        api_key: String,
        base_url: Option<String>,
    },
    OpenAI {
        model: String,
        api_key: String,
        base_url: Option<String>, // For custom endpoints (e.g., Azure OpenAI)
    },
    Ollama {
        model: String,
        base_url: Option<String>, // Default: http://localhost:11434
    },
}

impl std::fmt::Debug for ModelProvider {
    // Credentials stay out of logs and panic messages.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelProvider::Groq {
                model, base_url, ..
            } => f
                .debug_struct("Groq")
                .field("model", model)
                .field("api_key", &"<redacted>")
                .field("base_url", base_url)
                .finish(),
            ModelProvider::OpenAI {
                model, base_url, ..
            } => f
                .debug_struct("OpenAI")
                .field("model", model)
                .field("api_key", &"<redacted>")
                .field("base_url", base_url)
                .finish(),
            ModelProvider::Ollama { model, base_url } => f
                .debug_struct("Ollama")
                .field("model", model)
                .field("base_url", base_url)
                .finish(),
        }
    }
}

/// Chat message role. Every agent call is a single user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    User,
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Completion options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>, // 0.0-2.0, default: 0.7
    pub max_tokens: Option<u32>,  // Maximum tokens to generate
    pub top_p: Option<f32>,       // Nucleus sampling
}

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: Some(DEFAULT_TEMPERATURE),
            max_tokens: None,
            top_p: None,
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: Option<String>,
}

/// Model provider client trait
#[async_trait]
pub trait ModelProviderClient: Send + Sync {
    /// Generate a completion from a list of messages
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, TransportError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;

    /// Get the model name
    fn model_name(&self) -> &str;
}

// OpenAI-compatible API request/response structures
#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    stream: bool,
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

fn role_to_string(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
    }
}

fn to_openai_messages(messages: Vec<ChatMessage>) -> Vec<OpenAIMessage> {
    messages
        .into_iter()
        .map(|msg| OpenAIMessage {
            role: role_to_string(msg.role).to_string(),
            content: msg.content,
        })
        .collect()
}

// Map reqwest transport failures to TransportError
fn map_http_error(error: reqwest::Error) -> TransportError {
    if let Some(status) = error.status() {
        map_status_error(status, &error.to_string())
    } else if error.is_timeout() {
        TransportError::RequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        TransportError::RequestFailed(format!("Connection error: {}", error))
    } else {
        TransportError::Provider(format!("HTTP error: {}", error))
    }
}

fn map_status_error(status: StatusCode, body: &str) -> TransportError {
    match status.as_u16() {
        401 | 403 => TransportError::AuthFailed(format!("Authentication failed: {}", body)),
        429 => TransportError::RateLimit(format!("Rate limit exceeded: {}", body)),
        404 => TransportError::ModelNotFound(format!("Model not found: {}", body)),
        _ => TransportError::RequestFailed(format!(
            "Request failed with status {}: {}",
            status, body
        )),
    }
}

const PROVIDER_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const PROVIDER_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

fn build_provider_http_client() -> Result<Client, TransportError> {
    Client::builder()
        .connect_timeout(PROVIDER_HTTP_CONNECT_TIMEOUT)
        .timeout(PROVIDER_HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| TransportError::Provider(format!("Failed to create HTTP client: {}", e)))
}

async fn post_chat_completion(
    client: &Client,
    url: &str,
    api_key: Option<&str>,
    request: &ChatCompletionRequest,
) -> Result<CompletionResponse, TransportError> {
    let mut builder = client
        .post(url)
        .header("Content-Type", "application/json")
        .json(request);
    if let Some(key) = api_key {
        builder = builder.header("Authorization", format!("Bearer {}", key));
    }

    let response = builder.send().await.map_err(map_http_error)?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(map_status_error(status, &error_text));
    }

    let completion: ChatCompletionResponse = response
        .json()
        .await
        .map_err(|e| TransportError::Provider(format!("Failed to parse response: {}", e)))?;

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| TransportError::Provider("No choices in response".to_string()))?;

    let usage = completion
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    Ok(CompletionResponse {
        content: choice.message.content,
        model: completion.model,
        usage,
        finish_reason: choice.finish_reason,
    })
}

/// Client for hosted OpenAI-compatible chat completions APIs (Groq, OpenAI).
pub struct OpenAICompatibleClient {
    client: Client,
    provider_name: &'static str,
    model: String,
    api_key: String,
    base_url: String,
}

impl OpenAICompatibleClient {
    pub fn groq(model: String, api_key: String, base_url: Option<String>) -> Result<Self, TransportError> {
        Self::new("groq", model, api_key, base_url.unwrap_or_else(|| GROQ_BASE_URL.to_string()))
    }

    pub fn openai(model: String, api_key: String, base_url: Option<String>) -> Result<Self, TransportError> {
        Self::new("openai", model, api_key, base_url.unwrap_or_else(|| OPENAI_BASE_URL.to_string()))
    }

    fn new(
        provider_name: &'static str,
        model: String,
        api_key: String,
        base_url: String,
    ) -> Result<Self, TransportError> {
        let client = build_provider_http_client()?;
        Ok(Self {
            client,
            provider_name,
            model,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ModelProviderClient for OpenAICompatibleClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, TransportError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: to_openai_messages(messages),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            top_p: options.top_p,
            stream: false,
        };

        let url = format!("{}/chat/completions", self.base_url);
        post_chat_completion(&self.client, &url, Some(&self.api_key), &request).await
    }

    fn provider_name(&self) -> &str {
        self.provider_name
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Ollama provider client (local models)
pub struct OllamaClient {
    client: Client,
    model: String,
    base_url: String,
}

impl OllamaClient {
    pub fn new(model: String, base_url: Option<String>) -> Result<Self, TransportError> {
        let base_url = base_url.unwrap_or_else(|| OLLAMA_BASE_URL.to_string());
        let client = build_provider_http_client()?;

        Ok(Self {
            client,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ModelProviderClient for OllamaClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, TransportError> {
        // Ollama serves the OpenAI-compatible format under /v1
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: to_openai_messages(messages),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            top_p: options.top_p,
            stream: false,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        post_chat_completion(&self.client, &url, None, &request).await
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Provider factory for creating provider clients
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_client(
        provider: &ModelProvider,
    ) -> Result<Box<dyn ModelProviderClient>, TransportError> {
        match provider {
            ModelProvider::Groq {
                model,
                api_key,
                base_url,
            } => Ok(Box::new(OpenAICompatibleClient::groq(
                model.clone(),
                api_key.clone(),
                base_url.clone(),
            )?)),
            ModelProvider::OpenAI {
                model,
                api_key,
                base_url,
            } => Ok(Box::new(OpenAICompatibleClient::openai(
                model.clone(),
                api_key.clone(),
                base_url.clone(),
            )?)),
            ModelProvider::Ollama { model, base_url } => Ok(Box::new(OllamaClient::new(
                model.clone(),
                base_url.clone(),
            )?)),
        }
    }
}

// Scripted provider for testing: replays canned results in order and records prompts.
#[cfg(test)]
pub struct MockProvider {
    responses: std::sync::Mutex<std::collections::VecDeque<Result<String, TransportError>>>,
    prompts: std::sync::Mutex<Vec<String>>,
    model_name: String,
}

#[cfg(test)]
impl MockProvider {
    pub fn new(responses: Vec<Result<String, TransportError>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses.into()),
            prompts: std::sync::Mutex::new(Vec::new()),
            model_name: "mock-model".to_string(),
        }
    }

    pub fn replies(responses: &[&str]) -> Self {
        Self::new(responses.iter().map(|r| Ok(r.to_string())).collect())
    }

    /// Prompts received so far, one per `complete` call.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl ModelProviderClient for MockProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> Result<CompletionResponse, TransportError> {
        let prompt = messages
            .into_iter()
            .map(|m| m.content)
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt);

        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Provider("mock exhausted".to_string())));

        next.map(|content| CompletionResponse {
            content,
            model: self.model_name.clone(),
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 20,
                total_tokens: 30,
            },
            finish_reason: Some("stop".to_string()),
        })
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
