//! Prompted Agents
//!
//! The generator and reviewer roles. Each agent renders its prompt, makes exactly
//! one model call through a [`StructuredModel`], and parses the reply at the schema
//! boundary. Agents keep no state between calls.

use crate::error::{AgentError, ModelOutputInvalid, OutputDefect};
use crate::provider::{ChatMessage, CompletionOptions, ModelProviderClient};
use crate::schema::OutputSchema;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

pub mod generator;
pub mod prompt;
pub mod reviewer;

pub use generator::{GeneratorAgent, DEFAULT_MCQ_COUNT};
pub use prompt::PromptTemplate;
pub use reviewer::ReviewerAgent;

/// A model client bound to one set of completion options, invoked with a rendered
/// prompt and parsed into an output schema.
#[derive(Clone)]
pub struct StructuredModel {
    client: Arc<dyn ModelProviderClient>,
    options: CompletionOptions,
}

impl StructuredModel {
    pub fn new(client: Arc<dyn ModelProviderClient>, options: CompletionOptions) -> Self {
        Self { client, options }
    }

    /// Send `prompt` and parse the reply into `T`.
    pub async fn invoke<T: OutputSchema>(&self, agent: &str, prompt: String) -> Result<T, AgentError> {
        self.invoke_checked(agent, prompt, |_: &T| Ok(())).await
    }

    /// Like [`invoke`](Self::invoke), with an extra caller constraint on the parsed
    /// record. A violated constraint is reported as invalid output carrying the raw text.
    pub async fn invoke_checked<T, F>(
        &self,
        agent: &str,
        prompt: String,
        check: F,
    ) -> Result<T, AgentError>
    where
        T: OutputSchema,
        F: Fn(&T) -> Result<(), String>,
    {
        let started = Instant::now();
        debug!(
            agent,
            provider = self.client.provider_name(),
            model = self.client.model_name(),
            prompt_chars = prompt.len(),
            "Invoking model"
        );

        let response = self
            .client
            .complete(vec![ChatMessage::user(prompt)], self.options.clone())
            .await
            .map_err(|e| {
                warn!(agent, error = %e, "Model call failed");
                AgentError::Transport(e)
            })?;

        debug!(
            agent,
            elapsed_ms = started.elapsed().as_millis() as u64,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            "Model responded"
        );

        let record = T::parse(&response.content).map_err(|e| {
            warn!(agent, schema = T::NAME, defect = %e.defect, "Model output rejected");
            AgentError::ModelOutputInvalid(e)
        })?;

        if let Err(reason) = check(&record) {
            warn!(agent, schema = T::NAME, reason = %reason, "Model output rejected");
            return Err(AgentError::ModelOutputInvalid(ModelOutputInvalid::new(
                response.content,
                OutputDefect::Constraint(reason),
            )));
        }

        Ok(record)
    }
}
