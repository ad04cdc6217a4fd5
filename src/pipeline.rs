//! Pipeline Controller
//!
//! Runs one generate → review → (maybe) refine pass:
//!
//! ```text
//! Generating ──ok──▶ Reviewing ──pass-equivalent──▶ Approved
//!     │                  │
//!     │                  └──"fail"──▶ Refining ──ok──▶ RefinementComplete
//!     ▼                  ▼                │
//!  Failed(generate)   Failed(review)      ▼
//!                                    Failed(refine)
//! ```
//!
//! The refined draft is never reviewed again, so a run makes at most three model
//! calls. Every failure ends the run and is returned tagged with its stage, together
//! with whatever earlier stages produced.

use crate::agent::{GeneratorAgent, ReviewerAgent, StructuredModel};
use crate::config::EklavyaConfig;
use crate::error::{AgentError, ApiError, TransportError};
use crate::provider::{CompletionOptions, ModelProviderClient, ProviderFactory};
use crate::schema::{classify_verdict, ContentOutput, ReviewOutput, VerdictStatus};
use crate::types::{Grade, Topic};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Unit of failure attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Generate,
    Review,
    Refine,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Generate => "generate",
            Stage::Review => "review",
            Stage::Refine => "refine",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Generating,
    Reviewing,
    Approved,
    Refining,
    RefinementComplete,
    Failed(Stage),
}

/// The only routing predicate: refinement runs iff the status lower-cases to
/// exactly "fail". Everything else, including unrecognised values, is treated as
/// a pass.
pub fn is_fail_verdict(status: &str) -> bool {
    classify_verdict(status) == VerdictStatus::Fail
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineResult {
    Approved {
        draft: ContentOutput,
        verdict: ReviewOutput,
    },
    Refined {
        draft: ContentOutput,
        verdict: ReviewOutput,
        refined: ContentOutput,
    },
    Failed {
        stage: Stage,
        error: AgentError,
        /// Present when generation succeeded before the failure.
        draft: Option<ContentOutput>,
        /// Present when review succeeded before the failure.
        verdict: Option<ReviewOutput>,
    },
}

impl PipelineResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, PipelineResult::Failed { .. })
    }

    pub fn terminal_state(&self) -> PipelineState {
        match self {
            PipelineResult::Approved { .. } => PipelineState::Approved,
            PipelineResult::Refined { .. } => PipelineState::RefinementComplete,
            PipelineResult::Failed { stage, .. } => PipelineState::Failed(*stage),
        }
    }

    /// Content the caller should use: the approved draft or the refinement.
    pub fn final_content(&self) -> Option<&ContentOutput> {
        match self {
            PipelineResult::Approved { draft, .. } => Some(draft),
            PipelineResult::Refined { refined, .. } => Some(refined),
            PipelineResult::Failed { .. } => None,
        }
    }
}

/// Receives each stage's output as soon as it exists.
pub trait PipelineObserver {
    fn on_state(&self, _state: PipelineState) {}
    fn on_draft(&self, _draft: &ContentOutput) {}
    fn on_verdict(&self, _verdict: &ReviewOutput) {}
    fn on_refined(&self, _refined: &ContentOutput) {}
    fn on_failure(&self, _stage: Stage, _error: &AgentError) {}
}

pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Knobs shared by both agents in a run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub mcq_count: usize,
    pub strict_verdict: bool,
    pub options: CompletionOptions,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            mcq_count: crate::agent::generator::DEFAULT_MCQ_COUNT,
            strict_verdict: false,
            options: CompletionOptions::default(),
        }
    }
}

impl PipelineSettings {
    pub fn from_config(config: &EklavyaConfig) -> Self {
        Self {
            mcq_count: config.generation.mcq_count,
            strict_verdict: config.review.strict_verdict,
            options: config.provider.default_options.clone(),
        }
    }
}

/// Caller input for one run.
#[derive(Clone)]
pub struct PipelineRequest {
    pub grade: Grade,
    pub topic: Topic,
    credential: Option<String>,
}

impl PipelineRequest {
    pub fn new(
        grade: u8,
        topic: impl Into<String>,
        credential: Option<String>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            grade: Grade::new(grade)?,
            topic: Topic::new(topic)?,
            credential: credential.filter(|c| !c.trim().is_empty()),
        })
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }
}

impl fmt::Debug for PipelineRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineRequest")
            .field("grade", &self.grade)
            .field("topic", &self.topic)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Fresh generator and reviewer bound to one client.
pub struct Pipeline {
    generator: GeneratorAgent,
    reviewer: ReviewerAgent,
}

impl Pipeline {
    pub fn new(client: Arc<dyn ModelProviderClient>, settings: &PipelineSettings) -> Self {
        let model = StructuredModel::new(client, settings.options.clone());
        Self {
            generator: GeneratorAgent::new(model.clone()).with_mcq_count(settings.mcq_count),
            reviewer: ReviewerAgent::new(model).with_strict_verdict(settings.strict_verdict),
        }
    }

    pub async fn run(
        &self,
        grade: Grade,
        topic: &Topic,
        observer: &dyn PipelineObserver,
    ) -> PipelineResult {
        let started = Instant::now();
        let result = self.run_stages(grade, topic, observer).await;
        let state = result.terminal_state();
        observer.on_state(state);
        info!(
            outcome = ?state,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Pipeline finished"
        );
        result
    }

    async fn run_stages(
        &self,
        grade: Grade,
        topic: &Topic,
        observer: &dyn PipelineObserver,
    ) -> PipelineResult {
        enter(PipelineState::Generating, observer);
        let draft = match self.generator.generate(grade, topic, None).await {
            Ok(draft) => draft,
            Err(error) => return failed(Stage::Generate, error, None, None, observer),
        };
        observer.on_draft(&draft);

        enter(PipelineState::Reviewing, observer);
        let verdict = match self.reviewer.review(&draft, grade).await {
            Ok(verdict) => verdict,
            Err(error) => return failed(Stage::Review, error, Some(draft), None, observer),
        };
        observer.on_verdict(&verdict);

        if verdict.verdict_status() == VerdictStatus::Unrecognized {
            warn!(
                status = %verdict.status,
                "Reviewer returned an unrecognised status; treating it as pass"
            );
        }

        if !is_fail_verdict(&verdict.status) {
            return PipelineResult::Approved { draft, verdict };
        }

        enter(PipelineState::Refining, observer);
        let feedback = verdict.joined_feedback();
        debug!(feedback_items = verdict.feedback.len(), "Refining with reviewer feedback");
        match self.generator.generate(grade, topic, Some(&feedback)).await {
            Ok(refined) => {
                observer.on_refined(&refined);
                PipelineResult::Refined {
                    draft,
                    verdict,
                    refined,
                }
            }
            Err(error) => failed(Stage::Refine, error, Some(draft), Some(verdict), observer),
        }
    }
}

fn enter(state: PipelineState, observer: &dyn PipelineObserver) {
    debug!(state = ?state, "Pipeline state");
    observer.on_state(state);
}

fn failed(
    stage: Stage,
    error: AgentError,
    draft: Option<ContentOutput>,
    verdict: Option<ReviewOutput>,
    observer: &dyn PipelineObserver,
) -> PipelineResult {
    error!(stage = %stage, error = %error, "Pipeline stage failed");
    observer.on_failure(stage, &error);
    PipelineResult::Failed {
        stage,
        error,
        draft,
        verdict,
    }
}

/// Validate `config`, build a client from `config.provider` and the request's
/// credential, then run one pass. An invalid configuration or a client that
/// cannot be built is reported as a generate-stage transport failure before any
/// model call.
pub async fn run_pipeline(
    request: &PipelineRequest,
    config: &EklavyaConfig,
    observer: &dyn PipelineObserver,
) -> PipelineResult {
    info!(
        grade = request.grade.get(),
        topic = %request.topic,
        provider = %config.provider.provider_type,
        model = %config.provider.model,
        "Starting pipeline"
    );

    let client = match check_config(config).and_then(|_| connect(request, config)) {
        Ok(client) => client,
        Err(error) => {
            let result = failed(Stage::Generate, AgentError::Transport(error), None, None, observer);
            observer.on_state(result.terminal_state());
            return result;
        }
    };

    Pipeline::new(client, &PipelineSettings::from_config(config))
        .run(request.grade, &request.topic, observer)
        .await
}

fn check_config(config: &EklavyaConfig) -> Result<(), TransportError> {
    config.validate().map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        TransportError::Provider(format!("Invalid configuration: {}", messages.join("; ")))
    })
}

fn connect(
    request: &PipelineRequest,
    config: &EklavyaConfig,
) -> Result<Arc<dyn ModelProviderClient>, TransportError> {
    let provider = config
        .provider
        .to_model_provider(request.credential())
        .map_err(|e| TransportError::AuthFailed(e.to_string()))?;
    Ok(Arc::from(ProviderFactory::create_client(&provider)?))
}

/// Blocking wrapper for synchronous callers. Must not be called from inside a
/// tokio runtime.
pub fn run_pipeline_blocking(
    request: &PipelineRequest,
    config: &EklavyaConfig,
    observer: &dyn PipelineObserver,
) -> Result<PipelineResult, ApiError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(ApiError::Runtime(
            "Cannot run the pipeline from within an async runtime; use run_pipeline instead"
                .to_string(),
        ));
    }
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ApiError::Runtime(format!("Failed to create runtime: {}", e)))?;
    Ok(rt.block_on(run_pipeline(request, config, observer)))
}
