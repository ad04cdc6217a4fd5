//! Eklavya: generate → review → refine educational content
//!
//! A generator agent writes a grade-appropriate explanation with multiple-choice
//! questions, a reviewer agent judges it, and a failed review triggers exactly one
//! refinement carrying the reviewer's feedback. Both agents talk to a language
//! model through the [`provider::ModelProviderClient`] trait, so tests can inject
//! a scripted client.

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod provider;
pub mod schema;
pub mod types;

pub use error::{AgentError, ApiError, ModelOutputInvalid, OutputDefect, TransportError};
pub use pipeline::{
    is_fail_verdict, run_pipeline, run_pipeline_blocking, Pipeline, PipelineObserver,
    PipelineRequest, PipelineResult, PipelineSettings, Stage,
};
pub use schema::{ContentOutput, Mcq, ReviewOutput};
