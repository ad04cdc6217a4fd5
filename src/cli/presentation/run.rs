//! Run presentation: progressive text output while the pipeline runs, and the
//! final result as text or JSON.

use crate::cli::presentation::content::{
    format_content_text, format_failure_text, format_verdict_text, paint,
};
use crate::error::{AgentError, ApiError};
use crate::pipeline::{PipelineObserver, PipelineResult, PipelineState, Stage};
use crate::schema::{ContentOutput, ReviewOutput};
use crate::types::{Grade, Topic};
use owo_colors::Style;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Mutex;

/// Writes each stage's output as soon as the pipeline produces it.
pub struct TextObserver<W: Write> {
    out: Mutex<W>,
    color: bool,
}

impl<W: Write> TextObserver<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out: Mutex::new(out),
            color,
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        // Best effort: write errors are ignored.
        let _ = writeln!(out, "{}", text);
        let _ = out.flush();
    }
}

impl<W: Write> PipelineObserver for TextObserver<W> {
    fn on_state(&self, state: PipelineState) {
        let line = match state {
            PipelineState::Generating => "Generating draft...",
            PipelineState::Reviewing => "Reviewing draft...",
            PipelineState::Refining => "Refining with reviewer feedback...",
            _ => return,
        };
        self.emit(&paint(line, Style::new().dimmed(), self.color));
    }

    fn on_draft(&self, draft: &ContentOutput) {
        self.emit(&format_content_text("Draft", draft, self.color));
    }

    fn on_verdict(&self, verdict: &ReviewOutput) {
        self.emit(&format_verdict_text(verdict, self.color));
    }

    fn on_refined(&self, refined: &ContentOutput) {
        self.emit(&format_content_text("Refined", refined, self.color));
    }

    fn on_failure(&self, stage: Stage, error: &AgentError) {
        self.emit(&format_failure_text(stage, error, self.color));
    }
}

/// Closing status line for text mode.
pub fn format_run_summary_text(result: &PipelineResult, color: bool) -> String {
    match result {
        PipelineResult::Approved { .. } => format!(
            "{} draft approved on first review",
            paint("APPROVED", Style::new().green().bold(), color)
        ),
        PipelineResult::Refined { .. } => format!(
            "{} draft refined once with reviewer feedback (not re-reviewed)",
            paint("REFINED", Style::new().cyan().bold(), color)
        ),
        PipelineResult::Failed { stage, .. } => format!(
            "{} pipeline stopped at stage {}",
            paint("FAILED", Style::new().red().bold(), color),
            stage
        ),
    }
}

/// The whole run as one JSON document.
pub fn format_run_result_json(
    result: &PipelineResult,
    grade: Grade,
    topic: &Topic,
) -> Result<String, ApiError> {
    let generated_at = chrono::Utc::now().to_rfc3339();
    let body = match result {
        PipelineResult::Approved { draft, verdict } => json!({
            "outcome": "approved",
            "draft": draft,
            "verdict": verdict,
        }),
        PipelineResult::Refined {
            draft,
            verdict,
            refined,
        } => json!({
            "outcome": "refined",
            "draft": draft,
            "verdict": verdict,
            "refined": refined,
        }),
        PipelineResult::Failed {
            stage,
            error,
            draft,
            verdict,
        } => json!({
            "outcome": "failed",
            "stage": stage,
            "error": error_json(error),
            "draft": draft,
            "verdict": verdict,
        }),
    };

    let mut out = json!({
        "grade": grade.get(),
        "topic": topic.as_str(),
        "generated_at": generated_at,
    });
    if let (Value::Object(out), Value::Object(body)) = (&mut out, body) {
        out.extend(body);
    }
    Ok(serde_json::to_string_pretty(&out)?)
}

fn error_json(error: &AgentError) -> Value {
    match error {
        AgentError::Transport(transport) => json!({
            "kind": "transport",
            "message": transport.to_string(),
        }),
        AgentError::ModelOutputInvalid(invalid) => json!({
            "kind": "model_output_invalid",
            "message": invalid.defect.to_string(),
            "missing_field": match &invalid.defect {
                crate::error::OutputDefect::MissingField(field) => Some(field.as_str()),
                _ => None,
            },
            "raw": invalid.raw,
        }),
    }
}
