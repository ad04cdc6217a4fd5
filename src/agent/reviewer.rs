//! Reviewer role: judges a draft and returns a verdict, never a rewrite.

use crate::agent::prompt::{join_sections, PromptTemplate, REVIEWER_TEMPLATE};
use crate::agent::StructuredModel;
use crate::error::AgentError;
use crate::schema::{ContentOutput, OutputSchema, ReviewOutput, VerdictStatus};
use crate::types::Grade;
use tracing::info;

pub struct ReviewerAgent {
    model: StructuredModel,
    strict_verdict: bool,
}

impl ReviewerAgent {
    pub fn new(model: StructuredModel) -> Self {
        Self {
            model,
            strict_verdict: false,
        }
    }

    /// Reject verdicts whose status is neither "pass" nor "fail" (any casing)
    /// instead of passing them on.
    pub fn with_strict_verdict(mut self, strict_verdict: bool) -> Self {
        self.strict_verdict = strict_verdict;
        self
    }

    pub fn render_prompt(&self, content: &ContentOutput, grade: Grade) -> String {
        let grade = grade.to_string();
        let content = content.to_string();
        let task = PromptTemplate::new(REVIEWER_TEMPLATE)
            .render(&[("grade", grade.as_str()), ("content", content.as_str())]);
        let format_instructions = ReviewOutput::format_instructions();
        join_sections(&[task.as_str(), format_instructions.as_str()])
    }

    pub async fn review(
        &self,
        content: &ContentOutput,
        grade: Grade,
    ) -> Result<ReviewOutput, AgentError> {
        let prompt = self.render_prompt(content, grade);
        info!(grade = grade.get(), mcqs = content.mcqs.len(), "Reviewing content");

        if !self.strict_verdict {
            return self.model.invoke("reviewer", prompt).await;
        }
        self.model
            .invoke_checked("reviewer", prompt, |verdict: &ReviewOutput| {
                match verdict.verdict_status() {
                    VerdictStatus::Unrecognized => Err(format!(
                        "status must be 'pass' or 'fail', got '{}'",
                        verdict.status
                    )),
                    _ => Ok(()),
                }
            })
            .await
    }
}
