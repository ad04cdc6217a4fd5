//! Generator role: explanation plus multiple-choice questions for a grade and topic.

use crate::agent::prompt::{join_sections, PromptTemplate, FEEDBACK_DIRECTIVE, GENERATOR_TEMPLATE};
use crate::agent::StructuredModel;
use crate::error::AgentError;
use crate::schema::{ContentOutput, OutputSchema};
use crate::types::{Grade, Topic};
use tracing::{info, warn};

pub const DEFAULT_MCQ_COUNT: usize = 3;

pub struct GeneratorAgent {
    model: StructuredModel,
    mcq_count: usize,
}

impl GeneratorAgent {
    pub fn new(model: StructuredModel) -> Self {
        Self {
            model,
            mcq_count: DEFAULT_MCQ_COUNT,
        }
    }

    pub fn with_mcq_count(mut self, mcq_count: usize) -> Self {
        self.mcq_count = mcq_count;
        self
    }

    /// Build the generation prompt. Feedback, when present and non-blank, is placed
    /// verbatim before the format instructions.
    pub fn render_prompt(&self, grade: Grade, topic: &Topic, feedback: Option<&str>) -> String {
        let grade = grade.to_string();
        let mcq_count = self.mcq_count.to_string();
        let task = PromptTemplate::new(GENERATOR_TEMPLATE).render(&[
            ("grade", grade.as_str()),
            ("topic", topic.as_str()),
            ("mcq_count", mcq_count.as_str()),
        ]);
        let format_instructions = ContentOutput::format_instructions();

        match feedback.filter(|f| !f.trim().is_empty()) {
            Some(feedback) => {
                let directive =
                    PromptTemplate::new(FEEDBACK_DIRECTIVE).render(&[("feedback", feedback)]);
                join_sections(&[task.as_str(), directive.as_str(), format_instructions.as_str()])
            }
            None => join_sections(&[task.as_str(), format_instructions.as_str()]),
        }
    }

    /// One model call; the reply must parse as [`ContentOutput`] with exactly the
    /// configured number of questions.
    pub async fn generate(
        &self,
        grade: Grade,
        topic: &Topic,
        feedback: Option<&str>,
    ) -> Result<ContentOutput, AgentError> {
        let prompt = self.render_prompt(grade, topic, feedback);
        let expected = self.mcq_count;
        info!(
            grade = grade.get(),
            topic = %topic,
            with_feedback = feedback.is_some_and(|f| !f.trim().is_empty()),
            "Generating content"
        );

        let content = self
            .model
            .invoke_checked(
                "generator",
                prompt,
                |content: &ContentOutput| {
                    if content.mcqs.len() == expected {
                        Ok(())
                    } else {
                        Err(format!(
                            "expected {} MCQs, got {}",
                            expected,
                            content.mcqs.len()
                        ))
                    }
                },
            )
            .await?;

        for (index, mcq) in content.mcqs.iter().enumerate() {
            if !mcq.answer_in_options() {
                warn!(index, answer = %mcq.answer, "MCQ answer does not match any option");
            }
        }

        Ok(content)
    }
}
