//! Prompt templates for the generator and reviewer roles.

/// Generator instructions. `{mcq_count}` is the number of questions requested.
pub const GENERATOR_TEMPLATE: &str = "You are an expert educational content creator.
Task: Create educational content for Grade {grade} on the topic '{topic}'.

Requirements:
1. The explanation must be age-appropriate for Grade {grade}.
2. Create exactly {mcq_count} multiple choice questions (MCQs). Each answer must match one of its options word for word.
3. Output MUST be valid JSON.";

/// Appended to the generator prompt when a reviewer rejected the previous draft.
pub const FEEDBACK_DIRECTIVE: &str = "CRITICAL FEEDBACK: {feedback}
You must address every point of this feedback. FIX THESE ISSUES.";

pub const REVIEWER_TEMPLATE: &str = "You are a strict educational content reviewer.
Task: Review the content below for Grade {grade}.

Content:
{content}

Criteria:
1. Age appropriateness?
2. Factual correctness?
3. Valid structure (an explanation plus well-formed multiple choice questions)?

Judge the content only; do not rewrite it.
Output JSON with status 'pass' or 'fail' and one feedback item per issue found.";

/// A prompt with `{name}` placeholders.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    template: &'static str,
}

impl PromptTemplate {
    pub const fn new(template: &'static str) -> Self {
        Self { template }
    }

    /// Substitute placeholders in one pass. Substituted values are never rescanned,
    /// and braces that do not name a known variable are kept as written.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut rendered = String::with_capacity(self.template.len());
        let mut rest = self.template;

        while let Some(open) = rest.find('{') {
            rendered.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let substitution = after.find('}').and_then(|close| {
                let name = &after[..close];
                vars.iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| (close, *value))
            });
            match substitution {
                Some((close, value)) => {
                    rendered.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    rendered.push('{');
                    rest = after;
                }
            }
        }

        rendered.push_str(rest);
        rendered
    }
}

/// Join prompt sections with a blank line between them.
pub fn join_sections(sections: &[&str]) -> String {
    sections.join("\n\n")
}
