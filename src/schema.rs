//! Output schemas
//!
//! Record shapes the agents expect back from the model, the format instructions
//! embedded into prompts to describe them, and the parse boundary that turns raw
//! model text into typed records. Parsing never trusts the prompt: required fields,
//! JSON types and basic content constraints are all checked here.

use crate::error::{ModelOutputInvalid, OutputDefect};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mcq {
    pub question: String,
    pub options: Vec<String>,
    /// Expected to match one option verbatim.
    pub answer: String,
}

impl Mcq {
    pub fn answer_in_options(&self) -> bool {
        self.options.iter().any(|option| option == &self.answer)
    }
}

/// Generator output: an explanation plus its questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentOutput {
    pub explanation: String,
    pub mcqs: Vec<Mcq>,
}

/// Reviewer output. `status` is carried verbatim; [`ReviewOutput::verdict_status`]
/// reads it case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutput {
    pub status: String,
    pub feedback: Vec<String>,
}

/// How a reviewer status string reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictStatus {
    Pass,
    Fail,
    /// Neither "pass" nor "fail"; routed like a pass unless strict verdicts are on.
    Unrecognized,
}

pub fn classify_verdict(status: &str) -> VerdictStatus {
    match status.to_lowercase().as_str() {
        "pass" => VerdictStatus::Pass,
        "fail" => VerdictStatus::Fail,
        _ => VerdictStatus::Unrecognized,
    }
}

impl ReviewOutput {
    pub fn verdict_status(&self) -> VerdictStatus {
        classify_verdict(&self.status)
    }

    /// Feedback items joined in their original order, as handed to the refiner.
    pub fn joined_feedback(&self) -> String {
        self.feedback.join("; ")
    }
}

/// A record shape the model is asked to produce.
pub trait OutputSchema: Sized + DeserializeOwned {
    /// Schema title used in the format instructions.
    const NAME: &'static str;

    /// Top-level fields that must be present and non-null.
    const REQUIRED_FIELDS: &'static [&'static str];

    /// JSON-schema document describing the record.
    fn json_schema() -> Value;

    /// Structural checks beyond field presence and JSON types.
    fn check(&self) -> Result<(), String> {
        Ok(())
    }

    /// Prompt fragment describing the expected output.
    fn format_instructions() -> String {
        render_format_instructions(&Self::json_schema())
    }

    /// Parse raw model text into the record.
    fn parse(raw: &str) -> Result<Self, ModelOutputInvalid> {
        parse_output(raw)
    }
}

impl OutputSchema for ContentOutput {
    const NAME: &'static str = "ContentOutput";
    const REQUIRED_FIELDS: &'static [&'static str] = &["explanation", "mcqs"];

    fn json_schema() -> Value {
        json!({
            "title": Self::NAME,
            "type": "object",
            "properties": {
                "explanation": {
                    "title": "Explanation",
                    "type": "string"
                },
                "mcqs": {
                    "title": "Mcqs",
                    "type": "array",
                    "items": { "$ref": "#/$defs/MCQ" }
                }
            },
            "required": ["explanation", "mcqs"],
            "$defs": {
                "MCQ": {
                    "title": "MCQ",
                    "type": "object",
                    "properties": {
                        "question": { "title": "Question", "type": "string" },
                        "options": {
                            "title": "Options",
                            "type": "array",
                            "items": { "type": "string" }
                        },
                        "answer": { "title": "Answer", "type": "string" }
                    },
                    "required": ["question", "options", "answer"]
                }
            }
        })
    }

    fn check(&self) -> Result<(), String> {
        if self.explanation.trim().is_empty() {
            return Err("explanation is empty".to_string());
        }
        for (index, mcq) in self.mcqs.iter().enumerate() {
            if mcq.question.trim().is_empty() {
                return Err(format!("mcqs[{}] has an empty question", index));
            }
            if mcq.options.len() < 2 {
                return Err(format!(
                    "mcqs[{}] has {} option(s), at least 2 are required",
                    index,
                    mcq.options.len()
                ));
            }
        }
        Ok(())
    }
}

impl OutputSchema for ReviewOutput {
    const NAME: &'static str = "ReviewOutput";
    const REQUIRED_FIELDS: &'static [&'static str] = &["status", "feedback"];

    fn json_schema() -> Value {
        json!({
            "title": Self::NAME,
            "type": "object",
            "properties": {
                "status": {
                    "title": "Status",
                    "description": "Must be strictly 'pass' or 'fail'",
                    "type": "string"
                },
                "feedback": {
                    "title": "Feedback",
                    "type": "array",
                    "items": { "type": "string" }
                }
            },
            "required": ["status", "feedback"]
        })
    }
}

impl fmt::Display for ContentOutput {
    /// Pretty JSON, the form embedded into review prompts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

fn render_format_instructions(schema: &Value) -> String {
    format!(
        "Respond with a single JSON object that conforms to the JSON schema below. \
         Do not wrap it in prose. Every field listed under \"required\" must be present \
         and have the declared type. Return an instance of the schema, not the schema itself.\n\n\
         Here is the output schema:\n```\n{}\n```",
        schema
    )
}

/// Parse raw model text into `T`.
///
/// Accepts bare JSON, JSON inside a markdown code fence, or JSON with prose
/// before or after it (the first complete `{ ... }` value is used).
pub fn parse_output<T: OutputSchema>(raw: &str) -> Result<T, ModelOutputInvalid> {
    let value = extract_json_value(raw)
        .map_err(|e| ModelOutputInvalid::new(raw, OutputDefect::NotJson(e.to_string())))?;

    let object = value.as_object().ok_or_else(|| {
        ModelOutputInvalid::new(
            raw,
            OutputDefect::InvalidShape(format!(
                "expected a JSON object for {}, found {}",
                T::NAME,
                json_kind(&value)
            )),
        )
    })?;

    if let Some(missing) = T::REQUIRED_FIELDS
        .iter()
        .find(|field| object.get(**field).map_or(true, Value::is_null))
    {
        return Err(ModelOutputInvalid::new(
            raw,
            OutputDefect::MissingField((*missing).to_string()),
        ));
    }

    let record: T = serde_json::from_value(value)
        .map_err(|e| ModelOutputInvalid::new(raw, OutputDefect::InvalidShape(e.to_string())))?;

    record
        .check()
        .map_err(|reason| ModelOutputInvalid::new(raw, OutputDefect::Constraint(reason)))?;

    Ok(record)
}

fn extract_json_value(raw: &str) -> Result<Value, serde_json::Error> {
    let unfenced = strip_code_fence(raw.trim());
    let whole = match serde_json::from_str::<Value>(unfenced) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    // Prose or a closing fence around the object: read the first complete value
    // starting at the first brace and ignore whatever follows it.
    if let Some(start) = unfenced.find('{') {
        let first = serde_json::Deserializer::from_str(&unfenced[start..])
            .into_iter::<Value>()
            .next();
        if let Some(Ok(value)) = first {
            return Ok(value);
        }
    }

    Err(whole)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
