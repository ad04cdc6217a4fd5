//! Property-based tests for the model-output parse boundary and prompt rendering

use eklavya::agent::PromptTemplate;
use eklavya::error::OutputDefect;
use eklavya::schema::{parse_output, ContentOutput, ReviewOutput};
use proptest::prelude::*;

/// Arbitrary model text never panics the parser; failures keep the raw text.
#[test]
fn test_parse_never_panics_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&any::<String>(), |raw| {
            if let Err(invalid) = parse_output::<ContentOutput>(&raw) {
                assert_eq!(invalid.raw, raw);
            }
            if let Err(invalid) = parse_output::<ReviewOutput>(&raw) {
                assert_eq!(invalid.raw, raw);
            }
            Ok(())
        })
        .unwrap();
}

/// A verdict parses the same bare, fenced, or with prose before or after it.
#[test]
fn test_verdict_wrapping_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                "(pass|fail|PASS|Fail)",
                proptest::collection::vec("[a-zA-Z ,.]{0,30}", 0..4),
            ),
            |(status, feedback)| {
                let body = serde_json::json!({ "status": status, "feedback": feedback }).to_string();
                let variants = [
                    body.clone(),
                    format!("```json\n{}\n```", body),
                    format!("Here is my review:\n{}\nThanks!", body),
                    format!("{} Hope this helps.", body),
                    format!("```json\n{}\n```\nLet me know if you want {{more}} changes.", body),
                ];
                for raw in variants {
                    let verdict = parse_output::<ReviewOutput>(&raw).unwrap();
                    assert_eq!(verdict.status, status);
                    assert_eq!(verdict.feedback, feedback);
                }
                Ok(())
            },
        )
        .unwrap();
}

/// Dropping the status field is always reported as that missing field.
#[test]
fn test_missing_status_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&proptest::collection::vec("[a-z]{1,10}", 0..4), |feedback| {
            let raw = serde_json::json!({ "feedback": feedback }).to_string();
            let invalid = parse_output::<ReviewOutput>(&raw).unwrap_err();
            assert_eq!(invalid.defect, OutputDefect::MissingField("status".to_string()));
            Ok(())
        })
        .unwrap();
}

/// Substituted values are inserted verbatim, even when they look like placeholders.
#[test]
fn test_template_values_inserted_verbatim_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(any::<String>(), 1u8..=12), |(topic, grade)| {
            let grade = grade.to_string();
            let rendered = PromptTemplate::new("Grade {grade}: {topic}.")
                .render(&[("grade", grade.as_str()), ("topic", topic.as_str())]);
            assert_eq!(rendered, format!("Grade {}: {}.", grade, topic));
            Ok(())
        })
        .unwrap();
}
