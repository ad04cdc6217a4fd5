//! End-to-end pipeline runs against a scripted model client.

use crate::integration::test_utils::ScriptedClient;
use eklavya::config::{EklavyaConfig, ProviderType};
use eklavya::error::{AgentError, OutputDefect, TransportError};
use eklavya::pipeline::{
    run_pipeline, NoopObserver, Pipeline, PipelineObserver, PipelineRequest, PipelineResult,
    PipelineSettings, PipelineState, Stage,
};
use eklavya::schema::{ContentOutput, ReviewOutput};
use eklavya::types::{Grade, Topic};
use std::sync::{Arc, Mutex};

const DRAFT: &str = r#"Here is the lesson:
```json
{
  "explanation": "Photosynthesis is how green plants make their own food using sunlight, water and carbon dioxide.",
  "mcqs": [
    {"question": "What do plants need to make food?", "options": ["Sunlight", "Sand", "Plastic"], "answer": "Sunlight"},
    {"question": "Which gas do plants give out?", "options": ["Oxygen", "Smoke"], "answer": "Oxygen"},
    {"question": "Which part of the plant makes most food?", "options": ["Leaf", "Root", "Flower"], "answer": "Leaf"}
  ]
}
```"#;

const REFINED: &str = r#"{
  "explanation": "Plants are like little kitchens. Their green leaves catch sunlight and use it to cook food from water and air.",
  "mcqs": [
    {"question": "What catches sunlight?", "options": ["Leaves", "Stones"], "answer": "Leaves"},
    {"question": "What do leaves make?", "options": ["Food", "Toys"], "answer": "Food"},
    {"question": "What do plants give us to breathe?", "options": ["Oxygen", "Dust"], "answer": "Oxygen"}
  ]
}"#;

fn pipeline(client: &Arc<ScriptedClient>) -> Pipeline {
    Pipeline::new(client.clone(), &PipelineSettings::default())
}

fn grade4() -> Grade {
    Grade::new(4).unwrap()
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl PipelineObserver for Recorder {
    fn on_state(&self, state: PipelineState) {
        self.push(format!("{:?}", state));
    }

    fn on_draft(&self, _draft: &ContentOutput) {
        self.push("draft".to_string());
    }

    fn on_verdict(&self, verdict: &ReviewOutput) {
        self.push(format!("verdict:{}", verdict.status));
    }

    fn on_refined(&self, _refined: &ContentOutput) {
        self.push("refined".to_string());
    }

    fn on_failure(&self, stage: Stage, _error: &AgentError) {
        self.push(format!("failure:{}", stage));
    }
}

#[tokio::test]
async fn scenario_a_pass_is_approved_after_two_calls() {
    let client = Arc::new(ScriptedClient::ok(&[
        DRAFT,
        r#"{"status": "pass", "feedback": []}"#,
    ]));

    let result = pipeline(&client)
        .run(grade4(), &Topic::default(), &NoopObserver)
        .await;

    match &result {
        PipelineResult::Approved { draft, verdict } => {
            assert_eq!(draft.mcqs.len(), 3);
            assert!(draft.explanation.starts_with("Photosynthesis is how"));
            assert_eq!(verdict.status, "pass");
        }
        other => panic!("expected Approved, got {:?}", other),
    }
    assert_eq!(client.calls(), 2);

    let prompts = client.prompts();
    assert!(prompts[0].contains("Grade 4 on the topic 'Photosynthesis'"));
    assert!(prompts[1].contains("Review the content below for Grade 4"));
    assert!(prompts[1].contains("Photosynthesis is how green plants make their own food"));
}

#[tokio::test]
async fn scenario_b_fail_refines_once_with_joined_feedback() {
    let client = Arc::new(ScriptedClient::ok(&[
        DRAFT,
        r#"{"status": "fail", "feedback": ["too advanced", "missing diagram reference"]}"#,
        REFINED,
    ]));
    let recorder = Recorder::default();

    let result = pipeline(&client)
        .run(grade4(), &Topic::default(), &recorder)
        .await;

    match &result {
        PipelineResult::Refined {
            draft,
            verdict,
            refined,
        } => {
            assert!(draft.explanation.starts_with("Photosynthesis is how"));
            assert_eq!(verdict.status, "fail");
            assert!(refined.explanation.starts_with("Plants are like little kitchens"));
        }
        other => panic!("expected Refined, got {:?}", other),
    }
    assert_eq!(result.final_content().unwrap().mcqs[0].answer, "Leaves");

    let prompts = client.prompts();
    assert_eq!(prompts.len(), 3);
    assert!(!prompts[0].contains("CRITICAL FEEDBACK"));
    assert!(prompts[2].contains("CRITICAL FEEDBACK: too advanced; missing diagram reference"));

    assert_eq!(
        recorder.events(),
        vec![
            "Generating",
            "draft",
            "Reviewing",
            "verdict:fail",
            "Refining",
            "refined",
            "RefinementComplete"
        ]
    );
}

#[tokio::test]
async fn scenario_c_generator_transport_failure_skips_review() {
    let client = Arc::new(ScriptedClient::new(vec![Err(TransportError::AuthFailed(
        "invalid api key".to_string(),
    ))]));

    let result = pipeline(&client)
        .run(grade4(), &Topic::default(), &NoopObserver)
        .await;

    match result {
        PipelineResult::Failed {
            stage,
            error,
            draft,
            verdict,
        } => {
            assert_eq!(stage, Stage::Generate);
            assert!(matches!(
                error,
                AgentError::Transport(TransportError::AuthFailed(_))
            ));
            assert!(draft.is_none());
            assert!(verdict.is_none());
        }
        other => panic!("expected Failed, got {:?}", other),
    }
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn scenario_d_missing_status_fails_review_with_raw_text() {
    let raw_verdict = r#"{"feedback": ["looks fine"]}"#;
    let client = Arc::new(ScriptedClient::ok(&[DRAFT, raw_verdict]));
    let recorder = Recorder::default();

    let result = pipeline(&client)
        .run(grade4(), &Topic::default(), &recorder)
        .await;

    match result {
        PipelineResult::Failed {
            stage,
            error,
            draft,
            verdict,
        } => {
            assert_eq!(stage, Stage::Review);
            match error {
                AgentError::ModelOutputInvalid(invalid) => {
                    assert_eq!(invalid.defect, OutputDefect::MissingField("status".to_string()));
                    assert_eq!(invalid.raw, raw_verdict);
                }
                other => panic!("expected ModelOutputInvalid, got {:?}", other),
            }
            assert_eq!(draft.unwrap().mcqs.len(), 3);
            assert!(verdict.is_none());
        }
        other => panic!("expected Failed, got {:?}", other),
    }
    assert_eq!(client.calls(), 2);
    assert_eq!(
        recorder.events(),
        vec![
            "Generating",
            "draft",
            "Reviewing",
            "failure:review",
            "Failed(Review)"
        ]
    );
}

#[tokio::test]
async fn uppercase_fail_still_refines() {
    let client = Arc::new(ScriptedClient::ok(&[
        DRAFT,
        r#"{"status": "FAIL", "feedback": ["shorter sentences"]}"#,
        REFINED,
    ]));

    let result = pipeline(&client)
        .run(grade4(), &Topic::default(), &NoopObserver)
        .await;

    assert!(matches!(result, PipelineResult::Refined { .. }));
    assert!(client.prompts()[2].contains("CRITICAL FEEDBACK: shorter sentences"));
}

#[tokio::test]
async fn refined_draft_with_wrong_shape_fails_refine_stage() {
    let client = Arc::new(ScriptedClient::ok(&[
        DRAFT,
        r#"{"status": "fail", "feedback": ["too advanced"]}"#,
        "Sorry, I cannot help with that.",
    ]));

    let result = pipeline(&client)
        .run(grade4(), &Topic::default(), &NoopObserver)
        .await;

    match result {
        PipelineResult::Failed {
            stage,
            error,
            draft,
            verdict,
        } => {
            assert_eq!(stage, Stage::Refine);
            assert!(matches!(
                error,
                AgentError::ModelOutputInvalid(ref invalid)
                    if matches!(invalid.defect, OutputDefect::NotJson(_))
            ));
            assert!(draft.is_some());
            assert_eq!(verdict.unwrap().feedback, vec!["too advanced".to_string()]);
        }
        other => panic!("expected Failed, got {:?}", other),
    }
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn run_pipeline_without_credential_fails_generate() {
    let request = PipelineRequest::new(4, "Photosynthesis", None).unwrap();
    let mut config = EklavyaConfig::default();
    config.provider.provider_type = ProviderType::Groq;

    let result = run_pipeline(&request, &config, &NoopObserver).await;
    match result {
        PipelineResult::Failed { stage, error, .. } => {
            assert_eq!(stage, Stage::Generate);
            assert!(matches!(error, AgentError::Transport(_)));
        }
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn run_pipeline_with_zero_mcq_count_fails_before_any_call() {
    let request = PipelineRequest::new(4, "Photosynthesis", None).unwrap();
    let mut config = EklavyaConfig::default();
    config.provider.provider_type = ProviderType::Ollama;
    config.generation.mcq_count = 0;
    let recorder = Recorder::default();

    let result = run_pipeline(&request, &config, &recorder).await;
    match result {
        PipelineResult::Failed { stage, error, .. } => {
            assert_eq!(stage, Stage::Generate);
            assert!(error.to_string().contains("Invalid configuration"));
            assert!(error.to_string().contains("mcq_count"));
        }
        other => panic!("expected Failed, got {:?}", other),
    }
    assert!(!recorder.events().contains(&"Generating".to_string()));
}

#[test]
fn request_rejects_bad_grade_and_blank_topic() {
    assert!(PipelineRequest::new(0, "Photosynthesis", None).is_err());
    assert!(PipelineRequest::new(13, "Photosynthesis", None).is_err());
    assert!(PipelineRequest::new(4, "   ", None).is_err());
    let request = PipelineRequest::new(12, " Volcanoes ", Some(String::new())).unwrap();
    assert_eq!(request.topic.as_str(), "Volcanoes");
    assert!(request.credential().is_none());
}
