//! Property-based tests for verdict routing and feedback joining

use eklavya::pipeline::is_fail_verdict;
use eklavya::schema::{classify_verdict, ReviewOutput, VerdictStatus};
use proptest::prelude::*;

/// Any casing of "fail" routes to refinement.
#[test]
fn test_fail_in_any_casing_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&proptest::collection::vec(any::<bool>(), 4), |upper| {
            let status: String = "fail"
                .chars()
                .zip(upper)
                .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
                .collect();
            assert!(is_fail_verdict(&status));
            Ok(())
        })
        .unwrap();
}

/// Anything that does not lower-case to exactly "fail" is pass-equivalent.
#[test]
fn test_non_fail_statuses_never_refine_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&any::<String>(), |status| {
            prop_assume!(status.to_lowercase() != "fail");
            assert!(!is_fail_verdict(&status));
            assert_ne!(classify_verdict(&status), VerdictStatus::Fail);
            Ok(())
        })
        .unwrap();
}

/// Feedback items appear in order, separated by "; ".
#[test]
fn test_joined_feedback_preserves_order_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &proptest::collection::vec("[a-z ]{1,20}", 0..6),
            |feedback| {
                let verdict = ReviewOutput {
                    status: "fail".to_string(),
                    feedback: feedback.clone(),
                };
                let joined = verdict.joined_feedback();
                assert_eq!(joined, feedback.join("; "));

                let mut from = 0;
                for item in &feedback {
                    let at = joined[from..].find(item.as_str()).unwrap();
                    from += at + item.len();
                }
                Ok(())
            },
        )
        .unwrap();
}
