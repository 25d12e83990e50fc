//! Report conversion tests.

mod test_utils;

use storytoons::{FailureReport, PipelineState, RunReport, Stage, StageError};
use test_utils::stub_pipeline;

#[test]
fn test_failure_report_from_authorization_error() {
    let err = StageError::from_status(Stage::Narration, 401, "invalid api key");
    let report = FailureReport::from(&err);

    assert_eq!(report.stage, Stage::Narration);
    assert_eq!(report.purpose, "Narrating the story");
    assert_eq!(report.kind, "AuthorizationFailure");
    assert_eq!(report.status, Some(401));
    assert!(!report.transient);
    assert_eq!(
        report.message,
        "Narrating the story failed: provider returned HTTP 401: invalid api key"
    );
}

#[test]
fn test_transport_failure_is_transient() {
    let err = StageError::transport(Stage::Understanding, "connection reset");
    let report = FailureReport::from(&err);

    assert_eq!(report.kind, "TransportFailure");
    assert!(report.status.is_none());
    assert!(report.transient);
}

#[tokio::test]
async fn test_run_report_serializes_snake_case_fields() {
    let run = stub_pipeline(None).run("a kite stuck in a tree").await;
    let report = RunReport::from(&run);
    assert_eq!(report.state, PipelineState::Done);

    let value = serde_json::to_value(&report).expect("serialize");
    assert_eq!(value["state"], "done");
    assert_eq!(value["image"]["mime_type"], "image/png");
    assert!(value["failure"].is_null());
    assert!(value["image"].get("location").is_none());
}
