mod common;

use std::time::Duration;

use anaplan_client::{
    action::DUMP_UNAVAILABLE, report::TaskOutcome, ActionCategory, ApiError, PollPolicy,
    RetryPolicy, RunOptions,
};
use common::{connection, json_body, model_url, MockTransport};
use reqwest::Method;
use serde_json::json;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const IMPORT_ID: &str = "112000000042";
const PROCESS_ID: &str = "118000000007";
const TASK_ID: &str = "209D3CEEA1E44B0B9C4E1B56D0BE8BB4";

fn launched() -> serde_json::Value {
    json!({"task": {"taskId": TASK_ID, "taskState": "NOT_STARTED"}})
}

fn state(task_state: &str) -> serde_json::Value {
    json!({"task": {"taskId": TASK_ID, "taskState": task_state, "progress": 0.5}})
}

fn completed(current_step: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "task": {
            "taskId": TASK_ID,
            "taskState": "COMPLETE",
            "currentStep": current_step,
            "progress": 1.0,
            "result": result
        }
    })
}

fn import_result(failure_dump_available: bool) -> serde_json::Value {
    json!({
        "successful": true,
        "failureDumpAvailable": failure_dump_available,
        "objectId": IMPORT_ID,
        "details": [
            {"type": "hierarchyRowsProcessedWithFailures", "localMessageText": "2 of 10 rows failed",
             "values": ["10 rows processed", null, "2 rows failed"]}
        ]
    })
}

fn status_suffix() -> String {
    format!("/tasks/{}", TASK_ID)
}

fn fast_poll() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(10),
        timeout: None,
    }
}

#[test]
fn test_action_ids_route_by_prefix() {
    assert_eq!(ActionCategory::classify("112345").unwrap().path(), "imports");
    assert_eq!(ActionCategory::classify("116345").unwrap().path(), "exports");
    assert_eq!(ActionCategory::classify("117345").unwrap().path(), "actions");
    assert_eq!(ActionCategory::classify("118345").unwrap().path(), "processes");
}

#[tokio::test]
async fn test_unknown_category_makes_no_calls() {
    let mock = MockTransport::new();
    let err = mock
        .client()
        .run_action(&connection(), "999999", &RunOptions::new(3))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::UnknownActionCategory(id) if id == "999999"));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_parameters_rejected_for_exports() {
    let mock = MockTransport::new();
    let options = RunOptions::new(0).with_parameters([("Region", "North")]);
    let err = mock
        .client()
        .run_action(&connection(), "116000000001", &options)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::ParametersNotSupported(ActionCategory::Export)
    ));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_import_report_with_failure_dump() {
    let mock = MockTransport::new();
    mock.on_json(Method::POST, "/tasks", 200, launched());
    mock.on_json(Method::GET, &status_suffix(), 200, state("IN_PROGRESS"));
    mock.on_json(Method::GET, &status_suffix(), 200, completed("Complete.", import_result(true)));
    mock.on(
        Method::GET,
        &format!("/tasks/{}/dump", TASK_ID),
        200,
        "_Line_,_Error_1_\n4,Invalid code\n",
    );

    let options = RunOptions::new(3)
        .with_parameters([("Region", "North")])
        .with_poll(fast_poll());
    let report = mock
        .client()
        .run_action(&connection(), IMPORT_ID, &options)
        .await
        .unwrap();

    let requests = mock.requests();
    assert_eq!(
        requests[0].url,
        model_url(&format!("/imports/{}/tasks", IMPORT_ID))
    );
    assert_eq!(
        json_body(&requests[0]),
        json!({
            "localeName": "en_US",
            "mappingParameters": [{"entityType": "Region", "entityName": "North"}]
        })
    );
    assert_eq!(mock.count(Method::GET, &status_suffix()), 2);

    assert_eq!(report.task_id, TASK_ID);
    assert!(report.failure_dump_available);
    match &report.outcome {
        TaskOutcome::Single {
            details,
            failure_dump,
        } => {
            assert_eq!(details[0].detail_type, "hierarchyRowsProcessedWithFailures");
            assert_eq!(details[0].lines, vec!["10 rows processed", "", "2 rows failed"]);
            assert_eq!(
                failure_dump.as_deref(),
                Some("_Line_,_Error_1_\n4,Invalid code\n")
            );
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(report.to_string().contains("Failure dump:\n_Line_,_Error_1_"));
}

#[tokio::test]
async fn test_clean_import_fetches_no_dump() {
    let mock = MockTransport::new();
    mock.on_json(Method::POST, "/tasks", 200, launched());
    mock.on_json(Method::GET, &status_suffix(), 200, completed("Complete.", import_result(false)));

    let report = mock
        .client()
        .run_action(&connection(), IMPORT_ID, &RunOptions::new(0).with_poll(fast_poll()))
        .await
        .unwrap();
    assert!(report.failure_dumps().is_empty());
    assert_eq!(mock.count(Method::GET, "/dump"), 0);
    // no parameters, no mappingParameters key
    assert_eq!(json_body(&mock.requests()[0]), json!({"localeName": "en_US"}));
}

#[tokio::test]
async fn test_process_fetches_dumps_only_for_failed_steps() {
    let mock = MockTransport::new();
    mock.on_json(Method::POST, "/tasks", 200, launched());
    mock.on_json(
        Method::GET,
        &status_suffix(),
        200,
        completed(
            "Complete.",
            json!({
                "successful": false,
                "failureDumpAvailable": true,
                "objectId": PROCESS_ID,
                "nestedResults": [
                    {"objectId": "112000000001", "successful": true, "failureDumpAvailable": false,
                     "details": [{"type": "hierarchyRowsProcessed", "values": ["5 rows"]}]},
                    {"objectId": "112000000002", "successful": false, "failureDumpAvailable": true,
                     "details": [{"type": "hierarchyRowsProcessedWithFailures", "values": ["1 row failed"]}]}
                ]
            }),
        ),
    );
    mock.on(
        Method::GET,
        &format!("/tasks/{}/dumps/112000000002", TASK_ID),
        200,
        "_Line_,_Error_1_\n2,Unknown item\n",
    );

    let report = mock
        .client()
        .run_action(&connection(), PROCESS_ID, &RunOptions::new(0).with_poll(fast_poll()))
        .await
        .unwrap();

    assert!(mock.requests()[0]
        .url
        .ends_with(&format!("/processes/{}/tasks", PROCESS_ID)));
    assert_eq!(mock.count(Method::GET, "/dumps/112000000002"), 1);
    assert_eq!(mock.count(Method::GET, "/dumps/112000000001"), 0);

    match &report.outcome {
        TaskOutcome::Process { steps } => {
            assert_eq!(steps.len(), 2);
            assert!(steps[0].failure_dump.is_none());
            assert_eq!(
                steps[1].failure_dump.as_deref(),
                Some("_Line_,_Error_1_\n2,Unknown item\n")
            );
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    let text = report.to_string();
    assert!(text.contains("Process action 112000000001 completed. Failure: false"));
    assert!(text.contains("Error dump for 112000000002"));
}

#[tokio::test]
async fn test_unreachable_dump_keeps_the_report() {
    let mock = MockTransport::new();
    mock.on_json(Method::POST, "/tasks", 200, launched());
    mock.on_json(Method::GET, &status_suffix(), 200, completed("Complete.", import_result(true)));
    mock.on(
        Method::GET,
        &format!("/tasks/{}/dump", TASK_ID),
        500,
        "dump service down",
    );

    let report = mock
        .client()
        .run_action(&connection(), IMPORT_ID, &RunOptions::new(0).with_poll(fast_poll()))
        .await
        .unwrap();

    assert!(report.successful);
    assert!(report.failure_dump_available);
    match &report.outcome {
        TaskOutcome::Single {
            details,
            failure_dump,
        } => {
            assert_eq!(details[0].detail_type, "hierarchyRowsProcessedWithFailures");
            let dump = failure_dump.as_deref().unwrap();
            assert!(dump.starts_with(DUMP_UNAVAILABLE));
            assert!(dump.contains("dump service down"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_step_dump_keeps_the_other_steps() {
    let mock = MockTransport::new();
    mock.on_json(Method::POST, "/tasks", 200, launched());
    mock.on_json(
        Method::GET,
        &status_suffix(),
        200,
        completed(
            "Complete.",
            json!({
                "successful": false,
                "failureDumpAvailable": true,
                "nestedResults": [
                    {"objectId": "112000000001", "successful": false, "failureDumpAvailable": true,
                     "details": [{"type": "hierarchyRowsProcessedWithFailures", "values": ["1 row failed"]}]},
                    {"objectId": "112000000002", "successful": false, "failureDumpAvailable": true,
                     "details": [{"type": "hierarchyRowsProcessedWithFailures", "values": ["3 rows failed"]}]}
                ]
            }),
        ),
    );
    mock.on(
        Method::GET,
        &format!("/tasks/{}/dumps/112000000001", TASK_ID),
        503,
        "try later",
    );
    mock.on(
        Method::GET,
        &format!("/tasks/{}/dumps/112000000002", TASK_ID),
        200,
        "_Line_,_Error_1_\n7,Unknown item\n",
    );

    let report = mock
        .client()
        .run_action(&connection(), PROCESS_ID, &RunOptions::new(0).with_poll(fast_poll()))
        .await
        .unwrap();

    match &report.outcome {
        TaskOutcome::Process { steps } => {
            assert_eq!(steps.len(), 2);
            let first = steps[0].failure_dump.as_deref().unwrap();
            assert!(first.starts_with(DUMP_UNAVAILABLE));
            assert!(first.contains("try later"));
            assert_eq!(
                steps[1].failure_dump.as_deref(),
                Some("_Line_,_Error_1_\n7,Unknown item\n")
            );
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_task_is_an_error() {
    let mock = MockTransport::new();
    mock.on_json(Method::POST, "/tasks", 200, launched());
    mock.on_json(
        Method::GET,
        &status_suffix(),
        200,
        completed(
            "Failed.",
            json!({"successful": false, "details": [{"type": "importFailedMissingFile"}]}),
        ),
    );

    let err = mock
        .client()
        .run_action(&connection(), IMPORT_ID, &RunOptions::new(0).with_poll(fast_poll()))
        .await
        .unwrap_err();
    match err {
        ApiError::TaskFailed { task_id, reason } => {
            assert_eq!(task_id, TASK_ID);
            assert_eq!(reason, "importFailedMissingFile");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_cancelled_task_is_an_error() {
    let mock = MockTransport::new();
    mock.on_json(Method::POST, "/tasks", 200, launched());
    mock.on_json(Method::GET, &status_suffix(), 200, state("CANCELLED"));

    let err = mock
        .client()
        .run_action(&connection(), IMPORT_ID, &RunOptions::new(0).with_poll(fast_poll()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::TaskCancelled { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_launch_retries_with_backoff() {
    let mock = MockTransport::new();
    mock.on(Method::POST, "/tasks", 500, "busy");
    mock.on(Method::POST, "/tasks", 503, "still busy");
    mock.on_json(Method::POST, "/tasks", 200, launched());
    mock.on_json(Method::GET, &status_suffix(), 200, completed("Complete.", import_result(false)));

    let started = Instant::now();
    let report = mock
        .client()
        .run_action(&connection(), IMPORT_ID, &RunOptions::new(3))
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(report.task_id, TASK_ID);
    assert_eq!(mock.count(Method::POST, "/tasks"), 3);
    // 10s, then 15s
    assert!(elapsed >= Duration::from_secs(25), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(26), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_launch_gives_up_after_max_retries() {
    let mock = MockTransport::new();
    mock.on(Method::POST, "/tasks", 503, "Service Unavailable");

    let started = Instant::now();
    let err = mock
        .client()
        .run_action(&connection(), IMPORT_ID, &RunOptions::new(2))
        .await
        .unwrap_err();

    match err {
        ApiError::RetriesExhausted {
            attempts,
            status,
            message,
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(status, 503);
            assert_eq!(message, "Service Unavailable");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(mock.count(Method::POST, "/tasks"), 3);
    assert_eq!(mock.count(Method::GET, &status_suffix()), 0);
    assert!(started.elapsed() >= Duration::from_secs(25));
}

#[tokio::test(start_paused = true)]
async fn test_zero_retries_tries_once() {
    let mock = MockTransport::new();
    mock.on(Method::POST, "/tasks", 500, "busy");

    let started = Instant::now();
    let err = mock
        .client()
        .run_action(&connection(), IMPORT_ID, &RunOptions::new(0))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::RetriesExhausted { attempts: 1, .. }));
    assert_eq!(mock.count(Method::POST, "/tasks"), 1);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_custom_backoff_schedule() {
    let mock = MockTransport::new();
    mock.on(Method::POST, "/tasks", 500, "busy");
    mock.on_json(Method::POST, "/tasks", 200, launched());
    mock.on_json(Method::GET, &status_suffix(), 200, completed("Complete.", import_result(false)));

    let options = RunOptions::default().with_retry(RetryPolicy {
        max_retries: 1,
        initial_delay: Duration::from_secs(2),
        multiplier: 2.0,
    });
    let started = Instant::now();
    mock.client()
        .run_action(&connection(), IMPORT_ID, &options)
        .await
        .unwrap();
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(2) && elapsed < Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_polling_times_out() {
    let mock = MockTransport::new();
    mock.on_json(Method::POST, "/tasks", 200, launched());
    mock.on_json(Method::GET, &status_suffix(), 200, state("IN_PROGRESS"));

    let options = RunOptions::new(0).with_poll(PollPolicy {
        interval: Duration::from_secs(1),
        timeout: Some(Duration::from_secs(5)),
    });
    let err = mock
        .client()
        .run_action(&connection(), IMPORT_ID, &options)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::PollTimeout { elapsed_secs: 5, .. }));
    assert_eq!(mock.count(Method::GET, &status_suffix()), 6);
}

#[tokio::test(start_paused = true)]
async fn test_polling_stops_when_cancelled() {
    let mock = MockTransport::new();
    mock.on_json(Method::POST, "/tasks", 200, launched());
    mock.on_json(Method::GET, &status_suffix(), 200, state("IN_PROGRESS"));

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(3500)).await;
        trigger.cancel();
    });

    let options = RunOptions::new(0)
        .with_poll(PollPolicy {
            interval: Duration::from_secs(1),
            timeout: None,
        })
        .with_cancellation(token);
    let err = mock
        .client()
        .run_action(&connection(), IMPORT_ID, &options)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Cancelled));
    assert_eq!(mock.count(Method::GET, &status_suffix()), 4);
}
