//! Built-in suites against the mock demo site

mod common;

use std::sync::Arc;

use common::{mock_sessions, test_config, BASE};
use harness_oxide::runner::{
    ErrorKind, FileStatus, ParallelScheduler, RunRequest, RunStatus, TestExecutor, TestStatus,
};
use harness_oxide::selector::Strategy;
use harness_oxide::session::SessionManager;
use harness_oxide::suites;

#[tokio::test(start_paused = true)]
async fn test_login_suite_passes() {
    let (manager, _) = mock_sessions();
    let registry = suites::registry_for(BASE);
    let mut executor = TestExecutor::new(manager, test_config(), "login_run");

    let file = executor
        .run_test_file(registry.get("suites/login.rs").unwrap(), None, None, |_| {})
        .await;

    assert_eq!(file.status, FileStatus::Completed);
    assert_eq!(file.totals.passed, 1, "{:?}", file.tests);
}

#[tokio::test(start_paused = true)]
async fn test_interaction_suite_passes() {
    let (manager, factory) = mock_sessions();
    let registry = suites::registry_for(BASE);
    let mut executor = TestExecutor::new(manager, test_config(), "interactions_run");

    let file = executor
        .run_test_file(registry.get("suites/herokuapp.rs").unwrap(), None, None, |_| {})
        .await;

    for test in &file.tests {
        assert_eq!(test.status, TestStatus::Passed, "{}: {:?}", test.name, test.error);
    }
    assert_eq!(file.totals.total, 5);

    // One session for the whole file
    assert_eq!(factory.drivers().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_all_suites_through_scheduler() {
    let (manager, factory) = mock_sessions();
    let scheduler = ParallelScheduler::new(
        Arc::new(suites::registry_for(BASE)),
        manager.clone(),
        test_config(),
    );

    let run_id = scheduler
        .run_parallel(RunRequest {
            paths: suites::registry_for(BASE).paths(),
            ..Default::default()
        })
        .unwrap();
    let snapshot = scheduler.wait(&run_id).await.unwrap();

    assert_eq!(snapshot.status, RunStatus::Completed);
    let t = snapshot.aggregate.totals;
    assert_eq!((t.total, t.passed, t.failed, t.skipped), (11, 9, 2, 0));

    let timeout_file = &snapshot.aggregate.files["suites/element_timeout.rs"];
    let timed_out = timeout_file
        .tests
        .iter()
        .find(|r| r.name == "test_element_timeout_example")
        .unwrap();
    assert_eq!(timed_out.error_kind, Some(ErrorKind::ElementTimeout));
    assert_eq!(timed_out.selector.as_deref(), Some("div#starts button"));
    assert_eq!(timed_out.selector_type, Some(Strategy::Css));
    assert_eq!(timed_out.timeout, Some(3.0));

    let retries_file = &snapshot.aggregate.files["suites/element_retries.rs"];
    let exhausted = &retries_file.tests[0];
    assert_eq!(exhausted.status, TestStatus::Failed);
    assert!(exhausted.error_kind.is_none());
    assert_eq!(exhausted.error.as_deref(), Some("start button not found"));

    assert_eq!(factory.drivers().len(), 4);
    assert!(factory.drivers().iter().all(|d| d.is_quit()));
    assert_eq!(manager.session_count(), 0);
}
