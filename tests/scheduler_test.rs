//! Parallel scheduler integration tests

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{mock_sessions, test_config, BASE};
use harness_oxide::runner::{
    file_session_id, FileStatus, ParallelScheduler, RunRequest, RunStatus, TestExecutor, TestFile,
    TestRegistry, TestStatus,
};
use harness_oxide::session::SessionManager;
use harness_oxide::{suites, Error};

fn slow_registry() -> TestRegistry {
    TestRegistry::new()
        .register(TestFile::new("slow/a.rs").case("test_long", |_| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }))
        .register(TestFile::new("slow/b.rs").case("test_long", |_| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }))
}

#[tokio::test(start_paused = true)]
async fn test_parallel_totals_match_sequential() {
    let (manager, _) = mock_sessions();
    let registry = Arc::new(suites::registry_for(BASE));

    let mut executor = TestExecutor::new(manager.clone(), test_config(), "sequential");
    let sequential = executor
        .run_test_directory(&registry, "suites", None)
        .await
        .unwrap();

    let scheduler = ParallelScheduler::new(registry.clone(), manager, test_config());
    let run_id = scheduler
        .run_parallel(RunRequest {
            paths: registry.paths(),
            max_workers: 4,
            ..Default::default()
        })
        .unwrap();
    let parallel = scheduler.wait(&run_id).await.unwrap().aggregate;

    assert_eq!(parallel.totals, sequential.totals);
    assert_eq!(parallel.tests.len(), sequential.tests.len());
    for (path, file) in &parallel.files {
        assert_eq!(file.status, FileStatus::Completed);
        assert_eq!(
            file.session_id.as_deref(),
            Some(file_session_id(&run_id, path).as_str())
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_worker_bound_is_respected() {
    let (manager, _) = mock_sessions();
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut registry = TestRegistry::new();
    for i in 0..5 {
        let (active, peak) = (active.clone(), peak.clone());
        registry = registry.register(TestFile::new(&format!("bound/{}.rs", i)).case(
            "test_busy",
            move |_| {
                let (active, peak) = (active.clone(), peak.clone());
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        ));
    }
    let paths = registry.paths();

    let scheduler = ParallelScheduler::new(Arc::new(registry), manager, test_config());
    let run_id = scheduler
        .run_parallel(RunRequest {
            paths,
            max_workers: 2,
            ..Default::default()
        })
        .unwrap();
    let snapshot = scheduler.wait(&run_id).await.unwrap();

    assert_eq!(snapshot.aggregate.totals.passed, 5);
    assert_eq!(peak.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_stop_sweeps_run_sessions() {
    let (manager, factory) = mock_sessions();
    let scheduler = ParallelScheduler::new(Arc::new(slow_registry()), manager.clone(), test_config());

    let run_id = scheduler
        .run_parallel(RunRequest {
            paths: vec!["slow/a.rs".to_string(), "slow/b.rs".to_string()],
            max_workers: 1,
            ..Default::default()
        })
        .unwrap();

    while manager.session_count() == 0 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Live progress is visible while run counters stay at zero
    let live = scheduler.poll(&run_id).unwrap();
    assert_eq!(live.status, RunStatus::Running);
    assert_eq!(live.aggregate.totals.total, 0);
    let first = &live.aggregate.files["slow/a.rs"];
    assert_eq!(first.status, FileStatus::Running);
    assert_eq!(first.tests[0].status, TestStatus::Running);
    assert_eq!(live.aggregate.files["slow/b.rs"].status, FileStatus::Pending);

    let stopped = scheduler.stop(&run_id).await.unwrap();
    assert_eq!(stopped.status, RunStatus::Stopped);
    assert_eq!(manager.session_count(), 0);
    assert!(factory.drivers().iter().all(|d| d.is_quit()));
    assert_eq!(factory.drivers().len(), 1);

    // Terminal runs stay put
    assert_eq!(scheduler.wait(&run_id).await.unwrap().status, RunStatus::Stopped);
    assert_eq!(scheduler.stop(&run_id).await.unwrap().status, RunStatus::Stopped);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(scheduler.poll(&run_id).unwrap().status, RunStatus::Stopped);
    assert_eq!(factory.drivers().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_returns_after_workers_are_gone() {
    let (manager, _) = mock_sessions();
    let alive = Arc::new(());
    let held = alive.clone();
    let registry = TestRegistry::new().register(TestFile::new("slow/held.rs").case(
        "test_hold",
        move |_| {
            let held = held.clone();
            async move {
                let _held = held;
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }
        },
    ));
    let scheduler = ParallelScheduler::new(Arc::new(registry), manager.clone(), test_config());

    let run_id = scheduler.start_run("slow/held.rs", None).unwrap();
    // The registered case and this test hold two references; a running case holds a third
    while Arc::strong_count(&alive) < 3 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let stopped = scheduler.stop(&run_id).await.unwrap();
    assert_eq!(stopped.status, RunStatus::Stopped);
    assert_eq!(Arc::strong_count(&alive), 2);
    assert_eq!(manager.session_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stop_right_after_start_leaves_no_sessions() {
    let (manager, _) = mock_sessions();
    let scheduler = ParallelScheduler::new(Arc::new(slow_registry()), manager.clone(), test_config());

    for _ in 0..20 {
        let run_id = scheduler
            .run_parallel(RunRequest {
                paths: vec!["slow/a.rs".to_string(), "slow/b.rs".to_string()],
                max_workers: 2,
                ..Default::default()
            })
            .unwrap();
        tokio::task::yield_now().await;

        let stopped = scheduler.stop(&run_id).await.unwrap();
        assert_eq!(stopped.status, RunStatus::Stopped);
        assert_eq!(manager.session_count(), 0);
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(manager.session_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_paths_run_once() {
    let (manager, factory) = mock_sessions();
    let registry = Arc::new(suites::registry_for(BASE));
    let planned = registry.get("suites/login.rs").unwrap().cases.len();
    let scheduler = ParallelScheduler::new(registry, manager, test_config());

    let run_id = scheduler
        .run_parallel(RunRequest {
            paths: vec!["suites/login.rs".to_string(), "suites/login.rs".to_string()],
            max_workers: 2,
            ..Default::default()
        })
        .unwrap();
    let snapshot = scheduler.wait(&run_id).await.unwrap();

    assert_eq!(snapshot.status, RunStatus::Completed);
    assert_eq!(snapshot.aggregate.files.len(), 1);
    let file = &snapshot.aggregate.files["suites/login.rs"];
    assert_eq!(file.status, FileStatus::Completed);
    let t = snapshot.aggregate.totals;
    assert_eq!((t.total, t.passed, t.failed), (planned, planned, 0));
    assert!(!snapshot.aggregate.has_failures());
    assert_eq!(factory.drivers().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_leaves_other_runs_alone() {
    let (manager, _) = mock_sessions();
    let scheduler = ParallelScheduler::new(Arc::new(slow_registry()), manager.clone(), test_config());

    let doomed = scheduler.start_run("slow/a.rs", None).unwrap();
    let survivor = scheduler.start_run("slow/b.rs", None).unwrap();
    while manager.session_count() < 2 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    scheduler.stop(&doomed).await.unwrap();
    let remaining = manager.list_sessions().unwrap();
    assert_eq!(remaining, vec![file_session_id(&survivor, "slow/b.rs")]);

    let done = scheduler.wait(&survivor).await.unwrap();
    assert_eq!(done.status, RunStatus::Completed);
    assert_eq!(done.aggregate.totals.passed, 1);
}

#[tokio::test]
async fn test_unsupported_browser_marks_files_errored() {
    let (manager, factory) = mock_sessions();
    let registry = Arc::new(suites::registry_for(BASE));
    let scheduler = ParallelScheduler::new(registry.clone(), manager, test_config());

    let run_id = scheduler
        .run_parallel(RunRequest {
            paths: registry.paths(),
            browser: Some("opera".to_string()),
            ..Default::default()
        })
        .unwrap();
    let snapshot = scheduler.wait(&run_id).await.unwrap();

    assert_eq!(snapshot.status, RunStatus::Completed);
    assert_eq!(snapshot.aggregate.totals.total, 0);
    assert!(snapshot.aggregate.has_failures());
    for file in snapshot.aggregate.files.values() {
        assert_eq!(file.status, FileStatus::Error);
        assert!(file.error.as_deref().unwrap().contains("opera"));
    }
    assert!(factory.drivers().is_empty());
}

#[tokio::test]
async fn test_unknown_runs_and_files() {
    let (manager, _) = mock_sessions();
    let scheduler = ParallelScheduler::new(Arc::new(slow_registry()), manager, test_config());

    assert!(matches!(scheduler.poll("missing"), Err(Error::RunNotFound(_))));
    assert!(matches!(scheduler.stop("missing").await, Err(Error::RunNotFound(_))));
    assert!(matches!(
        scheduler.run_parallel(RunRequest {
            paths: vec!["slow/a.rs".to_string(), "slow/zzz.rs".to_string()],
            ..Default::default()
        }),
        Err(Error::TestFileNotFound(_))
    ));
    assert!(scheduler.runs().unwrap().is_empty());
}
