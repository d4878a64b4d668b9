//! # Test runner
//!
//! Executes registered test functions against live sessions and collects
//! structured results.
//!
//! ## Module structure
//! - `result`: `TestResult`, per-file and per-run aggregates, run snapshots
//! - `registry`: test functions registered by file path
//! - `executor`: one session, sequential tests, setup and teardown
//! - `scheduler`: file-level parallel runs with polling and cancellation
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use harness_oxide::config::Config;
//! use harness_oxide::runner::{ParallelScheduler, RunRequest, TestFile, TestRegistry};
//! use harness_oxide::session::SessionManagerImpl;
//!
//! # async fn example() -> harness_oxide::Result<()> {
//! let registry = TestRegistry::new().register(
//!     TestFile::new("smoke/home.rs").case("test_home", |cmd| async move {
//!         cmd.browser.navigate("https://the-internet.herokuapp.com/").await?;
//!         anyhow::ensure!(cmd.validation.assert_title("The Internet").await?, "wrong title");
//!         Ok(())
//!     }),
//! );
//!
//! let config = Arc::new(Config::load(None)?);
//! let sessions = Arc::new(SessionManagerImpl::webdriver(&config.webdriver_url));
//! let scheduler = ParallelScheduler::new(Arc::new(registry), sessions, config);
//!
//! let run_id = scheduler.run_parallel(RunRequest {
//!     paths: vec!["smoke/home.rs".to_string()],
//!     max_workers: 2,
//!     ..Default::default()
//! })?;
//! let snapshot = scheduler.wait(&run_id).await?;
//! println!("{} passed", snapshot.aggregate.totals.passed);
//! # Ok(())
//! # }
//! ```

pub mod result;
pub mod registry;
pub mod executor;
pub mod scheduler;


pub use executor::TestExecutor;
pub use registry::{TestCase, TestFile, TestFn, TestRegistry};
pub use result::{
    ErrorKind, FileAggregate, FileStatus, RunAggregate, RunSnapshot, RunStatus, TestResult,
    TestStatus, Totals,
};
pub use scheduler::{file_session_id, ParallelScheduler, RunRequest};
