//! Test executor
//!
//! Runs test functions against one exclusively owned session. A test moves
//! `running -> passed | failed` exactly once; panics count as failures.
//! Screenshots are best-effort diagnostics and never change an outcome.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};

use super::registry::{TestCase, TestFile, TestRegistry};
use super::result::{FileAggregate, FileStatus, RunAggregate, TestResult};
use crate::commands::Commands;
use crate::config::Config;
use crate::driver::{BrowserOptions, BrowserType};
use crate::session::SessionManager;
use crate::{Error, Result};

/// Single-session test executor
#[derive(Debug)]
pub struct TestExecutor {
    sessions: Arc<dyn SessionManager>,
    config: Arc<Config>,
    session_id: String,
    commands: Option<Commands>,
}

impl TestExecutor {
    /// Create an executor
    ///
    /// # Arguments
    /// * `sessions` - Session manager the browser is acquired from
    /// * `config` - Harness configuration
    /// * `session_id` - Id the session is registered under
    pub fn new(sessions: Arc<dyn SessionManager>, config: Arc<Config>, session_id: &str) -> Self {
        Self {
            sessions,
            config,
            session_id: session_id.to_string(),
            commands: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Commands bound to the live session, if set up
    pub fn commands(&self) -> Option<&Commands> {
        self.commands.as_ref()
    }

    /// Start the browser and bind the command groups to it
    ///
    /// `browser` defaults to the configured browser. Unknown names fail with
    /// `UnsupportedBrowser` before any browser is started.
    pub async fn setup(&mut self, browser: Option<&str>) -> Result<Commands> {
        if let Some(commands) = &self.commands {
            return Ok(commands.clone());
        }

        let browser: BrowserType = browser.unwrap_or(&self.config.default_browser).parse()?;
        let options = BrowserOptions::from_config(browser, &self.config);
        info!("Setting up {} session {}", browser, self.session_id);

        let session = self.sessions.create_session(&self.session_id, options).await?;
        let commands = Commands::new(&session, &self.config);
        self.commands = Some(commands.clone());
        Ok(commands)
    }

    /// Release the session; safe to call repeatedly
    pub async fn teardown(&mut self) {
        if self.commands.take().is_none() {
            return;
        }
        match self.sessions.close_session(&self.session_id).await {
            Ok(()) => info!("Closed session {}", self.session_id),
            Err(e) => warn!("Failed to close session {}: {}", self.session_id, e),
        }
    }

    /// Run one test function
    ///
    /// Fails only when the executor has not been set up; the test's own
    /// failure is reported in the returned result.
    pub async fn run_test(&self, file: &str, case: &TestCase) -> Result<TestResult> {
        let commands = self
            .commands
            .clone()
            .ok_or_else(|| Error::internal("Executor has no session; call setup() first"))?;

        let span = info_span!("test", name = %case.name, session = %self.session_id);
        Ok(self.execute(file, case, commands).instrument(span).await)
    }

    async fn execute(&self, file: &str, case: &TestCase, commands: Commands) -> TestResult {
        info!("Running test: {}", case.name);
        let running = TestResult::running(&case.name, file);
        let started = Instant::now();

        let outcome = AssertUnwindSafe((case.func)(commands.clone()))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(anyhow::anyhow!("Test panicked: {}", panic_message(panic.as_ref())))
            });

        match outcome {
            Ok(()) => {
                info!("Test passed: {}", case.name);
                let mut result = running.passed(started.elapsed());
                if self.config.take_screenshot_on_success {
                    result.screenshot = capture(&commands, &format!("success_{}", case.name)).await;
                }
                result
            }
            Err(e) => {
                error!("Test failed: {} - {:#}", case.name, e);
                let mut result = running.failed(&e, started.elapsed());
                if self.config.take_screenshot_on_failure {
                    result.screenshot = capture(&commands, &format!("failure_{}", case.name)).await;
                }
                result
            }
        }
    }

    /// Run every selected test of a file in one session
    ///
    /// Unselected tests are recorded as skipped; `selection` of `None` runs
    /// everything. `report` sees the file record after every change. The
    /// session is torn down on every path out of this call.
    pub async fn run_test_file(
        &mut self,
        file: &TestFile,
        selection: Option<&[String]>,
        browser: Option<&str>,
        mut report: impl FnMut(&FileAggregate),
    ) -> FileAggregate {
        info!("Running tests from file: {}", file.path);
        let mut aggregate = FileAggregate::new(&file.path, file.cases.len());
        aggregate.session_id = Some(self.session_id.clone());
        aggregate.status = FileStatus::Running;
        report(&aggregate);

        if let Err(e) = self.setup(browser).await {
            error!("Setup failed for {}: {}", file.path, e);
            aggregate.mark_error(e.to_string());
            self.teardown().await;
            report(&aggregate);
            return aggregate;
        }

        for case in &file.cases {
            let selected = selection.map_or(true, |names| names.iter().any(|n| *n == case.name));
            if !selected {
                aggregate.record(TestResult::skipped(&case.name, &file.path));
                report(&aggregate);
                continue;
            }

            let index = aggregate.begin(TestResult::running(&case.name, &file.path));
            report(&aggregate);
            let result = match self.run_test(&file.path, case).await {
                Ok(result) => result,
                Err(e) => TestResult::running(&case.name, &file.path)
                    .failed(&anyhow::Error::new(e), Duration::ZERO),
            };
            aggregate.complete(index, result);
            report(&aggregate);
        }

        self.teardown().await;
        aggregate.status = FileStatus::Completed;
        report(&aggregate);
        aggregate
    }

    /// Run every registered file under `dir`, one after another
    pub async fn run_test_directory(
        &mut self,
        registry: &TestRegistry,
        dir: &str,
        browser: Option<&str>,
    ) -> Result<RunAggregate> {
        info!("Running tests from directory: {}", dir);
        let files = registry.files_under(dir);
        if files.is_empty() {
            return Err(Error::TestFileNotFound(dir.to_string()));
        }

        let mut aggregate = RunAggregate::default();
        for file in files {
            let result = self.run_test_file(file, None, browser, |_| {}).await;
            aggregate.merge_file(result);
        }
        Ok(aggregate)
    }
}

/// Best-effort screenshot
async fn capture(commands: &Commands, name: &str) -> Option<std::path::PathBuf> {
    match commands.browser.screenshot(name).await {
        Ok(path) => Some(path),
        Err(e) => {
            warn!("Failed to capture screenshot {}: {}", name, e);
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
