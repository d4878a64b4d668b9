//! Run result records
//!
//! `TestResult` is one test's outcome, `FileAggregate` one file's, and
//! `RunAggregate` the merged view of a whole run. Counters only ever move
//! when a result reaches a terminal status, so
//! `total == passed + failed + skipped` holds at every point.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::selector::Strategy;
use crate::Error;

/// Test status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Running,
    Passed,
    Failed,
    Skipped,
}

impl TestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TestStatus::Running)
    }
}

/// Structured failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ElementTimeout,
    WaitTimeout,
}

/// Outcome of one test function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub file: String,
    pub status: TestStatus,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    /// Selector value of an element timeout
    pub selector: Option<String>,
    pub selector_type: Option<Strategy>,
    /// Wait budget of an element timeout, in seconds
    pub timeout: Option<f64>,
    /// Opaque screenshot location
    pub screenshot: Option<PathBuf>,
    pub duration_ms: u64,
}

impl TestResult {
    fn new(name: &str, file: &str, status: TestStatus) -> Self {
        Self {
            name: name.to_string(),
            file: file.to_string(),
            status,
            error: None,
            error_kind: None,
            selector: None,
            selector_type: None,
            timeout: None,
            screenshot: None,
            duration_ms: 0,
        }
    }

    /// Result of a test that has just been invoked
    pub fn running(name: &str, file: &str) -> Self {
        Self::new(name, file, TestStatus::Running)
    }

    /// Result of a test that was not selected for the run
    pub fn skipped(name: &str, file: &str) -> Self {
        Self::new(name, file, TestStatus::Skipped)
    }

    /// Terminal transition for a test that returned normally
    pub fn passed(self, elapsed: Duration) -> Self {
        Self {
            status: TestStatus::Passed,
            duration_ms: elapsed.as_millis() as u64,
            ..self
        }
    }

    /// Terminal transition for a test that raised
    ///
    /// Element and wait timeouts anywhere in the error chain fill the
    /// structured fields; everything else only sets `error`.
    pub fn failed(self, error: &anyhow::Error, elapsed: Duration) -> Self {
        let mut result = Self {
            status: TestStatus::Failed,
            error: Some(error.to_string()),
            duration_ms: elapsed.as_millis() as u64,
            ..self
        };

        match error.chain().find_map(|cause| cause.downcast_ref::<Error>()) {
            Some(Error::ElementTimeout {
                selector,
                strategy,
                timeout,
            }) => {
                result.error_kind = Some(ErrorKind::ElementTimeout);
                result.selector = Some(selector.clone());
                result.selector_type = Some(*strategy);
                result.timeout = Some(timeout.as_secs_f64());
            }
            Some(Error::WaitTimeout { .. }) => result.error_kind = Some(ErrorKind::WaitTimeout),
            _ => {}
        }
        result
    }
}

/// Pass/fail/skip counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Totals {
    /// Count one terminal result; running results are ignored
    pub fn record(&mut self, status: TestStatus) {
        match status {
            TestStatus::Running => return,
            TestStatus::Passed => self.passed += 1,
            TestStatus::Failed => self.failed += 1,
            TestStatus::Skipped => self.skipped += 1,
        }
        self.total += 1;
    }

    pub fn merge(&mut self, other: &Totals) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

/// Lifecycle of one file within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Pending,
    Running,
    Completed,
    Error,
}

/// Results of one test file, written by the single worker running it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAggregate {
    pub path: String,
    pub session_id: Option<String>,
    pub status: FileStatus,
    /// Number of test functions in the file
    pub planned: usize,
    #[serde(flatten)]
    pub totals: Totals,
    pub tests: Vec<TestResult>,
    pub error: Option<String>,
}

impl FileAggregate {
    pub fn new(path: &str, planned: usize) -> Self {
        Self {
            path: path.to_string(),
            session_id: None,
            status: FileStatus::Pending,
            planned,
            totals: Totals::default(),
            tests: Vec::new(),
            error: None,
        }
    }

    /// Append a running entry and return its index
    pub fn begin(&mut self, result: TestResult) -> usize {
        self.tests.push(result);
        self.tests.len() - 1
    }

    /// Replace the running entry at `index` with its terminal result
    pub fn complete(&mut self, index: usize, result: TestResult) {
        self.totals.record(result.status);
        match self.tests.get_mut(index) {
            Some(slot) => *slot = result,
            None => self.tests.push(result),
        }
    }

    /// Append a result that is already terminal
    pub fn record(&mut self, result: TestResult) {
        self.totals.record(result.status);
        self.tests.push(result);
    }

    /// Mark the whole file as failed to run
    pub fn mark_error(&mut self, message: impl Into<String>) {
        self.status = FileStatus::Error;
        self.error = Some(message.into());
    }
}

/// Merged results of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunAggregate {
    #[serde(flatten)]
    pub totals: Totals,
    /// Test results of completed files, in completion order
    pub tests: Vec<TestResult>,
    /// Per-file sub-records keyed by path
    pub files: BTreeMap<String, FileAggregate>,
}

impl RunAggregate {
    /// Publish a file's in-progress state without touching the run counters
    pub fn update_file(&mut self, file: FileAggregate) {
        self.files.insert(file.path.clone(), file);
    }

    /// Fold a finished file into the run counters
    pub fn merge_file(&mut self, file: FileAggregate) {
        self.totals.merge(&file.totals);
        self.tests.extend(file.tests.iter().cloned());
        self.update_file(file);
    }

    /// Whether any test failed or any file could not run
    pub fn has_failures(&self) -> bool {
        self.totals.failed > 0 || self.files.values().any(|f| f.status == FileStatus::Error)
    }
}

/// Status of a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Stopped,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

/// Point-in-time view of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub run_id: String,
    pub status: RunStatus,
    pub aggregate: RunAggregate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_timeout_fills_structured_fields() {
        let error = anyhow::Error::new(Error::ElementTimeout {
            selector: "username".into(),
            strategy: Strategy::Id,
            timeout: Duration::from_secs(3),
        })
        .context("login form did not render");

        let result = TestResult::running("test_login", "suites/login.rs")
            .failed(&error, Duration::from_millis(3200));

        assert_eq!(result.status, TestStatus::Failed);
        assert_eq!(result.error.as_deref(), Some("login form did not render"));
        assert_eq!(result.error_kind, Some(ErrorKind::ElementTimeout));
        assert_eq!(result.selector.as_deref(), Some("username"));
        assert_eq!(result.selector_type, Some(Strategy::Id));
        assert_eq!(result.timeout, Some(3.0));
        assert_eq!(result.duration_ms, 3200);
    }

    #[test]
    fn test_generic_failure_sets_only_message() {
        let error = anyhow::anyhow!("expected flash message");
        let result = TestResult::running("t", "f").failed(&error, Duration::ZERO);

        assert_eq!(result.error.as_deref(), Some("expected flash message"));
        assert!(result.error_kind.is_none());
        assert!(result.selector.is_none());
    }

    #[test]
    fn test_passed_has_no_error() {
        let result = TestResult::running("t", "f").passed(Duration::from_millis(15));
        assert_eq!(result.status, TestStatus::Passed);
        assert!(result.error.is_none());
        assert_eq!(result.duration_ms, 15);
    }

    #[test]
    fn test_totals_ignore_running_entries() {
        let mut file = FileAggregate::new("suites/form.rs", 3);
        let first = file.begin(TestResult::running("a", "suites/form.rs"));
        assert_eq!(file.totals.total, 0);

        file.complete(first, TestResult::running("a", "suites/form.rs").passed(Duration::ZERO));
        file.record(TestResult::skipped("b", "suites/form.rs"));
        let third = file.begin(TestResult::running("c", "suites/form.rs"));
        file.complete(
            third,
            TestResult::running("c", "suites/form.rs").failed(&anyhow::anyhow!("x"), Duration::ZERO),
        );

        let t = file.totals;
        assert_eq!((t.total, t.passed, t.failed, t.skipped), (3, 1, 1, 1));
        assert_eq!(t.total, t.passed + t.failed + t.skipped);
        assert_eq!(file.tests.len(), 3);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let mut a = FileAggregate::new("a", 1);
        a.record(TestResult::running("x", "a").passed(Duration::ZERO));
        let mut b = FileAggregate::new("b", 2);
        b.record(TestResult::running("y", "b").failed(&anyhow::anyhow!("no"), Duration::ZERO));
        b.record(TestResult::skipped("z", "b"));

        let mut forward = RunAggregate::default();
        forward.merge_file(a.clone());
        forward.merge_file(b.clone());
        let mut backward = RunAggregate::default();
        backward.merge_file(b);
        backward.merge_file(a);

        assert_eq!(forward.totals, backward.totals);
        assert_eq!(forward.files, backward.files);
        assert!(forward.has_failures());
    }

    #[test]
    fn test_serialized_shape() {
        let mut file = FileAggregate::new("suites/login.rs", 1);
        file.record(TestResult::running("t", "suites/login.rs").passed(Duration::ZERO));
        let json = serde_json::to_value(&file).unwrap();

        assert_eq!(json["status"], "pending");
        assert_eq!(json["total"], 1);
        assert_eq!(json["tests"][0]["status"], "passed");
    }
}
