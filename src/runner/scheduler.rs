//! Parallel scheduler
//!
//! Runs test files concurrently, one session per file, at most `max_workers`
//! at a time. Each worker publishes live progress into its own file record;
//! run counters move only when a finished file is merged, in completion
//! order.
//!
//! Stopping a run signals its coordinator, which aborts the worker pool and
//! waits for every worker to be gone before sweeping the sessions whose id
//! starts with `{run_id}_`. `stop` returns once the sweep is done.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{error, info, info_span, warn, Instrument};

use super::executor::TestExecutor;
use super::registry::TestRegistry;
use super::result::{FileAggregate, RunAggregate, RunSnapshot, RunStatus};
use crate::config::Config;
use crate::session::SessionManager;
use crate::{Error, Result};

/// One batch of files to run
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Registered file paths, in submission order
    pub paths: Vec<String>,
    /// Worker bound; zero falls back to the configured `max_workers`
    pub max_workers: usize,
    /// Optional function subset per file; files not listed run everything
    pub functions: HashMap<String, Vec<String>>,
    /// Browser name; defaults to the configured browser
    pub browser: Option<String>,
}

#[derive(Debug)]
struct RunEntry {
    snapshot: Arc<Mutex<RunSnapshot>>,
    status: Arc<watch::Sender<RunStatus>>,
    cancel: watch::Sender<bool>,
}

/// Session id for one file of a run
pub fn file_session_id(run_id: &str, path: &str) -> String {
    format!("{}_{}", run_id, path.replace(['/', '\\', '.'], "_"))
}

/// Parallel scheduler
#[derive(Debug, Clone)]
pub struct ParallelScheduler {
    registry: Arc<TestRegistry>,
    sessions: Arc<dyn SessionManager>,
    config: Arc<Config>,
    runs: Arc<RwLock<HashMap<String, RunEntry>>>,
}

impl ParallelScheduler {
    /// Create a scheduler
    pub fn new(
        registry: Arc<TestRegistry>,
        sessions: Arc<dyn SessionManager>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            registry,
            sessions,
            config,
            runs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn registry(&self) -> &TestRegistry {
        &self.registry
    }

    /// Run one file through the pool with a single worker
    pub fn start_run(&self, path: &str, functions: Option<Vec<String>>) -> Result<String> {
        let mut request = RunRequest {
            paths: vec![path.to_string()],
            max_workers: 1,
            ..Default::default()
        };
        if let Some(functions) = functions {
            request.functions.insert(path.to_string(), functions);
        }
        self.run_parallel(request)
    }

    /// Start a batch and return its run id
    ///
    /// Every path must be registered; nothing starts otherwise. Repeated
    /// paths run once, at their first position.
    pub fn run_parallel(&self, mut request: RunRequest) -> Result<String> {
        for path in &request.paths {
            self.registry.get(path)?;
        }
        let mut seen = HashSet::new();
        request.paths.retain(|path| seen.insert(path.clone()));

        let run_id = uuid::Uuid::new_v4().to_string();
        let max_workers = match request.max_workers {
            0 => self.config.max_workers.max(1),
            n => n,
        };

        let mut aggregate = RunAggregate::default();
        for path in &request.paths {
            let planned = self.registry.get(path)?.cases.len();
            aggregate.update_file(FileAggregate::new(path, planned));
        }
        let snapshot = Arc::new(Mutex::new(RunSnapshot {
            run_id: run_id.clone(),
            status: RunStatus::Running,
            aggregate,
        }));
        let (status, _) = watch::channel(RunStatus::Running);
        let status = Arc::new(status);
        let (cancel, cancelled) = watch::channel(false);

        info!(
            "Starting run {} with {} files on {} workers",
            run_id,
            request.paths.len(),
            max_workers
        );

        tokio::spawn(self.coordinate(
            run_id.clone(),
            request,
            max_workers,
            snapshot.clone(),
            status.clone(),
            cancelled,
        ));

        self.runs
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .insert(
                run_id.clone(),
                RunEntry {
                    snapshot,
                    status,
                    cancel,
                },
            );

        Ok(run_id)
    }

    fn coordinate(
        &self,
        run_id: String,
        request: RunRequest,
        max_workers: usize,
        snapshot: Arc<Mutex<RunSnapshot>>,
        status: Arc<watch::Sender<RunStatus>>,
        mut cancelled: watch::Receiver<bool>,
    ) -> impl std::future::Future<Output = ()> + Send + 'static {
        let scheduler = self.clone();

        async move {
            let permits = Arc::new(Semaphore::new(max_workers));
            let mut workers = JoinSet::new();

            for path in request.paths {
                let selection = request.functions.get(&path).cloned();
                let worker = scheduler.clone();
                let snapshot = snapshot.clone();
                let permits = permits.clone();
                let browser = request.browser.clone();
                let span = info_span!("worker", run_id = %run_id, file = %path);
                let session_id = file_session_id(&run_id, &path);

                workers.spawn(
                    async move {
                        let _permit = permits.acquire_owned().await.ok();
                        worker
                            .run_file(&path, &session_id, selection, browser, snapshot)
                            .await
                    }
                    .instrument(span),
                );
            }

            let stopped = loop {
                tokio::select! {
                    joined = workers.join_next() => match joined {
                        Some(Ok(file)) => {
                            info!(
                                "File {} finished: {} passed, {} failed",
                                file.path, file.totals.passed, file.totals.failed
                            );
                            match snapshot.lock() {
                                Ok(mut snap) => snap.aggregate.merge_file(file),
                                Err(e) => error!("Lock error merging {}: {}", file.path, e),
                            }
                        }
                        Some(Err(e)) => error!("Worker of run {} ended abnormally: {}", run_id, e),
                        None => break false,
                    },
                    Ok(()) = cancelled.changed() => break true,
                }
            };

            let outcome = if stopped {
                info!("Stopping run {}", run_id);
                // No worker can open a session once shutdown returns
                workers.shutdown().await;
                let closed = scheduler
                    .sessions
                    .close_sessions_with_prefix(&format!("{}_", run_id))
                    .await;
                info!("Closed {} sessions of run {}", closed, run_id);
                RunStatus::Stopped
            } else {
                info!("Run {} completed", run_id);
                RunStatus::Completed
            };

            match snapshot.lock() {
                Ok(mut snap) => snap.status = outcome,
                Err(e) => error!("Lock error finishing run {}: {}", run_id, e),
            }
            status.send_replace(outcome);
        }
    }

    async fn run_file(
        &self,
        path: &str,
        session_id: &str,
        selection: Option<Vec<String>>,
        browser: Option<String>,
        snapshot: Arc<Mutex<RunSnapshot>>,
    ) -> FileAggregate {
        let file = match self.registry.get(path) {
            Ok(file) => file,
            Err(e) => {
                let mut aggregate = FileAggregate::new(path, 0);
                aggregate.mark_error(e.to_string());
                return aggregate;
            }
        };

        let mut executor =
            TestExecutor::new(self.sessions.clone(), self.config.clone(), session_id);
        executor
            .run_test_file(file, selection.as_deref(), browser.as_deref(), |progress| {
                if let Ok(mut snap) = snapshot.lock() {
                    snap.aggregate.update_file(progress.clone());
                }
            })
            .await
    }

    fn entry<T>(&self, run_id: &str, read: impl FnOnce(&RunEntry) -> T) -> Result<T> {
        let runs = self
            .runs
            .read()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;
        runs.get(run_id)
            .map(read)
            .ok_or_else(|| Error::run_not_found(run_id))
    }

    /// Current state of a run, in progress or final
    pub fn poll(&self, run_id: &str) -> Result<RunSnapshot> {
        let snapshot = self.entry(run_id, |entry| entry.snapshot.clone())?;
        let snap = snapshot
            .lock()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;
        Ok(snap.clone())
    }

    /// Wait until a run completes or is stopped
    pub async fn wait(&self, run_id: &str) -> Result<RunSnapshot> {
        let mut status = self.entry(run_id, |entry| entry.status.subscribe())?;
        if status.wait_for(|s| s.is_terminal()).await.is_err() {
            warn!("Status channel of run {} closed", run_id);
        }
        self.poll(run_id)
    }

    /// Stop a run
    ///
    /// Files not yet started never start and in-flight files are abandoned.
    /// Returns after every worker is gone and the run's sessions have been
    /// closed best-effort. Stopping a finished run is a no-op.
    pub async fn stop(&self, run_id: &str) -> Result<RunSnapshot> {
        let mut status = self.entry(run_id, |entry| {
            if !entry.status.borrow().is_terminal() {
                entry.cancel.send_replace(true);
            }
            entry.status.subscribe()
        })?;

        if status.wait_for(|s| s.is_terminal()).await.is_err() {
            warn!("Status channel of run {} closed", run_id);
        }
        self.poll(run_id)
    }

    /// Ids of every known run
    pub fn runs(&self) -> Result<Vec<String>> {
        let runs = self
            .runs
            .read()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;
        Ok(runs.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_session_id_is_prefixed_by_run() {
        assert_eq!(
            file_session_id("run-1", "suites/login.rs"),
            "run-1_suites_login_rs"
        );
    }
}
