//! Session management traits
//!
//! A session is one exclusive browser driver instance. Sessions are created
//! through a `DriverFactory` and tracked by id in a `SessionManager`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::driver::{BrowserOptions, WebDriver};
use crate::Result;

/// One browser driver owned by one executor
#[derive(Debug, Clone)]
pub struct Session {
    /// Harness-side session id
    pub id: String,
    /// Driver bound to this session
    pub driver: Arc<dyn WebDriver>,
    /// Options the session was created with
    pub options: BrowserOptions,
}

/// Driver factory trait
///
/// Starts a raw browser driver. The session manager applies timeouts and
/// window setup on top.
#[async_trait]
pub trait DriverFactory: Send + Sync + std::fmt::Debug {
    /// Start a new driver
    async fn create(&self, options: &BrowserOptions) -> Result<Arc<dyn WebDriver>>;
}

/// Session manager trait
///
/// Manages all live browser sessions.
#[async_trait]
pub trait SessionManager: Send + Sync + std::fmt::Debug {
    /// Start a browser and register it under `id`
    async fn create_session(&self, id: &str, options: BrowserOptions) -> Result<Session>;

    /// Get a session by id
    fn get_session(&self, id: &str) -> Result<Session>;

    /// Quit and unregister a session
    async fn close_session(&self, id: &str) -> Result<()>;

    /// Best-effort close of every session whose id starts with `prefix`;
    /// returns how many were unregistered
    async fn close_sessions_with_prefix(&self, prefix: &str) -> usize;

    /// List all session ids
    fn list_sessions(&self) -> Result<Vec<String>>;

    /// Get session count
    fn session_count(&self) -> usize;
}
