//! Session manager implementation
//!
//! Manages all browser sessions with thread-safe operations.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use crate::driver::{BrowserOptions, WebDriver, WebDriverSession};
use crate::session::mock::MockDriverFactory;
use crate::session::traits::{DriverFactory, Session, SessionManager};
use crate::{Error, Result};

/// Factory starting sessions on a W3C WebDriver endpoint
#[derive(Debug, Clone)]
pub struct WebDriverFactory {
    url: String,
}

impl WebDriverFactory {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl DriverFactory for WebDriverFactory {
    async fn create(&self, options: &BrowserOptions) -> Result<Arc<dyn WebDriver>> {
        Ok(Arc::new(WebDriverSession::connect(&self.url, options).await?))
    }
}

/// Session manager implementation
#[derive(Debug)]
pub struct SessionManagerImpl {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    factory: Arc<dyn DriverFactory>,
}

impl SessionManagerImpl {
    /// Create a new session manager
    pub fn new(factory: Arc<dyn DriverFactory>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            factory,
        }
    }

    /// Create a session manager talking to a WebDriver endpoint
    pub fn webdriver<S: Into<String>>(url: S) -> Self {
        Self::new(Arc::new(WebDriverFactory::new(url)))
    }

    /// Create a session manager with mock drivers for testing
    pub fn mock() -> Self {
        Self::new(Arc::new(MockDriverFactory::default()))
    }

    async fn configure(driver: &dyn WebDriver, options: &BrowserOptions) -> Result<()> {
        driver.implicitly_wait(options.implicit_wait).await?;
        driver.set_page_load_timeout(options.page_load_timeout).await?;
        if options.maximize {
            if let Err(e) = driver.maximize_window().await {
                warn!("Could not maximize window: {}", e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
impl Default for SessionManagerImpl {
    fn default() -> Self {
        Self::mock()
    }
}

#[async_trait]
impl SessionManager for SessionManagerImpl {
    async fn create_session(&self, id: &str, options: BrowserOptions) -> Result<Session> {
        if self
            .sessions
            .read()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .contains_key(id)
        {
            return Err(Error::internal(format!("Session {} already exists", id)));
        }

        info!("Starting {} session {}", options.browser, id);
        let driver = self.factory.create(&options).await?;

        if let Err(e) = Self::configure(driver.as_ref(), &options).await {
            if let Err(quit_err) = driver.quit().await {
                warn!("Failed to quit unconfigured session {}: {}", id, quit_err);
            }
            return Err(e);
        }

        let session = Session {
            id: id.to_string(),
            driver,
            options,
        };
        self.sessions
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .insert(id.to_string(), session.clone());

        Ok(session)
    }

    fn get_session(&self, id: &str) -> Result<Session> {
        self.sessions
            .read()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .get(id)
            .cloned()
            .ok_or_else(|| Error::session_not_found(id))
    }

    async fn close_session(&self, id: &str) -> Result<()> {
        // Unregister before quitting so a failed quit never leaks the entry
        let session = self
            .sessions
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .remove(id)
            .ok_or_else(|| Error::session_not_found(id))?;

        session.driver.quit().await?;
        info!("Session {} closed", id);
        Ok(())
    }

    async fn close_sessions_with_prefix(&self, prefix: &str) -> usize {
        let ids: Vec<String> = match self.list_sessions() {
            Ok(ids) => ids.into_iter().filter(|id| id.starts_with(prefix)).collect(),
            Err(e) => {
                warn!("Session sweep for '{}' failed: {}", prefix, e);
                return 0;
            }
        };

        let mut closed = 0;
        for id in ids {
            match self.close_session(&id).await {
                Ok(()) => closed += 1,
                // Already removed by its own teardown
                Err(Error::SessionNotFound(_)) => {}
                Err(e) => {
                    closed += 1;
                    warn!("Failed to quit session {}: {}", id, e);
                }
            }
        }
        closed
    }

    fn list_sessions(&self) -> Result<Vec<String>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;
        Ok(sessions.keys().cloned().collect())
    }

    fn session_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_manager_creation() {
        let manager = SessionManagerImpl::mock();
        assert_eq!(manager.session_count(), 0);
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let manager = SessionManagerImpl::mock();
        let session = manager
            .create_session("run_a", BrowserOptions::default())
            .await
            .unwrap();

        assert_eq!(session.id, "run_a");
        assert_eq!(manager.session_count(), 1);
        assert_eq!(manager.get_session("run_a").unwrap().id, "run_a");
    }

    #[tokio::test]
    async fn test_duplicate_session_rejected() {
        let manager = SessionManagerImpl::mock();
        manager
            .create_session("dup", BrowserOptions::default())
            .await
            .unwrap();
        assert!(manager
            .create_session("dup", BrowserOptions::default())
            .await
            .is_err());
        assert_eq!(manager.session_count(), 1);
    }

    #[tokio::test]
    async fn test_close_session() {
        let manager = SessionManagerImpl::mock();
        manager
            .create_session("s1", BrowserOptions::default())
            .await
            .unwrap();

        manager.close_session("s1").await.unwrap();
        assert_eq!(manager.session_count(), 0);

        let result = manager.get_session("s1");
        assert!(matches!(result.unwrap_err(), Error::SessionNotFound(_)));
        assert!(matches!(
            manager.close_session("s1").await,
            Err(Error::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_operations() {
        let manager = Arc::new(SessionManagerImpl::mock());
        let mut handles = Vec::new();

        for i in 0..10 {
            let manager_clone = manager.clone();
            handles.push(tokio::spawn(async move {
                manager_clone
                    .create_session(&format!("s{}", i), BrowserOptions::default())
                    .await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(manager.session_count(), 10);
    }
}
