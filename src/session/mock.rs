//! Mock driver factory for testing
//!
//! Every session gets its own `MockDriver` over a shared `MockSite`. Created
//! drivers are kept so tests can inspect them after the fact.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::traits::DriverFactory;
use crate::driver::{BrowserOptions, MockDriver, MockSite, WebDriver};
use crate::{Error, Result};

/// Mock driver factory
#[derive(Debug, Default)]
pub struct MockDriverFactory {
    site: MockSite,
    drivers: Mutex<Vec<MockDriver>>,
    fail_creates: AtomicBool,
    fail_maximize: AtomicBool,
}

impl MockDriverFactory {
    /// Create a factory serving the given site
    pub fn new(site: MockSite) -> Self {
        Self {
            site,
            ..Default::default()
        }
    }

    /// Make session creation fail
    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::Relaxed);
    }

    /// Make window maximization fail on drivers created from now on
    pub fn fail_maximize(&self, fail: bool) {
        self.fail_maximize.store(fail, Ordering::Relaxed);
    }

    /// Every driver created so far, in creation order
    pub fn drivers(&self) -> Vec<MockDriver> {
        self.drivers
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DriverFactory for MockDriverFactory {
    async fn create(&self, _options: &BrowserOptions) -> Result<Arc<dyn WebDriver>> {
        if self.fail_creates.load(Ordering::Relaxed) {
            return Err(Error::WebDriver {
                code: "session not created".to_string(),
                message: "Mock browser failed to start".to_string(),
            });
        }

        let driver = MockDriver::new(self.site.clone());
        driver.fail_maximize(self.fail_maximize.load(Ordering::Relaxed));
        self.drivers
            .lock()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .push(driver.clone());
        Ok(Arc::new(driver))
    }
}
