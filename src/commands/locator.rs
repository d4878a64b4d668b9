//! Element locator
//!
//! Explicit-wait element lookup. The driver's ambient implicit wait is
//! suspended while polling and restored afterwards on every exit path.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::driver::{ElementHandle, WebDriver};
use crate::selector::Selector;
use crate::{Error, Result};

/// Default interval between condition checks
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Run `body` with the driver's implicit wait set to zero, then restore `restore`
///
/// Restoration happens whether `body` succeeds or fails. A failed restore is
/// logged and does not mask the body's outcome.
pub(crate) async fn without_implicit_wait<T, Fut>(
    driver: &dyn WebDriver,
    restore: Duration,
    body: Fut,
) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    driver.implicitly_wait(Duration::ZERO).await?;
    let outcome = body.await;
    if let Err(e) = driver.implicitly_wait(restore).await {
        warn!("Failed to restore implicit wait of {:?}: {}", restore, e);
    }
    outcome
}

/// Element locator bound to one session
#[derive(Debug, Clone)]
pub struct ElementLocator {
    driver: Arc<dyn WebDriver>,
    implicit_wait: Duration,
    poll_interval: Duration,
}

impl ElementLocator {
    /// Create a locator
    ///
    /// # Arguments
    /// * `driver` - Session driver
    /// * `implicit_wait` - Default lookup timeout, restored on the driver after each lookup
    pub fn new(driver: Arc<dyn WebDriver>, implicit_wait: Duration) -> Self {
        Self {
            driver,
            implicit_wait,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Default lookup timeout
    pub fn implicit_wait(&self) -> Duration {
        self.implicit_wait
    }

    /// Find a visible element
    ///
    /// Polls until the first match is displayed or `timeout` (default: the
    /// implicit wait) elapses. On timeout returns `Ok(None)`, or
    /// `ElementTimeout` when `fail_on_timeout` is set.
    #[instrument(skip(self, selector), fields(selector = tracing::field::Empty))]
    pub async fn find(
        &self,
        selector: impl Into<Selector>,
        timeout: Option<Duration>,
        fail_on_timeout: bool,
    ) -> Result<Option<ElementHandle>> {
        let selector = selector.into();
        tracing::Span::current().record("selector", tracing::field::display(&selector));
        let timeout = timeout.unwrap_or(self.implicit_wait);

        info!("Finding element with {}: {}", selector.strategy, selector.value);
        let outcome = without_implicit_wait(
            self.driver.as_ref(),
            self.implicit_wait,
            self.poll_visible(&selector, timeout),
        )
        .await;

        match outcome {
            Ok(Some(element)) => Ok(Some(element)),
            Ok(None) if fail_on_timeout => Err(Error::ElementTimeout {
                selector: selector.value,
                strategy: selector.strategy,
                timeout,
            }),
            Ok(None) => {
                error!("Element not found with {}: {}", selector.strategy, selector.value);
                Ok(None)
            }
            Err(e) if fail_on_timeout => Err(e),
            Err(e) => {
                error!(
                    "Error finding element with {}: {} - {}",
                    selector.strategy, selector.value, e
                );
                Ok(None)
            }
        }
    }

    /// Find a visible element or fail with `ElementTimeout`
    pub async fn find_or_fail(
        &self,
        selector: impl Into<Selector>,
        timeout: Option<Duration>,
    ) -> Result<ElementHandle> {
        let selector = selector.into();
        match self.find(selector.clone(), timeout, true).await? {
            Some(element) => Ok(element),
            None => Err(Error::ElementTimeout {
                selector: selector.value,
                strategy: selector.strategy,
                timeout: timeout.unwrap_or(self.implicit_wait),
            }),
        }
    }

    /// Find a visible element for a mutating command
    ///
    /// Absence becomes `ElementNotFound`, which `RetryPolicy` treats as
    /// transient, so a retried command re-locates the target. Driver faults
    /// propagate unchanged.
    pub async fn require(
        &self,
        selector: &Selector,
        timeout: Option<Duration>,
    ) -> Result<ElementHandle> {
        match self.find(selector.clone(), timeout, true).await {
            Ok(Some(element)) => Ok(element),
            Ok(None) | Err(Error::ElementTimeout { .. }) => {
                Err(Error::element_not_found(selector.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// First present element without waiting for visibility
    pub async fn first_present(&self, selector: &Selector) -> Result<Option<ElementHandle>> {
        Ok(self.driver.find_elements(selector).await?.into_iter().next())
    }

    /// Find every matching element without waiting
    ///
    /// Never fails; lookup errors yield an empty list.
    pub async fn find_all(&self, selector: impl Into<Selector>) -> Vec<ElementHandle> {
        let selector = selector.into();
        info!("Finding all elements with {}: {}", selector.strategy, selector.value);

        match self.driver.find_elements(&selector).await {
            Ok(elements) => {
                info!("Found {} elements", elements.len());
                elements
            }
            Err(e) => {
                error!(
                    "Error finding elements with {}: {} - {}",
                    selector.strategy, selector.value, e
                );
                Vec::new()
            }
        }
    }

    async fn poll_visible(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<Option<ElementHandle>> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.driver.find_element(selector).await {
                Ok(element) => match element.is_displayed().await {
                    Ok(true) => return Ok(Some(element)),
                    Ok(false) => debug!("{} present but not displayed", selector),
                    Err(e) if e.is_retryable() => debug!("{}: {}", selector, e),
                    Err(e) => return Err(e),
                },
                Err(e) if e.is_retryable() => {}
                Err(e) => return Err(e),
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}
