//! Wait engine
//!
//! Polls a condition against the live page until it holds or the timeout
//! elapses. What a timeout means is chosen per engine handle:
//!
//! - `WaitMode::BestEffort` returns `false` / `None` and logs a warning
//! - `WaitMode::Strict` fails with `WaitTimeout`, or `ElementTimeout` for
//!   waits that return an element
//!
//! Retryable driver errors raised while probing (stale or vanished nodes)
//! count as "not yet"; any other error aborts the wait.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use super::locator::{without_implicit_wait, POLL_INTERVAL};
use crate::driver::{scripts, ElementHandle, WebDriver};
use crate::selector::Selector;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy)]
enum PageField {
    Url,
    Title,
}

/// Timeout signalling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitMode {
    #[default]
    BestEffort,
    Strict,
}

/// Outcome of one condition check
#[derive(Debug)]
pub enum Sample<T> {
    /// Condition holds
    Ready(T),
    /// Condition does not hold yet; carries the observed value
    Pending(String),
}

/// Wait engine bound to one session
#[derive(Debug, Clone)]
pub struct WaitEngine {
    driver: Arc<dyn WebDriver>,
    implicit_wait: Duration,
    page_load_timeout: Duration,
    poll_interval: Duration,
    mode: WaitMode,
}

impl WaitEngine {
    /// Create a best-effort wait engine
    ///
    /// # Arguments
    /// * `driver` - Session driver
    /// * `implicit_wait` - Default timeout for element and URL/title waits
    /// * `page_load_timeout` - Default timeout for `page_load`
    pub fn new(
        driver: Arc<dyn WebDriver>,
        implicit_wait: Duration,
        page_load_timeout: Duration,
    ) -> Self {
        Self {
            driver,
            implicit_wait,
            page_load_timeout,
            poll_interval: POLL_INTERVAL,
            mode: WaitMode::default(),
        }
    }

    /// Same engine with timeouts raised as errors
    pub fn strict(&self) -> Self {
        self.with_mode(WaitMode::Strict)
    }

    /// Same engine with timeouts reported as `false` / `None`
    pub fn best_effort(&self) -> Self {
        self.with_mode(WaitMode::BestEffort)
    }

    pub fn with_mode(&self, mode: WaitMode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }

    /// Set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn mode(&self) -> WaitMode {
        self.mode
    }

    /// Poll `sample` until ready or `timeout`
    ///
    /// Returns `Ok(Err(actual))` on timeout with the last observed value.
    pub async fn poll<T, F, Fut>(
        &self,
        timeout: Duration,
        mut sample: F,
    ) -> Result<std::result::Result<T, String>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Sample<T>>>,
    {
        let deadline = Instant::now() + timeout;
        let mut actual;
        loop {
            match sample().await {
                Ok(Sample::Ready(value)) => return Ok(Ok(value)),
                Ok(Sample::Pending(observed)) => actual = observed,
                Err(e) if e.is_retryable() => actual = e.to_string(),
                Err(e) => return Err(e),
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(Err(actual));
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    fn conclude(
        &self,
        condition: &str,
        expected: String,
        outcome: std::result::Result<(), String>,
    ) -> Result<bool> {
        match outcome {
            Ok(()) => Ok(true),
            Err(actual) => match self.mode {
                WaitMode::BestEffort => {
                    warn!(
                        "Timeout waiting for {}: expected {}, actual {}",
                        condition, expected, actual
                    );
                    Ok(false)
                }
                WaitMode::Strict => Err(Error::WaitTimeout {
                    condition: condition.to_string(),
                    expected,
                    actual,
                }),
            },
        }
    }

    fn conclude_element(
        &self,
        condition: &str,
        selector: Selector,
        timeout: Duration,
        outcome: std::result::Result<ElementHandle, String>,
    ) -> Result<Option<ElementHandle>> {
        match outcome {
            Ok(element) => Ok(Some(element)),
            Err(_) => match self.mode {
                WaitMode::BestEffort => {
                    warn!(
                        "Timeout waiting for element to be {} with {}: {}",
                        condition, selector.strategy, selector.value
                    );
                    Ok(None)
                }
                WaitMode::Strict => Err(Error::ElementTimeout {
                    selector: selector.value,
                    strategy: selector.strategy,
                    timeout,
                }),
            },
        }
    }

    async fn first(&self, selector: &Selector) -> Result<Option<ElementHandle>> {
        Ok(self.driver.find_elements(selector).await?.into_iter().next())
    }

    async fn element_wait<F, Fut>(
        &self,
        condition: &str,
        selector: Selector,
        timeout: Option<Duration>,
        check: F,
    ) -> Result<Option<ElementHandle>>
    where
        F: Fn(ElementHandle) -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        let timeout = timeout.unwrap_or(self.implicit_wait);
        info!(
            "Waiting for element to be {} with {}: {}",
            condition, selector.strategy, selector.value
        );

        let outcome = without_implicit_wait(
            self.driver.as_ref(),
            self.implicit_wait,
            self.poll(timeout, || async {
                match self.first(&selector).await? {
                    Some(element) => {
                        if check(element.clone()).await? {
                            Ok(Sample::Ready(element))
                        } else {
                            Ok(Sample::Pending(format!("{} not {}", selector, condition)))
                        }
                    }
                    None => Ok(Sample::Pending(format!("{} absent", selector))),
                }
            }),
        )
        .await?;

        self.conclude_element(condition, selector, timeout, outcome)
    }

    /// Wait until the element is present and displayed
    pub async fn visible(
        &self,
        selector: impl Into<Selector>,
        timeout: Option<Duration>,
    ) -> Result<Option<ElementHandle>> {
        self.element_wait("visible", selector.into(), timeout, |el| async move {
            el.is_displayed().await
        })
        .await
    }

    /// Wait until the element is present in the DOM
    pub async fn present(
        &self,
        selector: impl Into<Selector>,
        timeout: Option<Duration>,
    ) -> Result<Option<ElementHandle>> {
        self.element_wait("present", selector.into(), timeout, |_| async { Ok(true) })
            .await
    }

    /// Wait until the element is displayed and enabled
    pub async fn clickable(
        &self,
        selector: impl Into<Selector>,
        timeout: Option<Duration>,
    ) -> Result<Option<ElementHandle>> {
        self.element_wait("clickable", selector.into(), timeout, |el| async move {
            Ok(el.is_displayed().await? && el.is_enabled().await?)
        })
        .await
    }

    /// Wait until the element is absent or not displayed
    pub async fn invisible(
        &self,
        selector: impl Into<Selector>,
        timeout: Option<Duration>,
    ) -> Result<bool> {
        let selector = selector.into();
        let timeout = timeout.unwrap_or(self.implicit_wait);
        info!(
            "Waiting for element to be invisible with {}: {}",
            selector.strategy, selector.value
        );

        let outcome = without_implicit_wait(
            self.driver.as_ref(),
            self.implicit_wait,
            self.poll(timeout, || async {
                let shown = match self.first(&selector).await? {
                    Some(element) => match element.is_displayed().await {
                        Ok(shown) => shown,
                        // Detached nodes are invisible
                        Err(Error::StaleElement(_)) => false,
                        Err(e) => return Err(e),
                    },
                    None => false,
                };
                Ok(if shown {
                    Sample::Pending("visible".to_string())
                } else {
                    Sample::Ready(())
                })
            }),
        )
        .await?;

        self.conclude(
            &format!("{} to be invisible", selector),
            "invisible".to_string(),
            outcome,
        )
    }

    /// Wait until the element's text contains `text`
    pub async fn text(
        &self,
        selector: impl Into<Selector>,
        text: &str,
        timeout: Option<Duration>,
    ) -> Result<bool> {
        let selector = selector.into();
        let timeout = timeout.unwrap_or(self.implicit_wait);
        info!(
            "Waiting for element to contain text '{}' with {}: {}",
            text, selector.strategy, selector.value
        );

        let outcome = without_implicit_wait(
            self.driver.as_ref(),
            self.implicit_wait,
            self.poll(timeout, || async {
                let Some(element) = self.first(&selector).await? else {
                    return Ok(Sample::Pending(format!("{} absent", selector)));
                };
                let actual = element.text().await?;
                Ok(if actual.contains(text) {
                    Sample::Ready(())
                } else {
                    Sample::Pending(actual)
                })
            }),
        )
        .await?;

        self.conclude(&format!("text of {}", selector), format!("'{}'", text), outcome)
    }

    /// Wait until the element's attribute contains `value`
    pub async fn attribute(
        &self,
        selector: impl Into<Selector>,
        attribute: &str,
        value: &str,
        timeout: Option<Duration>,
    ) -> Result<bool> {
        let selector = selector.into();
        let timeout = timeout.unwrap_or(self.implicit_wait);
        info!(
            "Waiting for element to have attribute '{}' with value '{}' with {}: {}",
            attribute, value, selector.strategy, selector.value
        );

        let outcome = without_implicit_wait(
            self.driver.as_ref(),
            self.implicit_wait,
            self.poll(timeout, || async {
                let Some(element) = self.first(&selector).await? else {
                    return Ok(Sample::Pending(format!("{} absent", selector)));
                };
                match element.attribute(attribute).await? {
                    Some(actual) if actual.contains(value) => Ok(Sample::Ready(())),
                    Some(actual) => Ok(Sample::Pending(actual)),
                    None => Ok(Sample::Pending("<unset>".to_string())),
                }
            }),
        )
        .await?;

        self.conclude(
            &format!("attribute '{}' of {}", attribute, selector),
            format!("'{}'", value),
            outcome,
        )
    }

    async fn page_wait(
        &self,
        condition: &str,
        expected: &str,
        timeout: Option<Duration>,
        field: PageField,
        matches: impl Fn(&str) -> bool,
    ) -> Result<bool> {
        let timeout = timeout.unwrap_or(self.implicit_wait);
        info!("Waiting for {} '{}'", condition, expected);

        let outcome = self
            .poll(timeout, || async {
                let actual = match field {
                    PageField::Url => self.driver.current_url().await?,
                    PageField::Title => self.driver.title().await?,
                };
                Ok(if matches(&actual) {
                    Sample::Ready(())
                } else {
                    Sample::Pending(actual)
                })
            })
            .await?;

        self.conclude(condition, format!("'{}'", expected), outcome)
    }

    /// Wait until the URL equals `url`
    pub async fn url(&self, url: &str, timeout: Option<Duration>) -> Result<bool> {
        self.page_wait("URL to match", url, timeout, PageField::Url, |a| a == url)
            .await
    }

    /// Wait until the URL contains `partial`
    pub async fn url_contains(&self, partial: &str, timeout: Option<Duration>) -> Result<bool> {
        self.page_wait(
            "URL to contain",
            partial,
            timeout,
            PageField::Url,
            |a| a.contains(partial),
        )
        .await
    }

    /// Wait until the title equals `title`
    pub async fn title(&self, title: &str, timeout: Option<Duration>) -> Result<bool> {
        self.page_wait("title to match", title, timeout, PageField::Title, |a| a == title)
            .await
    }

    /// Wait until the title contains `partial`
    pub async fn title_contains(&self, partial: &str, timeout: Option<Duration>) -> Result<bool> {
        self.page_wait(
            "title to contain",
            partial,
            timeout,
            PageField::Title,
            |a| a.contains(partial),
        )
        .await
    }

    async fn count_wait(
        &self,
        selector: Selector,
        timeout: Option<Duration>,
        expected: String,
        matches: impl Fn(usize) -> bool,
    ) -> Result<bool> {
        let timeout = timeout.unwrap_or(self.implicit_wait);
        info!(
            "Waiting for element count {} with {}: {}",
            expected, selector.strategy, selector.value
        );

        let outcome = without_implicit_wait(
            self.driver.as_ref(),
            self.implicit_wait,
            self.poll(timeout, || async {
                let count = self.driver.find_elements(&selector).await?.len();
                Ok(if matches(count) {
                    Sample::Ready(())
                } else {
                    Sample::Pending(count.to_string())
                })
            }),
        )
        .await?;

        self.conclude(&format!("count of {}", selector), expected, outcome)
    }

    /// Wait until exactly `count` elements match
    pub async fn elements_count(
        &self,
        selector: impl Into<Selector>,
        count: usize,
        timeout: Option<Duration>,
    ) -> Result<bool> {
        self.count_wait(selector.into(), timeout, format!("== {}", count), |n| n == count)
            .await
    }

    /// Wait until more than `min_count` elements match
    pub async fn elements_count_greater_than(
        &self,
        selector: impl Into<Selector>,
        min_count: usize,
        timeout: Option<Duration>,
    ) -> Result<bool> {
        self.count_wait(selector.into(), timeout, format!("> {}", min_count), |n| {
            n > min_count
        })
        .await
    }

    /// Wait until `document.readyState` is complete
    ///
    /// Defaults to the page load timeout rather than the implicit wait.
    pub async fn page_load(&self, timeout: Option<Duration>) -> Result<bool> {
        let timeout = timeout.unwrap_or(self.page_load_timeout);
        info!("Waiting for page to load");

        let outcome = self
            .poll(timeout, || async {
                let state = self
                    .driver
                    .execute_script(scripts::READY_STATE, vec![])
                    .await?;
                Ok(match state.as_str() {
                    Some("complete") => Sample::Ready(()),
                    other => Sample::Pending(other.unwrap_or_default().to_string()),
                })
            })
            .await?;

        self.conclude("page load", "'complete'".to_string(), outcome)
    }

    /// Wait until no jQuery requests are pending
    ///
    /// Satisfied immediately on pages without jQuery.
    pub async fn ajax(&self, timeout: Option<Duration>) -> Result<bool> {
        let timeout = timeout.unwrap_or(self.implicit_wait);
        info!("Waiting for AJAX requests to complete");

        let outcome = self
            .poll(timeout, || async {
                let active = self
                    .driver
                    .execute_script(scripts::JQUERY_ACTIVE, vec![])
                    .await?
                    .as_u64()
                    .unwrap_or(0);
                Ok(if active == 0 {
                    Sample::Ready(())
                } else {
                    Sample::Pending(format!("{} active", active))
                })
            })
            .await?;

        self.conclude("AJAX requests", "0 active".to_string(), outcome)
    }

    /// Fixed delay; always succeeds
    pub async fn wait(&self, seconds: f64) -> bool {
        info!("Waiting for {} seconds", seconds);
        tokio::time::sleep(Duration::try_from_secs_f64(seconds).unwrap_or_default()).await;
        true
    }
}
