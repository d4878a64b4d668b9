//! Element commands
//!
//! Locate-then-act operations on single elements. Every mutating command
//! locates its target inside the retry policy, so a target that renders late
//! or goes stale mid-action is re-located on the next attempt.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::locator::ElementLocator;
use super::retry::RetryPolicy;
use crate::driver::{ElementHandle, Gesture, WebDriver};
use crate::selector::Selector;
use crate::Result;

/// Element commands bound to one session
#[derive(Debug, Clone)]
pub struct ElementCommands {
    driver: Arc<dyn WebDriver>,
    locator: ElementLocator,
    retry: RetryPolicy,
    timeout: Option<Duration>,
}

impl ElementCommands {
    /// Create element commands
    pub fn new(driver: Arc<dyn WebDriver>, locator: ElementLocator, retry: RetryPolicy) -> Self {
        Self {
            driver,
            locator,
            retry,
            timeout: None,
        }
    }

    /// Same commands with a different locate timeout
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self.clone()
        }
    }

    /// Same commands with a different retry policy
    pub fn with_retry(&self, retry: RetryPolicy) -> Self {
        Self {
            retry,
            ..self.clone()
        }
    }

    pub fn locator(&self) -> &ElementLocator {
        &self.locator
    }

    /// Find a visible element, `None` after the timeout
    pub async fn find(&self, selector: impl Into<Selector>) -> Result<Option<ElementHandle>> {
        self.locator.find(selector, self.timeout, false).await
    }

    /// Find every matching element without waiting
    pub async fn find_all(&self, selector: impl Into<Selector>) -> Vec<ElementHandle> {
        self.locator.find_all(selector).await
    }

    pub async fn click(&self, selector: impl Into<Selector>) -> Result<()> {
        let selector = selector.into();
        self.retry
            .run("click", || async {
                let element = self.locator.require(&selector, self.timeout).await?;
                element.click().await
            })
            .await?;
        info!("Clicked element with {}: {}", selector.strategy, selector.value);
        Ok(())
    }

    pub async fn double_click(&self, selector: impl Into<Selector>) -> Result<()> {
        let selector = selector.into();
        self.retry
            .run("double_click", || async {
                let element = self.locator.require(&selector, self.timeout).await?;
                self.driver.perform_gesture(Gesture::DoubleClick(element)).await
            })
            .await?;
        info!("Double-clicked element with {}: {}", selector.strategy, selector.value);
        Ok(())
    }

    pub async fn right_click(&self, selector: impl Into<Selector>) -> Result<()> {
        let selector = selector.into();
        self.retry
            .run("right_click", || async {
                let element = self.locator.require(&selector, self.timeout).await?;
                self.driver.perform_gesture(Gesture::ContextClick(element)).await
            })
            .await?;
        info!("Right-clicked element with {}: {}", selector.strategy, selector.value);
        Ok(())
    }

    /// Move the pointer over the element
    pub async fn hover(&self, selector: impl Into<Selector>) -> Result<()> {
        let selector = selector.into();
        self.retry
            .run("hover", || async {
                let element = self.locator.require(&selector, self.timeout).await?;
                self.driver.perform_gesture(Gesture::Hover(element)).await
            })
            .await?;
        info!("Hovered over element with {}: {}", selector.strategy, selector.value);
        Ok(())
    }

    /// Drag `source` onto `target`
    pub async fn drag_and_drop(
        &self,
        source: impl Into<Selector>,
        target: impl Into<Selector>,
    ) -> Result<()> {
        let source = source.into();
        let target = target.into();
        self.retry
            .run("drag_and_drop", || async {
                let from = self.locator.require(&source, self.timeout).await?;
                let to = self.locator.require(&target, self.timeout).await?;
                self.driver
                    .perform_gesture(Gesture::DragAndDrop {
                        source: from,
                        target: to,
                    })
                    .await
            })
            .await?;
        info!("Dragged {} to {}", source, target);
        Ok(())
    }

    /// Visible text, `None` when the element is not found
    pub async fn get_text(&self, selector: impl Into<Selector>) -> Result<Option<String>> {
        match self.find(selector).await? {
            Some(element) => Ok(Some(element.text().await?)),
            None => Ok(None),
        }
    }

    /// Attribute value, `None` when unset or the element is not found
    pub async fn get_attribute(
        &self,
        selector: impl Into<Selector>,
        attribute: &str,
    ) -> Result<Option<String>> {
        match self.find(selector).await? {
            Some(element) => element.attribute(attribute).await,
            None => Ok(None),
        }
    }

    /// Whether the element is present and displayed; does not wait
    pub async fn is_displayed(&self, selector: impl Into<Selector>) -> Result<bool> {
        match self.locator.first_present(&selector.into()).await? {
            Some(element) => element.is_displayed().await,
            None => Ok(false),
        }
    }

    /// Whether the element is present and enabled; does not wait
    pub async fn is_enabled(&self, selector: impl Into<Selector>) -> Result<bool> {
        match self.locator.first_present(&selector.into()).await? {
            Some(element) => element.is_enabled().await,
            None => Ok(false),
        }
    }

    /// Whether at least one element matches; does not wait
    pub async fn exists(&self, selector: impl Into<Selector>) -> bool {
        !self.locator.find_all(selector).await.is_empty()
    }
}
