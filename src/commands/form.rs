//! Form commands
//!
//! Typing, dropdowns, checkboxes and file inputs. Mutations follow the same
//! locate-inside-retry discipline as element commands.

use std::path::Path;
use std::time::Duration;
use tracing::info;

use super::locator::ElementLocator;
use super::retry::RetryPolicy;
use crate::driver::SelectBy;
use crate::selector::Selector;
use crate::{Error, Result};

/// Form commands bound to one session
#[derive(Debug, Clone)]
pub struct FormCommands {
    locator: ElementLocator,
    retry: RetryPolicy,
    timeout: Option<Duration>,
}

impl FormCommands {
    /// Create form commands
    pub fn new(locator: ElementLocator, retry: RetryPolicy) -> Self {
        Self {
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

    /// Clear the field, then type `text`
    pub async fn type_text(&self, selector: impl Into<Selector>, text: &str) -> Result<()> {
        let selector = selector.into();
        self.retry
            .run("type_text", || async {
                let element = self.locator.require(&selector, self.timeout).await?;
                element.clear().await?;
                element.send_keys(text).await
            })
            .await?;
        info!("Typed text into element with {}: {}", selector.strategy, selector.value);
        Ok(())
    }

    pub async fn clear(&self, selector: impl Into<Selector>) -> Result<()> {
        let selector = selector.into();
        self.retry
            .run("clear", || async {
                self.locator.require(&selector, self.timeout).await?.clear().await
            })
            .await?;
        info!("Cleared element with {}: {}", selector.strategy, selector.value);
        Ok(())
    }

    /// Submit the form the element belongs to
    pub async fn submit(&self, selector: impl Into<Selector>) -> Result<()> {
        let selector = selector.into();
        self.retry
            .run("submit", || async {
                self.locator.require(&selector, self.timeout).await?.submit().await
            })
            .await?;
        info!("Submitted form with {}: {}", selector.strategy, selector.value);
        Ok(())
    }

    async fn select(&self, operation: &str, selector: Selector, by: SelectBy) -> Result<()> {
        self.retry
            .run(operation, || async {
                let element = self.locator.require(&selector, self.timeout).await?;
                if element.select_option(by.clone()).await? {
                    Ok(())
                } else {
                    Err(Error::element_not_found(format!(
                        "option {:?} in {}",
                        by, selector
                    )))
                }
            })
            .await?;
        info!(
            "Selected option {:?} in dropdown with {}: {}",
            by, selector.strategy, selector.value
        );
        Ok(())
    }

    /// Select the option whose visible text equals `text`
    pub async fn select_by_text(&self, selector: impl Into<Selector>, text: &str) -> Result<()> {
        self.select("select_by_text", selector.into(), SelectBy::Text(text.to_string()))
            .await
    }

    /// Select the option whose value equals `value`
    pub async fn select_by_value(&self, selector: impl Into<Selector>, value: &str) -> Result<()> {
        self.select("select_by_value", selector.into(), SelectBy::Value(value.to_string()))
            .await
    }

    /// Select the option at `index`
    pub async fn select_by_index(&self, selector: impl Into<Selector>, index: usize) -> Result<()> {
        self.select("select_by_index", selector.into(), SelectBy::Index(index))
            .await
    }

    async fn selected(&self, selector: impl Into<Selector>) -> Result<Option<(String, String)>> {
        match self.locator.find(selector, self.timeout, false).await? {
            Some(element) => element.selected_option().await,
            None => Ok(None),
        }
    }

    /// Text of the selected option, `None` when nothing matches
    pub async fn get_selected_option_text(
        &self,
        selector: impl Into<Selector>,
    ) -> Result<Option<String>> {
        Ok(self.selected(selector).await?.map(|(text, _)| text))
    }

    /// Value of the selected option, `None` when nothing matches
    pub async fn get_selected_option_value(
        &self,
        selector: impl Into<Selector>,
    ) -> Result<Option<String>> {
        Ok(self.selected(selector).await?.map(|(_, value)| value))
    }

    /// Whether the checkbox or radio is selected; `false` when not found
    pub async fn is_checked(&self, selector: impl Into<Selector>) -> Result<bool> {
        match self.locator.find(selector, self.timeout, false).await? {
            Some(element) => element.is_selected().await,
            None => Ok(false),
        }
    }

    async fn set_checked(&self, operation: &str, selector: Selector, checked: bool) -> Result<()> {
        self.retry
            .run(operation, || async {
                let element = self.locator.require(&selector, self.timeout).await?;
                if element.is_selected().await? != checked {
                    element.click().await?;
                }
                Ok(())
            })
            .await?;
        info!(
            "{} checkbox with {}: {}",
            if checked { "Checked" } else { "Unchecked" },
            selector.strategy,
            selector.value
        );
        Ok(())
    }

    /// Select the checkbox; no-op when already selected
    pub async fn check(&self, selector: impl Into<Selector>) -> Result<()> {
        self.set_checked("check", selector.into(), true).await
    }

    /// Deselect the checkbox; no-op when already deselected
    pub async fn uncheck(&self, selector: impl Into<Selector>) -> Result<()> {
        self.set_checked("uncheck", selector.into(), false).await
    }

    /// Send the absolute path of `file` to a file input
    ///
    /// The file must exist; a missing file fails without retrying.
    pub async fn upload_file(
        &self,
        selector: impl Into<Selector>,
        file: impl AsRef<Path>,
    ) -> Result<()> {
        let selector = selector.into();
        let absolute = tokio::fs::canonicalize(file.as_ref()).await?;
        let path = absolute.to_string_lossy();

        self.retry
            .run("upload_file", || async {
                let element = self.locator.require(&selector, self.timeout).await?;
                element.send_keys(&path).await
            })
            .await?;
        info!("Uploaded {} with {}: {}", path, selector.strategy, selector.value);
        Ok(())
    }
}
