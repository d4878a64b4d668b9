//! Validation commands
//!
//! Non-raising checks over element, form and page state. Each returns
//! `Ok(true)` / `Ok(false)` and logs PASS or FAIL with the expected and actual
//! values; a missing element is a FAIL, not an error. Driver failures other
//! than absence still propagate.

use tracing::{error, info};

use super::browser::BrowserCommands;
use super::element::ElementCommands;
use super::form::FormCommands;
use crate::selector::Selector;
use crate::Result;

/// Log a check outcome and return it
fn report(check: &str, passed: bool, expected: &str, actual: &str) -> bool {
    if passed {
        info!("PASS: {} (expected {}, actual {})", check, expected, actual);
    } else {
        error!("FAIL: {} (expected {}, actual {})", check, expected, actual);
    }
    passed
}

fn quoted(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("'{}'", v),
        None => "<not found>".to_string(),
    }
}

/// Validation commands bound to one session
#[derive(Debug, Clone)]
pub struct ValidationCommands {
    browser: BrowserCommands,
    element: ElementCommands,
    form: FormCommands,
}

impl ValidationCommands {
    pub fn new(browser: BrowserCommands, element: ElementCommands, form: FormCommands) -> Self {
        Self {
            browser,
            element,
            form,
        }
    }

    pub async fn assert_element_exists(&self, selector: impl Into<Selector>) -> Result<bool> {
        let selector = selector.into();
        let exists = self.element.exists(&selector).await;
        Ok(report(
            &format!("element {} exists", selector),
            exists,
            "present",
            if exists { "present" } else { "absent" },
        ))
    }

    pub async fn assert_element_visible(&self, selector: impl Into<Selector>) -> Result<bool> {
        let selector = selector.into();
        let visible = self.element.find(&selector).await?.is_some();
        Ok(report(
            &format!("element {} visible", selector),
            visible,
            "visible",
            if visible { "visible" } else { "not visible" },
        ))
    }

    pub async fn assert_element_not_visible(&self, selector: impl Into<Selector>) -> Result<bool> {
        let selector = selector.into();
        let visible = self.element.is_displayed(&selector).await?;
        Ok(report(
            &format!("element {} not visible", selector),
            !visible,
            "not visible",
            if visible { "visible" } else { "not visible" },
        ))
    }

    /// Element text equals `expected`
    pub async fn assert_text(&self, selector: impl Into<Selector>, expected: &str) -> Result<bool> {
        let selector = selector.into();
        let actual = self.element.get_text(&selector).await?;
        Ok(report(
            &format!("text of {}", selector),
            actual.as_deref() == Some(expected),
            &quoted(Some(expected)),
            &quoted(actual.as_deref()),
        ))
    }

    /// Element text contains `expected`
    pub async fn assert_text_contains(
        &self,
        selector: impl Into<Selector>,
        expected: &str,
    ) -> Result<bool> {
        let selector = selector.into();
        let actual = self.element.get_text(&selector).await?;
        Ok(report(
            &format!("text of {} contains", selector),
            actual.as_deref().is_some_and(|a| a.contains(expected)),
            &quoted(Some(expected)),
            &quoted(actual.as_deref()),
        ))
    }

    /// Attribute equals `expected`
    pub async fn assert_attribute(
        &self,
        selector: impl Into<Selector>,
        attribute: &str,
        expected: &str,
    ) -> Result<bool> {
        let selector = selector.into();
        let actual = self.element.get_attribute(&selector, attribute).await?;
        Ok(report(
            &format!("attribute '{}' of {}", attribute, selector),
            actual.as_deref() == Some(expected),
            &quoted(Some(expected)),
            &quoted(actual.as_deref()),
        ))
    }

    /// Attribute contains `expected`
    pub async fn assert_attribute_contains(
        &self,
        selector: impl Into<Selector>,
        attribute: &str,
        expected: &str,
    ) -> Result<bool> {
        let selector = selector.into();
        let actual = self.element.get_attribute(&selector, attribute).await?;
        Ok(report(
            &format!("attribute '{}' of {} contains", attribute, selector),
            actual.as_deref().is_some_and(|a| a.contains(expected)),
            &quoted(Some(expected)),
            &quoted(actual.as_deref()),
        ))
    }

    pub async fn assert_checked(&self, selector: impl Into<Selector>) -> Result<bool> {
        let selector = selector.into();
        let checked = self.form.is_checked(&selector).await?;
        Ok(report(
            &format!("{} checked", selector),
            checked,
            "checked",
            if checked { "checked" } else { "unchecked" },
        ))
    }

    pub async fn assert_not_checked(&self, selector: impl Into<Selector>) -> Result<bool> {
        let selector = selector.into();
        let checked = self.form.is_checked(&selector).await?;
        Ok(report(
            &format!("{} not checked", selector),
            !checked,
            "unchecked",
            if checked { "checked" } else { "unchecked" },
        ))
    }

    pub async fn assert_url(&self, expected: &str) -> Result<bool> {
        let actual = self.browser.current_url().await?;
        Ok(report("URL", actual == expected, &quoted(Some(expected)), &quoted(Some(&actual))))
    }

    pub async fn assert_url_contains(&self, expected: &str) -> Result<bool> {
        let actual = self.browser.current_url().await?;
        Ok(report(
            "URL contains",
            actual.contains(expected),
            &quoted(Some(expected)),
            &quoted(Some(&actual)),
        ))
    }

    pub async fn assert_title(&self, expected: &str) -> Result<bool> {
        let actual = self.browser.title().await?;
        Ok(report("title", actual == expected, &quoted(Some(expected)), &quoted(Some(&actual))))
    }

    pub async fn assert_title_contains(&self, expected: &str) -> Result<bool> {
        let actual = self.browser.title().await?;
        Ok(report(
            "title contains",
            actual.contains(expected),
            &quoted(Some(expected)),
            &quoted(Some(&actual)),
        ))
    }

    /// Exactly `expected` elements match
    pub async fn assert_element_count(
        &self,
        selector: impl Into<Selector>,
        expected: usize,
    ) -> Result<bool> {
        let selector = selector.into();
        let actual = self.element.find_all(&selector).await.len();
        Ok(report(
            &format!("count of {}", selector),
            actual == expected,
            &expected.to_string(),
            &actual.to_string(),
        ))
    }

    /// More than `min_count` elements match
    pub async fn assert_element_count_greater_than(
        &self,
        selector: impl Into<Selector>,
        min_count: usize,
    ) -> Result<bool> {
        let selector = selector.into();
        let actual = self.element.find_all(&selector).await.len();
        Ok(report(
            &format!("count of {}", selector),
            actual > min_count,
            &format!("> {}", min_count),
            &actual.to_string(),
        ))
    }
}
