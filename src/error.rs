//! Unified error types for Harness-Oxide

use crate::selector::Strategy;
use std::time::Duration;
use thiserror::Error;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Harness-Oxide
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport errors talking to the WebDriver endpoint
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Protocol error reported by the WebDriver endpoint that has no dedicated variant
    #[error("WebDriver error ({code}): {message}")]
    WebDriver { code: String, message: String },

    /// Element was not located within its wait budget
    #[error("Element not found after {timeout:?}: {strategy} '{selector}'")]
    ElementTimeout {
        selector: String,
        strategy: Strategy,
        timeout: Duration,
    },

    /// Non-element condition did not hold within its wait budget
    #[error("Timed out waiting for {condition}: expected {expected}, actual {actual}")]
    WaitTimeout {
        condition: String,
        expected: String,
        actual: String,
    },

    /// Unknown browser type requested at session start
    #[error("Unsupported browser type: {0}")]
    UnsupportedBrowser(String),

    /// Element not found
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Element reference no longer attached to the document
    #[error("Stale element reference: {0}")]
    StaleElement(String),

    /// Element present but not rendered
    #[error("Element not visible: {0}")]
    ElementNotVisible(String),

    /// Element cannot receive the requested interaction
    #[error("Element not interactable: {0}")]
    ElementNotInteractable(String),

    /// Timeout
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// Any other failure raised while performing a command
    #[error("Action failed: {0}")]
    ActionFailure(String),

    /// Session not found
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Run not found
    #[error("Run not found: {0}")]
    RunNotFound(String),

    /// Test file not registered
    #[error("Test file not found: {0}")]
    TestFileNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new element not found error
    pub fn element_not_found<S: Into<String>>(msg: S) -> Self {
        Error::ElementNotFound(msg.into())
    }

    /// Create a new stale element error
    pub fn stale_element<S: Into<String>>(msg: S) -> Self {
        Error::StaleElement(msg.into())
    }

    /// Create a new not interactable error
    pub fn not_interactable<S: Into<String>>(msg: S) -> Self {
        Error::ElementNotInteractable(msg.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Error::Timeout(msg.into())
    }

    /// Create a new action failure error
    pub fn action_failure<S: Into<String>>(msg: S) -> Self {
        Error::ActionFailure(msg.into())
    }

    /// Create a new session not found error
    pub fn session_not_found<S: Into<String>>(id: S) -> Self {
        Error::SessionNotFound(id.into())
    }

    /// Create a new run not found error
    pub fn run_not_found<S: Into<String>>(id: S) -> Self {
        Error::RunNotFound(id.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Map a W3C WebDriver error code onto the taxonomy
    pub fn from_webdriver(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            "no such element" => Error::ElementNotFound(message),
            "stale element reference" => Error::StaleElement(message),
            "element not interactable" | "element click intercepted" => {
                Error::ElementNotInteractable(message)
            }
            "timeout" | "script timeout" => Error::Timeout(message),
            _ => Error::WebDriver {
                code: code.to_string(),
                message,
            },
        }
    }

    /// Whether a retry wrapper may re-run the failed operation
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::StaleElement(_)
                | Error::ElementNotFound(_)
                | Error::ElementNotVisible(_)
                | Error::ElementNotInteractable(_)
                | Error::Timeout(_)
                | Error::ElementTimeout { .. }
        )
    }
}
