//! Harness-Oxide: browser test harness over the W3C WebDriver protocol
//!
//! Tests are plain async functions over a [`commands::Commands`] facade.
//! Selectors use short prefixes (`#id`, `.class`, `@name`, `//xpath`,
//! `link=`, `partial-link=`, css otherwise); every lookup waits, every
//! mutation retries transient failures, and the runner executes files in
//! parallel with one browser session per file.

pub mod error;
pub mod config;
pub mod selector;

pub mod driver;
pub mod session;
pub mod commands;
pub mod runner;
pub mod suites;

// Re-exports
pub use error::{Error, Result};

/// Harness-Oxide library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
