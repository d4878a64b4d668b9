//! # Session management layer
//!
//! Acquires browser sessions, applies their timeouts, and tracks them by id so
//! a cancelled run can sweep whatever it left behind.
//!
//! ## Module structure
//! - `traits`: `Session`, `DriverFactory` and `SessionManager`
//! - `manager`: session manager and the WebDriver-backed factory
//! - `mock`: mock driver factory for testing
//!
//! ## Example
//! ```rust,no_run
//! use harness_oxide::driver::BrowserOptions;
//! use harness_oxide::session::{SessionManager, SessionManagerImpl};
//!
//! # async fn example() -> harness_oxide::Result<()> {
//! let manager = SessionManagerImpl::webdriver("http://localhost:4444");
//! let session = manager.create_session("demo", BrowserOptions::default()).await?;
//! session.driver.navigate("https://example.com").await?;
//! manager.close_session(&session.id).await?;
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod manager;
pub mod mock;

#[cfg(test)]
pub mod tests;

pub use traits::{DriverFactory, Session, SessionManager};

pub use manager::{SessionManagerImpl, WebDriverFactory};

pub use mock::MockDriverFactory;
