//! # Command layer
//!
//! Domain operations test functions call, composed from element location,
//! retry and wait primitives.
//!
//! ## Module structure
//! - `locator`: explicit-wait element lookup
//! - `retry`: bounded retry of transient failures
//! - `wait`: condition polling with best-effort or strict timeouts
//! - `browser`: navigation, scripts, screenshots, windows and frames
//! - `element`: clicks, gestures and element reads
//! - `form`: typing, dropdowns, checkboxes and file inputs
//! - `validation`: PASS/FAIL checks that return booleans
//!
//! ## Example
//! ```rust,no_run
//! use harness_oxide::commands::Commands;
//!
//! # async fn example(cmd: Commands) -> harness_oxide::Result<()> {
//! cmd.browser.navigate("https://the-internet.herokuapp.com/login").await?;
//! cmd.form.type_text("#username", "tomsmith").await?;
//! cmd.form.type_text("#password", "SuperSecretPassword!").await?;
//! cmd.element.click("button[type='submit']").await?;
//! assert!(cmd.wait.url_contains("/secure", None).await?);
//! assert!(cmd.validation.assert_text_contains("#flash", "You logged into").await?);
//! # Ok(())
//! # }
//! ```

pub mod locator;
pub mod retry;
pub mod wait;
pub mod browser;
pub mod element;
pub mod form;
pub mod validation;


pub use browser::BrowserCommands;
pub use element::ElementCommands;
pub use form::FormCommands;
pub use locator::{ElementLocator, POLL_INTERVAL};
pub use retry::RetryPolicy;
pub use validation::ValidationCommands;
pub use wait::{Sample, WaitEngine, WaitMode};

use crate::config::Config;
use crate::session::Session;

/// Every command group bound to one session
#[derive(Debug, Clone)]
pub struct Commands {
    pub session_id: String,
    pub browser: BrowserCommands,
    pub element: ElementCommands,
    pub form: FormCommands,
    pub wait: WaitEngine,
    pub validation: ValidationCommands,
}

impl Commands {
    /// Build the command groups for `session`
    ///
    /// Timeouts come from the session's launch options; retry settings and
    /// the screenshot directory come from `config`.
    pub fn new(session: &Session, config: &Config) -> Self {
        let driver = session.driver.clone();
        let locator = ElementLocator::new(driver.clone(), session.options.implicit_wait);
        let retry = RetryPolicy::from_config(config);

        let browser = BrowserCommands::new(
            driver.clone(),
            locator.clone(),
            config.screenshot_dir.clone(),
        );
        let element = ElementCommands::new(driver.clone(), locator.clone(), retry);
        let form = FormCommands::new(locator, retry);
        let wait = WaitEngine::new(
            driver,
            session.options.implicit_wait,
            session.options.page_load_timeout,
        );
        let validation = ValidationCommands::new(browser.clone(), element.clone(), form.clone());

        Self {
            session_id: session.id.clone(),
            browser,
            element,
            form,
            wait,
            validation,
        }
    }
}
