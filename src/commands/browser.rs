//! Browser commands
//!
//! Page-level operations on the session: navigation, history, scripts,
//! screenshots, window and frame control. Starting and stopping the browser
//! is owned by the session manager.

use chrono::Local;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::locator::ElementLocator;
use crate::driver::{FrameRef, WebDriver};
use crate::selector::Selector;
use crate::Result;

/// Browser commands bound to one session
#[derive(Debug, Clone)]
pub struct BrowserCommands {
    driver: Arc<dyn WebDriver>,
    locator: ElementLocator,
    screenshot_dir: PathBuf,
}

impl BrowserCommands {
    /// Create browser commands
    ///
    /// # Arguments
    /// * `driver` - Session driver
    /// * `locator` - Used to resolve frame elements
    /// * `screenshot_dir` - Directory screenshots are written to
    pub fn new(
        driver: Arc<dyn WebDriver>,
        locator: ElementLocator,
        screenshot_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            driver,
            locator,
            screenshot_dir: screenshot_dir.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        self.driver.session_id()
    }

    pub fn screenshot_dir(&self) -> &Path {
        &self.screenshot_dir
    }

    pub async fn navigate(&self, url: &str) -> Result<()> {
        info!("Navigating to: {}", url);
        self.driver.navigate(url).await
    }

    pub async fn back(&self) -> Result<()> {
        info!("Navigating back");
        self.driver.back().await
    }

    pub async fn forward(&self) -> Result<()> {
        info!("Navigating forward");
        self.driver.forward().await
    }

    pub async fn refresh(&self) -> Result<()> {
        info!("Refreshing page");
        self.driver.refresh().await
    }

    pub async fn title(&self) -> Result<String> {
        self.driver.title().await
    }

    pub async fn current_url(&self) -> Result<String> {
        self.driver.current_url().await
    }

    /// Capture a PNG into the screenshot directory
    ///
    /// The file is named `{name}_{timestamp}.png` and its path is returned.
    pub async fn screenshot(&self, name: &str) -> Result<PathBuf> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
        let path = self.screenshot_dir.join(format!("{}_{}.png", name, stamp));

        let png = self.driver.screenshot().await?;
        tokio::fs::create_dir_all(&self.screenshot_dir).await?;
        tokio::fs::write(&path, png).await?;

        info!("Screenshot saved to: {}", path.display());
        Ok(path)
    }

    /// Run JavaScript in the page and return its result
    pub async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        debug!("Executing script: {}", script);
        self.driver.execute_script(script, args).await
    }

    pub async fn set_window_size(&self, width: u32, height: u32) -> Result<()> {
        info!("Setting window size to {}x{}", width, height);
        self.driver.set_window_size(width, height).await
    }

    pub async fn maximize_window(&self) -> Result<()> {
        info!("Maximizing window");
        self.driver.maximize_window().await
    }

    /// Switch into a frame by index, name, or element handle
    pub async fn switch_to_frame(&self, frame: FrameRef) -> Result<()> {
        info!("Switching to frame: {:?}", frame);
        self.driver.switch_to_frame(frame).await
    }

    /// Switch into the frame element matching `selector`
    pub async fn switch_to_frame_element(&self, selector: impl Into<Selector>) -> Result<()> {
        let element = self.locator.require(&selector.into(), None).await?;
        self.switch_to_frame(FrameRef::Element(element)).await
    }

    pub async fn switch_to_default_content(&self) -> Result<()> {
        info!("Switching to default content");
        self.driver.switch_to_default_content().await
    }
}
