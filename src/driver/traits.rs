//! Browser driver traits
//!
//! This module defines the capability interface the command layer consumes.
//! Any binding (the W3C HTTP client, the in-memory mock) implements these.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use super::types::ELEMENT_KEY;
use crate::selector::Selector;
use crate::Result;

/// Shared handle to a live DOM node
///
/// Handles are never cached across commands; the backing node may go stale.
pub type ElementHandle = Arc<dyn WebElement>;

/// Frame to switch into
#[derive(Debug, Clone)]
pub enum FrameRef {
    Index(u16),
    /// Frame `name` or `id` attribute
    Name(String),
    Element(ElementHandle),
}

/// Pointer gesture performed through the actions API
#[derive(Debug, Clone)]
pub enum Gesture {
    Hover(ElementHandle),
    DoubleClick(ElementHandle),
    ContextClick(ElementHandle),
    DragAndDrop {
        source: ElementHandle,
        target: ElementHandle,
    },
}

/// Dropdown option selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectBy {
    Text(String),
    Value(String),
    Index(usize),
}

/// Browser driver trait
///
/// One instance drives exactly one browser session.
#[async_trait]
pub trait WebDriver: Send + Sync + std::fmt::Debug {
    /// Driver-side session identifier
    fn session_id(&self) -> &str;

    /// Navigate to URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Get the current URL
    async fn current_url(&self) -> Result<String>;

    /// Get the document title
    async fn title(&self) -> Result<String>;

    /// Go back in history
    async fn back(&self) -> Result<()>;

    /// Go forward in history
    async fn forward(&self) -> Result<()>;

    /// Reload the page
    async fn refresh(&self) -> Result<()>;

    /// Find the first element matching a selector
    ///
    /// Honors the driver's implicit wait. Fails with `ElementNotFound`.
    async fn find_element(&self, selector: &Selector) -> Result<ElementHandle>;

    /// Find every element matching a selector
    async fn find_elements(&self, selector: &Selector) -> Result<Vec<ElementHandle>>;

    /// Execute a synchronous script and return its value
    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value>;

    /// Capture a PNG screenshot of the viewport
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Set the implicit element wait
    async fn implicitly_wait(&self, timeout: Duration) -> Result<()>;

    /// Set the page load timeout
    async fn set_page_load_timeout(&self, timeout: Duration) -> Result<()>;

    /// Resize the browser window
    async fn set_window_size(&self, width: u32, height: u32) -> Result<()>;

    /// Maximize the browser window
    async fn maximize_window(&self) -> Result<()>;

    /// Switch into a frame
    async fn switch_to_frame(&self, frame: FrameRef) -> Result<()>;

    /// Switch back to the top-level document
    async fn switch_to_default_content(&self) -> Result<()>;

    /// Perform a pointer gesture
    async fn perform_gesture(&self, gesture: Gesture) -> Result<()>;

    /// End the session
    async fn quit(&self) -> Result<()>;
}

/// Element capability trait
#[async_trait]
pub trait WebElement: Send + Sync + std::fmt::Debug {
    /// Driver-side element identifier
    fn id(&self) -> &str;

    /// Web element reference as passed to scripts and actions
    fn reference(&self) -> Value {
        json!({ ELEMENT_KEY: self.id() })
    }

    /// Click element
    async fn click(&self) -> Result<()>;

    /// Clear an editable element
    async fn clear(&self) -> Result<()>;

    /// Send keystrokes
    async fn send_keys(&self, text: &str) -> Result<()>;

    /// Submit the enclosing form
    async fn submit(&self) -> Result<()>;

    /// Rendered text
    async fn text(&self) -> Result<String>;

    /// Attribute or property value
    async fn attribute(&self, name: &str) -> Result<Option<String>>;

    /// Check if element is rendered
    async fn is_displayed(&self) -> Result<bool>;

    /// Check if element is enabled
    async fn is_enabled(&self) -> Result<bool>;

    /// Check if a checkbox, radio or option is selected
    async fn is_selected(&self) -> Result<bool>;

    /// Lower-case tag name
    async fn tag_name(&self) -> Result<String>;

    /// Select a dropdown option; returns false when no option matched
    async fn select_option(&self, by: SelectBy) -> Result<bool>;

    /// Currently selected dropdown option as `(text, value)`
    async fn selected_option(&self) -> Result<Option<(String, String)>>;
}
