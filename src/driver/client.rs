//! W3C WebDriver client implementation
//!
//! This module provides a typed WebDriver session over the HTTP transport.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::connection::HttpTransport;
use super::element::RemoteElement;
use super::traits::{ElementHandle, FrameRef, Gesture, WebDriver, WebElement};
use super::types::{locator, BrowserOptions, BrowserType};
use crate::selector::{Selector, Strategy};
use crate::{Error, Result};

/// Browser session driven over the W3C WebDriver protocol
#[derive(Debug, Clone)]
pub struct WebDriverSession {
    transport: Arc<HttpTransport>,
    browser: BrowserType,
}

impl WebDriverSession {
    /// Start a new session on a WebDriver endpoint
    ///
    /// # Arguments
    /// * `url` - Endpoint base URL (e.g., "http://localhost:4444")
    /// * `options` - Browser launch options
    pub async fn connect(url: &str, options: &BrowserOptions) -> Result<Self> {
        let transport = HttpTransport::new_session(url, options).await?;
        Ok(Self {
            transport: Arc::new(transport),
            browser: options.browser,
        })
    }

    /// Browser this session drives
    pub fn browser(&self) -> BrowserType {
        self.browser
    }

    fn element(&self, value: &Value) -> Result<ElementHandle> {
        Ok(Arc::new(RemoteElement::from_reference(
            value,
            self.transport.clone(),
        )?))
    }

    async fn set_timeout(&self, kind: &str, timeout: Duration) -> Result<()> {
        self.transport
            .command(
                Method::POST,
                "/timeouts",
                Some(json!({ (kind): timeout.as_millis() as u64 })),
            )
            .await?;
        Ok(())
    }

    async fn perform_pointer(&self, actions: Vec<Value>) -> Result<()> {
        let body = json!({
            "actions": [{
                "type": "pointer",
                "id": "mouse",
                "parameters": { "pointerType": "mouse" },
                "actions": actions,
            }]
        });
        self.transport
            .command(Method::POST, "/actions", Some(body))
            .await?;
        self.transport
            .command(Method::DELETE, "/actions", None)
            .await?;
        Ok(())
    }
}

fn move_to(element: &dyn WebElement, duration: u64) -> Value {
    json!({
        "type": "pointerMove",
        "duration": duration,
        "origin": element.reference(),
        "x": 0,
        "y": 0,
    })
}

fn button(kind: &str, button: u8) -> Value {
    json!({ "type": kind, "button": button })
}

#[async_trait]
impl WebDriver for WebDriverSession {
    fn session_id(&self) -> &str {
        self.transport.session_id()
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);
        self.transport
            .command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let value = self.transport.command(Method::GET, "/url", None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn title(&self) -> Result<String> {
        let value = self.transport.command(Method::GET, "/title", None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn back(&self) -> Result<()> {
        self.transport.command(Method::POST, "/back", None).await?;
        Ok(())
    }

    async fn forward(&self) -> Result<()> {
        self.transport.command(Method::POST, "/forward", None).await?;
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        self.transport.command(Method::POST, "/refresh", None).await?;
        Ok(())
    }

    async fn find_element(&self, selector: &Selector) -> Result<ElementHandle> {
        let (using, value) = locator(selector);
        debug!("find_element: {} '{}'", using, value);
        let found = self
            .transport
            .command(
                Method::POST,
                "/element",
                Some(json!({ "using": using, "value": value })),
            )
            .await?;
        self.element(&found)
    }

    async fn find_elements(&self, selector: &Selector) -> Result<Vec<ElementHandle>> {
        let (using, value) = locator(selector);
        debug!("find_elements: {} '{}'", using, value);
        let found = self
            .transport
            .command(
                Method::POST,
                "/elements",
                Some(json!({ "using": using, "value": value })),
            )
            .await?;
        found
            .as_array()
            .map(|items| items.iter().map(|v| self.element(v)).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.transport
            .command(
                Method::POST,
                "/execute/sync",
                Some(json!({ "script": script, "args": args })),
            )
            .await
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let value = self
            .transport
            .command(Method::GET, "/screenshot", None)
            .await?;
        let data = value
            .as_str()
            .ok_or_else(|| Error::internal("Screenshot payload is not a string"))?;
        BASE64
            .decode(data)
            .map_err(|e| Error::internal(format!("Failed to decode screenshot: {}", e)))
    }

    async fn implicitly_wait(&self, timeout: Duration) -> Result<()> {
        self.set_timeout("implicit", timeout).await
    }

    async fn set_page_load_timeout(&self, timeout: Duration) -> Result<()> {
        self.set_timeout("pageLoad", timeout).await
    }

    async fn set_window_size(&self, width: u32, height: u32) -> Result<()> {
        self.transport
            .command(
                Method::POST,
                "/window/rect",
                Some(json!({ "width": width, "height": height })),
            )
            .await?;
        Ok(())
    }

    async fn maximize_window(&self) -> Result<()> {
        self.transport
            .command(Method::POST, "/window/maximize", None)
            .await?;
        Ok(())
    }

    async fn switch_to_frame(&self, frame: FrameRef) -> Result<()> {
        let id = match frame {
            FrameRef::Index(index) => json!(index),
            FrameRef::Element(element) => element.reference(),
            FrameRef::Name(name) => {
                let css = format!(
                    "iframe[name=\"{0}\"], iframe[id=\"{0}\"], frame[name=\"{0}\"], frame[id=\"{0}\"]",
                    name
                );
                let selector = Selector::new(Strategy::Css, css);
                self.find_element(&selector).await?.reference()
            }
        };
        self.transport
            .command(Method::POST, "/frame", Some(json!({ "id": id })))
            .await?;
        Ok(())
    }

    async fn switch_to_default_content(&self) -> Result<()> {
        self.transport
            .command(Method::POST, "/frame", Some(json!({ "id": null })))
            .await?;
        Ok(())
    }

    async fn perform_gesture(&self, gesture: Gesture) -> Result<()> {
        let actions = match gesture {
            Gesture::Hover(el) => vec![move_to(el.as_ref(), 0)],
            Gesture::DoubleClick(el) => vec![
                move_to(el.as_ref(), 0),
                button("pointerDown", 0),
                button("pointerUp", 0),
                button("pointerDown", 0),
                button("pointerUp", 0),
            ],
            Gesture::ContextClick(el) => vec![
                move_to(el.as_ref(), 0),
                button("pointerDown", 2),
                button("pointerUp", 2),
            ],
            Gesture::DragAndDrop { source, target } => vec![
                move_to(source.as_ref(), 0),
                button("pointerDown", 0),
                move_to(target.as_ref(), 250),
                button("pointerUp", 0),
            ],
        };
        self.perform_pointer(actions).await
    }

    async fn quit(&self) -> Result<()> {
        self.transport.delete_session().await
    }
}
