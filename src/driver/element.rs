//! Remote element implementation

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;

use super::connection::HttpTransport;
use super::scripts;
use super::traits::{SelectBy, WebElement};
use super::types::ELEMENT_KEY;
use crate::{Error, Result};

/// Element living in a remote WebDriver session
#[derive(Debug, Clone)]
pub struct RemoteElement {
    id: String,
    transport: Arc<HttpTransport>,
}

impl RemoteElement {
    /// Wrap a web element id
    pub fn new(id: String, transport: Arc<HttpTransport>) -> Self {
        Self { id, transport }
    }

    /// Extract the element id from a W3C element reference
    pub fn from_reference(value: &Value, transport: Arc<HttpTransport>) -> Result<Self> {
        let id = value
            .get(ELEMENT_KEY)
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::internal(format!("Not an element reference: {}", value)))?;
        Ok(Self::new(id.to_string(), transport))
    }

    async fn get(&self, endpoint: &str) -> Result<Value> {
        self.transport
            .command(Method::GET, &format!("/element/{}/{}", self.id, endpoint), None)
            .await
    }

    async fn post(&self, endpoint: &str, body: Option<Value>) -> Result<Value> {
        self.transport
            .command(Method::POST, &format!("/element/{}/{}", self.id, endpoint), body)
            .await
    }

    async fn get_bool(&self, endpoint: &str) -> Result<bool> {
        Ok(self.get(endpoint).await?.as_bool().unwrap_or(false))
    }

    async fn script(&self, script: &str, mut args: Vec<Value>) -> Result<Value> {
        args.insert(0, self.reference());
        self.transport
            .command(
                Method::POST,
                "/execute/sync",
                Some(json!({ "script": script, "args": args })),
            )
            .await
    }
}

#[async_trait]
impl WebElement for RemoteElement {
    fn id(&self) -> &str {
        &self.id
    }

    async fn click(&self) -> Result<()> {
        self.post("click", None).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.post("clear", None).await?;
        Ok(())
    }

    async fn send_keys(&self, text: &str) -> Result<()> {
        self.post("value", Some(json!({ "text": text }))).await?;
        Ok(())
    }

    async fn submit(&self) -> Result<()> {
        let submitted = self.script(scripts::SUBMIT_FORM, vec![]).await?;
        if submitted.as_bool() == Some(true) {
            Ok(())
        } else {
            Err(Error::action_failure("Element is not inside a form"))
        }
    }

    async fn text(&self) -> Result<String> {
        Ok(self.get("text").await?.as_str().unwrap_or_default().to_string())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        let value = self.get(&format!("attribute/{}", name)).await?;
        Ok(match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    async fn is_displayed(&self) -> Result<bool> {
        self.get_bool("displayed").await
    }

    async fn is_enabled(&self) -> Result<bool> {
        self.get_bool("enabled").await
    }

    async fn is_selected(&self) -> Result<bool> {
        self.get_bool("selected").await
    }

    async fn tag_name(&self) -> Result<String> {
        Ok(self
            .get("name")
            .await?
            .as_str()
            .unwrap_or_default()
            .to_lowercase())
    }

    async fn select_option(&self, by: SelectBy) -> Result<bool> {
        let (mode, key) = match by {
            SelectBy::Text(text) => ("text", json!(text)),
            SelectBy::Value(value) => ("value", json!(value)),
            SelectBy::Index(index) => ("index", json!(index)),
        };
        let hit = self
            .script(scripts::SELECT_OPTION, vec![json!(mode), key])
            .await?;
        Ok(hit.as_bool().unwrap_or(false))
    }

    async fn selected_option(&self) -> Result<Option<(String, String)>> {
        let value = self.script(scripts::SELECTED_OPTION, vec![]).await?;
        Ok(value.as_array().and_then(|pair| match pair.as_slice() {
            [text, value] => Some((
                text.as_str().unwrap_or_default().to_string(),
                value.as_str().unwrap_or_default().to_string(),
            )),
            _ => None,
        }))
    }
}
