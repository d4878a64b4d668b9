//! WebDriver HTTP connection implementation
//!
//! Every W3C command is a JSON request against `{base}/session/{id}/...`
//! whose response body wraps the result in a `value` field.

use reqwest::Method;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::types::{BrowserOptions, NewSession, WireError};
use crate::{Error, Result};

/// Request timeout for a single WebDriver command
///
/// Page loads are bounded by the session's own page-load timeout, so this only
/// catches a hung endpoint.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// HTTP transport bound to one WebDriver session
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl HttpTransport {
    /// Start a new browser session on the endpoint
    pub async fn new_session(base_url: &str, options: &BrowserOptions) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        info!("Creating {} session at {}", options.browser, base_url);

        let client = reqwest::Client::builder()
            .timeout(COMMAND_TIMEOUT)
            .build()?;

        let value = send(
            &client,
            Method::POST,
            &format!("{}/session", base_url),
            Some(options.capabilities()),
        )
        .await?;
        let session: NewSession = serde_json::from_value(value)?;

        info!("Session {} created", session.session_id);
        Ok(Self {
            client,
            base_url,
            session_id: session.session_id,
        })
    }

    /// Session identifier assigned by the endpoint
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a session-scoped command
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - Path below the session, e.g. `/url` or `/element/{id}/click`
    /// * `body` - JSON body; POST requests without one send `{}`
    pub async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}/session/{}{}", self.base_url, self.session_id, path);
        let body = match (&method, body) {
            (&Method::POST, None) => Some(json!({})),
            (_, body) => body,
        };
        send(&self.client, method, &url, body).await
    }

    /// Delete the session, ending the browser
    pub async fn delete_session(&self) -> Result<()> {
        let url = format!("{}/session/{}", self.base_url, self.session_id);
        send(&self.client, Method::DELETE, &url, None).await?;
        info!("Session {} deleted", self.session_id);
        Ok(())
    }
}

async fn send(
    client: &reqwest::Client,
    method: Method,
    url: &str,
    body: Option<Value>,
) -> Result<Value> {
    debug!("WebDriver {} {}", method, url);

    let mut request = client.request(method.clone(), url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await?;
    let status = response.status();
    let payload: Value = response.json().await.unwrap_or(Value::Null);
    let value = payload.get("value").cloned().unwrap_or(Value::Null);

    if let Some(wire) = parse_error(&value) {
        warn!("WebDriver {} {} failed: {} ({})", method, url, wire.error, status);
        return Err(Error::from_webdriver(&wire.error, wire.message));
    }

    if !status.is_success() {
        return Err(Error::WebDriver {
            code: status.as_u16().to_string(),
            message: format!("Unexpected response from {}", url),
        });
    }

    Ok(value)
}

fn parse_error(value: &Value) -> Option<WireError> {
    if value.get("error").is_some() {
        serde_json::from_value(value.clone()).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_payload() {
        let value = json!({"error": "no such element", "message": "Unable to locate", "stacktrace": ""});
        let wire = parse_error(&value).unwrap();
        assert_eq!(wire.error, "no such element");
        assert!(matches!(
            Error::from_webdriver(&wire.error, wire.message),
            Error::ElementNotFound(_)
        ));
    }

    #[test]
    fn test_parse_error_ignores_success_values() {
        assert!(parse_error(&json!("https://example.com")).is_none());
        assert!(parse_error(&json!({"sessionId": "abc"})).is_none());
        assert!(parse_error(&Value::Null).is_none());
    }
}
