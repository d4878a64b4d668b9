//! WebDriver type definitions
//!
//! Browser selection, launch options and the W3C wire shapes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;
use std::time::Duration;

use crate::selector::{Selector, Strategy};
use crate::Error;

/// W3C web element identifier key
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Supported browser types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    Chrome,
    Firefox,
    Edge,
}

impl FromStr for BrowserType {
    type Err = Error;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_lowercase().as_str() {
            "chrome" => Ok(BrowserType::Chrome),
            "firefox" => Ok(BrowserType::Firefox),
            "edge" => Ok(BrowserType::Edge),
            _ => Err(Error::UnsupportedBrowser(s.to_string())),
        }
    }
}

impl std::fmt::Display for BrowserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BrowserType::Chrome => "chrome",
            BrowserType::Firefox => "firefox",
            BrowserType::Edge => "edge",
        })
    }
}

impl BrowserType {
    fn capability_name(&self) -> &'static str {
        match self {
            BrowserType::Chrome => "chrome",
            BrowserType::Firefox => "firefox",
            BrowserType::Edge => "MicrosoftEdge",
        }
    }

    fn options_key(&self) -> &'static str {
        match self {
            BrowserType::Chrome => "goog:chromeOptions",
            BrowserType::Firefox => "moz:firefoxOptions",
            BrowserType::Edge => "ms:edgeOptions",
        }
    }
}

/// Browser options for starting a session
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Browser to launch
    pub browser: BrowserType,
    /// Headless mode (no GUI)
    pub headless: bool,
    /// Additional browser arguments
    pub args: Vec<String>,
    /// Implicit element wait applied after session creation
    pub implicit_wait: Duration,
    /// Page load timeout applied after session creation
    pub page_load_timeout: Duration,
    /// Maximize the window after session creation
    pub maximize: bool,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            browser: BrowserType::Chrome,
            headless: true,
            args: vec![],
            implicit_wait: Duration::from_secs(10),
            page_load_timeout: Duration::from_secs(120),
            maximize: true,
        }
    }
}

impl BrowserOptions {
    /// Build options from harness configuration
    pub fn from_config(browser: BrowserType, config: &crate::config::Config) -> Self {
        Self {
            browser,
            headless: config.headless,
            args: vec![],
            implicit_wait: config.implicit_wait(),
            page_load_timeout: config.page_load_timeout(),
            maximize: true,
        }
    }

    /// Browser arguments including the headless and sandbox switches
    pub fn browser_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        match self.browser {
            BrowserType::Chrome | BrowserType::Edge => {
                if self.headless {
                    args.push("--headless".to_string());
                }
                if self.browser == BrowserType::Chrome {
                    args.push("--no-sandbox".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }
            }
            BrowserType::Firefox => {
                if self.headless {
                    args.push("-headless".to_string());
                }
            }
        }
        args.extend(self.args.iter().cloned());
        args
    }

    /// New-session request body
    pub fn capabilities(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": self.browser.capability_name(),
                    (self.browser.options_key()): { "args": self.browser_args() },
                }
            }
        })
    }
}

/// Map a selector onto a W3C `(using, value)` locator pair
pub fn locator(selector: &Selector) -> (&'static str, String) {
    let value = &selector.value;
    match selector.strategy {
        Strategy::Css => ("css selector", value.clone()),
        Strategy::XPath => ("xpath", value.clone()),
        Strategy::LinkText => ("link text", value.clone()),
        Strategy::PartialLinkText => ("partial link text", value.clone()),
        Strategy::TagName => ("tag name", value.clone()),
        Strategy::Id => ("css selector", format!("[id=\"{}\"]", css_escape(value))),
        Strategy::Name => ("css selector", format!("[name=\"{}\"]", css_escape(value))),
        Strategy::ClassName => ("css selector", format!(".{}", value)),
    }
}

fn css_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// W3C error payload
#[derive(Debug, Clone, Deserialize)]
pub struct WireError {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

/// New-session response payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub session_id: String,
    #[serde(default)]
    pub capabilities: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_type_parsing() {
        assert_eq!("Chrome".parse::<BrowserType>().unwrap(), BrowserType::Chrome);
        assert_eq!("firefox".parse::<BrowserType>().unwrap(), BrowserType::Firefox);
        assert_eq!(" EDGE ".parse::<BrowserType>().unwrap(), BrowserType::Edge);
        assert!(matches!(
            "opera".parse::<BrowserType>(),
            Err(Error::UnsupportedBrowser(name)) if name == "opera"
        ));
    }

    #[test]
    fn test_chrome_capabilities() {
        let options = BrowserOptions::default();
        let caps = options.capabilities();
        let always = &caps["capabilities"]["alwaysMatch"];
        assert_eq!(always["browserName"], "chrome");
        let args = always["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.contains(&json!("--headless")));
        assert!(args.contains(&json!("--no-sandbox")));
        assert!(args.contains(&json!("--disable-dev-shm-usage")));
    }

    #[test]
    fn test_headed_firefox_has_no_args() {
        let options = BrowserOptions {
            browser: BrowserType::Firefox,
            headless: false,
            ..Default::default()
        };
        assert!(options.browser_args().is_empty());
        assert!(options.capabilities()["capabilities"]["alwaysMatch"]["moz:firefoxOptions"].is_object());
    }

    #[test]
    fn test_locator_mapping() {
        assert_eq!(
            locator(&Selector::new(Strategy::Id, "username")),
            ("css selector", "[id=\"username\"]".to_string())
        );
        assert_eq!(
            locator(&Selector::new(Strategy::Name, "q")),
            ("css selector", "[name=\"q\"]".to_string())
        );
        assert_eq!(
            locator(&Selector::new(Strategy::ClassName, "flash.success")),
            ("css selector", ".flash.success".to_string())
        );
        assert_eq!(
            locator(&Selector::new(Strategy::LinkText, "Logout")),
            ("link text", "Logout".to_string())
        );
        assert_eq!(
            locator(&Selector::new(Strategy::TagName, "h3")),
            ("tag name", "h3".to_string())
        );
    }
}
