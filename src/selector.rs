//! Selector resolution
//!
//! Turns a raw selector string, optionally paired with an explicit strategy
//! name, into a canonical `(strategy, value)` pair. Prefix rules are checked
//! in order and the first match wins:
//!
//! | Raw form | Strategy | Value |
//! |---|---|---|
//! | `#login` (no space, `>` or `,`) | `id` | `login` |
//! | `.flash.success` (no space, `>` or `,`) | `class_name` | `flash.success` |
//! | `@email` | `name` | `email` |
//! | `//div`, `(//a)[1]` | `xpath` | unchanged |
//! | `link=Logout` | `link_text` | `Logout` |
//! | `partial-link=Log` | `partial_link_text` | `Log` |
//! | anything else | `css` | unchanged |

use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Element lookup strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Css,
    XPath,
    Id,
    Name,
    TagName,
    ClassName,
    LinkText,
    PartialLinkText,
}

/// Explicit strategy names accepted from callers, matched case-insensitively
static STRATEGY_NAMES: phf::Map<&'static str, Strategy> = phf_map! {
    "css" => Strategy::Css,
    "css_selector" => Strategy::Css,
    "xpath" => Strategy::XPath,
    "id" => Strategy::Id,
    "name" => Strategy::Name,
    "tag" => Strategy::TagName,
    "tag_name" => Strategy::TagName,
    "class" => Strategy::ClassName,
    "class_name" => Strategy::ClassName,
    "link_text" => Strategy::LinkText,
    "partial_link_text" => Strategy::PartialLinkText,
};

impl Strategy {
    /// Look up an explicit strategy name; unknown names fall back to css
    pub fn from_name(name: &str) -> Self {
        STRATEGY_NAMES
            .get(name.trim().to_ascii_lowercase().as_str())
            .copied()
            .unwrap_or(Strategy::Css)
    }

    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Css => "css",
            Strategy::XPath => "xpath",
            Strategy::Id => "id",
            Strategy::Name => "name",
            Strategy::TagName => "tag_name",
            Strategy::ClassName => "class_name",
            Strategy::LinkText => "link_text",
            Strategy::PartialLinkText => "partial_link_text",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical `(strategy, value)` pair identifying a DOM node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    pub strategy: Strategy,
    pub value: String,
}

impl Selector {
    /// Build a selector without any prefix detection
    pub fn new(strategy: Strategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// Resolve with an explicit strategy name that overrides detection
    pub fn explicit(raw: &str, strategy: &str) -> Self {
        resolve(raw, Some(strategy))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.strategy, self.value)
    }
}

impl From<&str> for Selector {
    fn from(raw: &str) -> Self {
        resolve(raw, None)
    }
}

impl From<String> for Selector {
    fn from(raw: String) -> Self {
        resolve(&raw, None)
    }
}

impl From<&String> for Selector {
    fn from(raw: &String) -> Self {
        resolve(raw, None)
    }
}

impl From<&Selector> for Selector {
    fn from(selector: &Selector) -> Self {
        selector.clone()
    }
}

fn is_simple(raw: &str) -> bool {
    !raw.contains([' ', '>', ','])
}

/// Resolve a raw selector into a canonical selector
pub fn resolve(raw: &str, explicit_strategy: Option<&str>) -> Selector {
    if let Some(name) = explicit_strategy {
        return Selector::new(Strategy::from_name(name), raw);
    }

    if let Some(rest) = raw.strip_prefix('#').filter(|_| is_simple(raw)) {
        return Selector::new(Strategy::Id, rest);
    }
    if let Some(rest) = raw.strip_prefix('.').filter(|_| is_simple(raw)) {
        return Selector::new(Strategy::ClassName, rest);
    }
    if let Some(rest) = raw.strip_prefix('@') {
        return Selector::new(Strategy::Name, rest);
    }
    if raw.starts_with("//") || raw.starts_with("(//") {
        return Selector::new(Strategy::XPath, raw);
    }
    if let Some(rest) = raw.strip_prefix("link=") {
        return Selector::new(Strategy::LinkText, rest);
    }
    if let Some(rest) = raw.strip_prefix("partial-link=") {
        return Selector::new(Strategy::PartialLinkText, rest);
    }

    Selector::new(Strategy::Css, raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_rules() {
        assert_eq!(resolve("#login", None), Selector::new(Strategy::Id, "login"));
        assert_eq!(
            resolve(".flash.success", None),
            Selector::new(Strategy::ClassName, "flash.success")
        );
        assert_eq!(resolve("@email", None), Selector::new(Strategy::Name, "email"));
        assert_eq!(
            resolve("//div[@id='x']", None),
            Selector::new(Strategy::XPath, "//div[@id='x']")
        );
        assert_eq!(
            resolve("(//input[@type='checkbox'])[1]", None),
            Selector::new(Strategy::XPath, "(//input[@type='checkbox'])[1]")
        );
        assert_eq!(
            resolve("link=Logout", None),
            Selector::new(Strategy::LinkText, "Logout")
        );
        assert_eq!(
            resolve("partial-link=Log", None),
            Selector::new(Strategy::PartialLinkText, "Log")
        );
        assert_eq!(
            resolve("button[type='submit']", None),
            Selector::new(Strategy::Css, "button[type='submit']")
        );
    }

    #[test]
    fn test_compound_hash_and_dot_fall_through_to_css() {
        assert_eq!(
            resolve("#table1 th:nth-child(1)", None),
            Selector::new(Strategy::Css, "#table1 th:nth-child(1)")
        );
        assert_eq!(
            resolve(".menu > li", None),
            Selector::new(Strategy::Css, ".menu > li")
        );
        assert_eq!(resolve("#a,#b", None), Selector::new(Strategy::Css, "#a,#b"));
        // '@' has no compound restriction
        assert_eq!(
            resolve("@first name", None),
            Selector::new(Strategy::Name, "first name")
        );
    }

    #[test]
    fn test_explicit_strategy_wins() {
        assert_eq!(
            resolve("#username", Some("css")),
            Selector::new(Strategy::Css, "#username")
        );
        assert_eq!(
            resolve("username", Some("ID")),
            Selector::new(Strategy::Id, "username")
        );
        assert_eq!(
            resolve("btn", Some("Class")),
            Selector::new(Strategy::ClassName, "btn")
        );
        assert_eq!(
            resolve("a", Some("tag_name")),
            Selector::new(Strategy::TagName, "a")
        );
    }

    #[test]
    fn test_unknown_explicit_strategy_falls_back_to_css() {
        assert_eq!(
            resolve("div", Some("sizzle")),
            Selector::new(Strategy::Css, "div")
        );
    }

    #[test]
    fn test_resolve_is_deterministic() {
        for raw in ["#a", ".b", "@c", "//d", "link=e", "partial-link=f", "g h", ""] {
            assert_eq!(resolve(raw, None), resolve(raw, None));
        }
        assert_eq!(resolve("", None), Selector::new(Strategy::Css, ""));
    }

    #[test]
    fn test_from_conversions() {
        let sel: Selector = "#user".into();
        assert_eq!(sel.strategy, Strategy::Id);
        let sel: Selector = String::from("link=Home").into();
        assert_eq!(sel.value, "Home");
        assert_eq!(Selector::explicit("q", "name").strategy, Strategy::Name);
        assert_eq!(sel.to_string(), "link_text:Home");
    }
}
