//! Mock WebDriver implementation for testing
//!
//! `MockSite` describes pages as flat lists of `MockNode`s. `MockDriver` loads
//! them on navigation and keeps live state (typed values, checkbox state,
//! timed visibility) that element handles read and mutate. Timings are
//! measured with `tokio::time::Instant`, so tests running on a paused clock
//! see deterministic behavior.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

use super::scripts;
use super::traits::{ElementHandle, FrameRef, Gesture, SelectBy, WebDriver, WebElement};
use crate::selector::{Selector, Strategy};
use crate::{Error, Result};

/// 1x1 transparent PNG
const PNG_PIXEL: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

/// Poll step used while honoring the implicit wait
const FIND_POLL: Duration = Duration::from_millis(50);

/// Side effect of clicking a node
#[derive(Debug, Clone)]
pub enum ClickEffect {
    /// Load another page
    Navigate(String),
    /// Make the node matching `target` present and visible after a delay
    Reveal { target: String, after: Duration },
    /// Hide the node matching `target` after a delay
    Hide { target: String, after: Duration },
}

/// Static description of one DOM node
#[derive(Debug, Clone)]
pub struct MockNode {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    aliases: Vec<String>,
    displayed: bool,
    enabled: bool,
    selected: bool,
    attached: bool,
    appear_after: Duration,
    show_after: Option<Duration>,
    hide_after: Option<Duration>,
    on_click: Option<ClickEffect>,
    options: Vec<(String, String)>,
}

impl MockNode {
    /// Create a visible, enabled node
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_lowercase(),
            attrs: BTreeMap::new(),
            text: String::new(),
            aliases: vec![],
            displayed: true,
            enabled: true,
            selected: false,
            attached: true,
            appear_after: Duration::ZERO,
            show_after: None,
            hide_after: None,
            on_click: None,
            options: vec![],
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn name(self, name: &str) -> Self {
        self.attr("name", name)
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Extra raw css/xpath selector this node answers to
    pub fn alias(mut self, selector: &str) -> Self {
        self.aliases.push(selector.to_string());
        self
    }

    /// Present in the DOM but not rendered
    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn checked(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Not in the DOM until revealed by a click effect
    pub fn detached(mut self) -> Self {
        self.attached = false;
        self
    }

    /// Inserted into the DOM this long after page load
    pub fn appear_after(mut self, delay: Duration) -> Self {
        self.appear_after = delay;
        self
    }

    /// Rendered this long after page load
    pub fn show_after(mut self, delay: Duration) -> Self {
        self.show_after = Some(delay);
        self
    }

    /// Hidden this long after page load
    pub fn hide_after(mut self, delay: Duration) -> Self {
        self.hide_after = Some(delay);
        self
    }

    pub fn on_click(mut self, effect: ClickEffect) -> Self {
        self.on_click = Some(effect);
        self
    }

    /// Dropdown options as `(text, value)`; the first is selected on load
    pub fn options(mut self, options: &[(&str, &str)]) -> Self {
        self.options = options
            .iter()
            .map(|(t, v)| (t.to_string(), v.to_string()))
            .collect();
        self
    }

    fn classes(&self) -> impl Iterator<Item = &str> {
        self.attrs
            .get("class")
            .map(|c| c.split_whitespace())
            .into_iter()
            .flatten()
    }

    fn matches(&self, selector: &Selector) -> bool {
        let value = selector.value.as_str();
        match selector.strategy {
            Strategy::Id => self.attrs.get("id").map(String::as_str) == Some(value),
            Strategy::Name => self.attrs.get("name").map(String::as_str) == Some(value),
            Strategy::ClassName => self.has_classes(value.split('.')),
            Strategy::TagName => self.tag == value.to_lowercase(),
            Strategy::LinkText => self.tag == "a" && self.text.trim() == value,
            Strategy::PartialLinkText => self.tag == "a" && self.text.contains(value),
            Strategy::XPath => self.aliases.iter().any(|a| a == value),
            Strategy::Css => self.aliases.iter().any(|a| a == value) || self.matches_css(value),
        }
    }

    fn has_classes<'a>(&self, wanted: impl Iterator<Item = &'a str>) -> bool {
        let mut any = false;
        for class in wanted.filter(|c| !c.is_empty()) {
            any = true;
            if !self.classes().any(|c| c == class) {
                return false;
            }
        }
        any
    }

    /// Simple css: `#id`, `.a.b`, `tag`, `tag.a`, `[k='v']`, `tag[k="v"]`
    fn matches_css(&self, css: &str) -> bool {
        if css.contains([' ', '>', ',', ':', '+', '~']) {
            return false;
        }
        if let Some(id) = css.strip_prefix('#') {
            return self.attrs.get("id").map(String::as_str) == Some(id);
        }

        let (head, attr) = match css.find('[') {
            Some(pos) => (&css[..pos], Some(&css[pos..])),
            None => (css, None),
        };
        let mut parts = head.split('.');
        let tag = parts.next().unwrap_or_default();
        if !tag.is_empty() && tag.to_lowercase() != self.tag {
            return false;
        }
        let classes: Vec<&str> = parts.collect();
        if !classes.is_empty() && !self.has_classes(classes.into_iter()) {
            return false;
        }

        match attr {
            None => !head.is_empty(),
            Some(attr) => {
                let inner = attr.trim_start_matches('[').trim_end_matches(']');
                match inner.split_once('=') {
                    Some((key, value)) => {
                        let value = value.trim_matches(|c| c == '"' || c == '\'');
                        self.attrs.get(key).map(String::as_str) == Some(value)
                    }
                    None => self.attrs.contains_key(inner),
                }
            }
        }
    }

    fn is_toggle(&self) -> bool {
        self.tag == "input"
            && matches!(
                self.attrs.get("type").map(String::as_str),
                Some("checkbox") | Some("radio")
            )
    }

    fn is_editable(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea")
    }
}

/// One page of a mock site
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    title: String,
    nodes: Vec<MockNode>,
    loading_for: Duration,
    ajax_for: Duration,
}

impl MockPage {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn node(mut self, node: MockNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// `document.readyState` stays "loading" this long after navigation
    pub fn loading_for(mut self, duration: Duration) -> Self {
        self.loading_for = duration;
        self
    }

    /// `jQuery.active` stays non-zero this long after navigation
    pub fn ajax_for(mut self, duration: Duration) -> Self {
        self.ajax_for = duration;
        self
    }
}

/// Pages keyed by URL
#[derive(Debug, Clone, Default)]
pub struct MockSite {
    pages: HashMap<String, MockPage>,
}

impl MockSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: MockPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }
}

#[derive(Debug)]
struct LiveNode {
    node: MockNode,
    present_at: Option<Instant>,
    shown_at: Option<Instant>,
    hidden_at: Option<Instant>,
    selected: bool,
    value: String,
    selected_option: Option<usize>,
}

impl LiveNode {
    fn load(node: &MockNode, loaded_at: Instant) -> Self {
        Self {
            present_at: node.attached.then(|| loaded_at + node.appear_after),
            shown_at: node.show_after.map(|d| loaded_at + d),
            hidden_at: node.hide_after.map(|d| loaded_at + d),
            selected: node.selected,
            value: node.attrs.get("value").cloned().unwrap_or_default(),
            selected_option: (!node.options.is_empty()).then_some(0),
            node: node.clone(),
        }
    }

    fn is_present(&self, now: Instant) -> bool {
        self.present_at.is_some_and(|t| now >= t)
    }

    fn is_displayed(&self, now: Instant) -> bool {
        let shown = match self.shown_at {
            Some(t) => now >= t,
            None => self.node.displayed,
        };
        let hidden = self.hidden_at.is_some_and(|t| now >= t);
        self.is_present(now) && shown && !hidden
    }
}

#[derive(Debug)]
struct MockState {
    site: MockSite,
    url: String,
    history: Vec<String>,
    cursor: usize,
    generation: u64,
    title: String,
    nodes: Vec<LiveNode>,
    loading_until: Instant,
    ajax_until: Instant,
    implicit_waits: Vec<Duration>,
    implicit_wait: Duration,
    page_load_timeout: Option<Duration>,
    window: Option<(u32, u32)>,
    maximized: bool,
    calls: Vec<String>,
    script_results: HashMap<String, Value>,
    find_calls: usize,
    find_failures: usize,
    fail_screenshots: bool,
    fail_maximize: bool,
    quit: bool,
}

impl MockState {
    fn load(&mut self, url: &str) {
        let now = Instant::now();
        let page = self.site.pages.get(url).cloned().unwrap_or_default();
        self.url = url.to_string();
        self.generation += 1;
        self.title = page.title.clone();
        self.nodes = page.nodes.iter().map(|n| LiveNode::load(n, now)).collect();
        self.loading_until = now + page.loading_for;
        self.ajax_until = now + page.ajax_for;
    }

    fn visit(&mut self, url: &str) {
        self.history.truncate(self.cursor + 1);
        self.history.push(url.to_string());
        self.cursor = self.history.len() - 1;
        self.load(url);
    }

    fn matching(&self, selector: &Selector) -> Vec<usize> {
        let now = Instant::now();
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_present(now) && n.node.matches(selector))
            .map(|(i, _)| i)
            .collect()
    }

    fn target_index(&self, target: &str) -> Option<usize> {
        let selector = Selector::from(target);
        self.nodes.iter().position(|n| {
            n.node.aliases.iter().any(|a| a == target) || n.node.matches(&selector)
        })
    }

    fn apply(&mut self, effect: ClickEffect) {
        let now = Instant::now();
        match effect {
            ClickEffect::Navigate(url) => self.visit(&url),
            ClickEffect::Reveal { target, after } => {
                if let Some(index) = self.target_index(&target) {
                    let at = now + after;
                    let node = &mut self.nodes[index];
                    node.present_at = Some(node.present_at.map_or(at, |p| p.min(at)));
                    node.shown_at = Some(at);
                    node.hidden_at = None;
                }
            }
            ClickEffect::Hide { target, after } => {
                if let Some(index) = self.target_index(&target) {
                    self.nodes[index].hidden_at = Some(now + after);
                }
            }
        }
    }
}

/// Mock WebDriver session
#[derive(Debug, Clone)]
pub struct MockDriver {
    id: String,
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    /// Create a driver on `about:blank` of the given site
    pub fn new(site: MockSite) -> Self {
        let now = Instant::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            state: Arc::new(Mutex::new(MockState {
                site,
                url: "about:blank".to_string(),
                history: vec!["about:blank".to_string()],
                cursor: 0,
                generation: 0,
                title: String::new(),
                nodes: vec![],
                loading_until: now,
                ajax_until: now,
                implicit_waits: vec![],
                implicit_wait: Duration::ZERO,
                page_load_timeout: None,
                window: None,
                maximized: false,
                calls: vec![],
                script_results: HashMap::new(),
                find_calls: 0,
                find_failures: 0,
                fail_screenshots: false,
                fail_maximize: false,
                quit: false,
            })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MockState>> {
        let state = self
            .state
            .lock()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;
        if state.quit {
            return Err(Error::WebDriver {
                code: "invalid session id".to_string(),
                message: format!("Session {} was quit", self.id),
            });
        }
        Ok(state)
    }

    fn record(&self, call: String) -> Result<()> {
        self.lock()?.calls.push(call);
        Ok(())
    }

    fn handle(&self, index: usize, generation: u64) -> ElementHandle {
        Arc::new(MockElement {
            id: format!("mock-{}-{}", generation, index),
            index,
            generation,
            driver: self.clone(),
        })
    }

    /// Fail the next `count` element lookups with a stale reference error
    pub fn fail_next_finds(&self, count: usize) {
        if let Ok(mut state) = self.state.lock() {
            state.find_failures = count;
        }
    }

    /// Make screenshot capture fail
    pub fn fail_screenshots(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_screenshots = fail;
        }
    }

    /// Make window maximization fail
    pub fn fail_maximize(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_maximize = fail;
        }
    }

    /// Answer a custom script with a fixed value
    pub fn set_script_result(&self, script: &str, value: Value) {
        if let Ok(mut state) = self.state.lock() {
            state.script_results.insert(script.to_string(), value);
        }
    }

    /// Every implicit wait that was set, in order
    pub fn implicit_waits(&self) -> Vec<Duration> {
        self.state
            .lock()
            .map(|s| s.implicit_waits.clone())
            .unwrap_or_default()
    }

    /// Page load timeout, if one was set
    pub fn page_load_timeout(&self) -> Option<Duration> {
        self.state.lock().ok().and_then(|s| s.page_load_timeout)
    }

    /// Whether the window was maximized
    pub fn is_maximized(&self) -> bool {
        self.state.lock().map(|s| s.maximized).unwrap_or(false)
    }

    /// Window size, if one was set
    pub fn window_size(&self) -> Option<(u32, u32)> {
        self.state.lock().ok().and_then(|s| s.window)
    }

    /// Recorded interactions such as `click:mock-1-0` or `hover:mock-1-2`
    pub fn calls(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.calls.clone())
            .unwrap_or_default()
    }

    /// Number of `find_element`/`find_elements` calls
    pub fn find_calls(&self) -> usize {
        self.state.lock().map(|s| s.find_calls).unwrap_or(0)
    }

    /// Whether `quit` was called
    pub fn is_quit(&self) -> bool {
        self.state.lock().map(|s| s.quit).unwrap_or(false)
    }

    fn find_now(&self, selector: &Selector) -> Result<(Vec<usize>, u64)> {
        let mut state = self.lock()?;
        state.find_calls += 1;
        if state.find_failures > 0 {
            state.find_failures -= 1;
            return Err(Error::stale_element(format!("Injected failure for {}", selector)));
        }
        Ok((state.matching(selector), state.generation))
    }
}

#[async_trait]
impl WebDriver for MockDriver {
    fn session_id(&self) -> &str {
        &self.id
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.lock()?.visit(url);
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.lock()?.url.clone())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.lock()?.title.clone())
    }

    async fn back(&self) -> Result<()> {
        let mut state = self.lock()?;
        if state.cursor > 0 {
            state.cursor -= 1;
            let url = state.history[state.cursor].clone();
            state.load(&url);
        }
        Ok(())
    }

    async fn forward(&self) -> Result<()> {
        let mut state = self.lock()?;
        if state.cursor + 1 < state.history.len() {
            state.cursor += 1;
            let url = state.history[state.cursor].clone();
            state.load(&url);
        }
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        let mut state = self.lock()?;
        let url = state.url.clone();
        state.load(&url);
        Ok(())
    }

    async fn find_element(&self, selector: &Selector) -> Result<ElementHandle> {
        let implicit = self.lock()?.implicit_wait;
        let deadline = Instant::now() + implicit;
        loop {
            let (found, generation) = self.find_now(selector)?;
            if let Some(&index) = found.first() {
                return Ok(self.handle(index, generation));
            }
            if Instant::now() >= deadline {
                return Err(Error::element_not_found(selector.to_string()));
            }
            tokio::time::sleep(FIND_POLL).await;
        }
    }

    async fn find_elements(&self, selector: &Selector) -> Result<Vec<ElementHandle>> {
        let (found, generation) = self.find_now(selector)?;
        Ok(found
            .into_iter()
            .map(|index| self.handle(index, generation))
            .collect())
    }

    async fn execute_script(&self, script: &str, _args: Vec<Value>) -> Result<Value> {
        let now = Instant::now();
        let state = self.lock()?;
        Ok(match script {
            scripts::READY_STATE => {
                json!(if now >= state.loading_until { "complete" } else { "loading" })
            }
            scripts::JQUERY_ACTIVE => json!(if now >= state.ajax_until { 0 } else { 1 }),
            _ => state.script_results.get(script).cloned().unwrap_or(Value::Null),
        })
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        if self.lock()?.fail_screenshots {
            return Err(Error::action_failure("Screenshot capture failed"));
        }
        BASE64
            .decode(PNG_PIXEL)
            .map_err(|e| Error::internal(format!("Failed to decode screenshot: {}", e)))
    }

    async fn implicitly_wait(&self, timeout: Duration) -> Result<()> {
        let mut state = self.lock()?;
        state.implicit_wait = timeout;
        state.implicit_waits.push(timeout);
        Ok(())
    }

    async fn set_page_load_timeout(&self, timeout: Duration) -> Result<()> {
        self.lock()?.page_load_timeout = Some(timeout);
        Ok(())
    }

    async fn set_window_size(&self, width: u32, height: u32) -> Result<()> {
        self.lock()?.window = Some((width, height));
        Ok(())
    }

    async fn maximize_window(&self) -> Result<()> {
        let mut state = self.lock()?;
        if state.fail_maximize {
            return Err(Error::WebDriver {
                code: "unsupported operation".to_string(),
                message: "Window cannot be maximized".to_string(),
            });
        }
        state.maximized = true;
        Ok(())
    }

    async fn switch_to_frame(&self, frame: FrameRef) -> Result<()> {
        let target = match frame {
            FrameRef::Index(index) => index.to_string(),
            FrameRef::Name(name) => name,
            FrameRef::Element(element) => element.id().to_string(),
        };
        self.record(format!("frame:{}", target))
    }

    async fn switch_to_default_content(&self) -> Result<()> {
        self.record("frame:default".to_string())
    }

    async fn perform_gesture(&self, gesture: Gesture) -> Result<()> {
        let call = match gesture {
            Gesture::Hover(el) => format!("hover:{}", el.id()),
            Gesture::DoubleClick(el) => format!("double_click:{}", el.id()),
            Gesture::ContextClick(el) => format!("context_click:{}", el.id()),
            Gesture::DragAndDrop { source, target } => {
                format!("drag:{}->{}", source.id(), target.id())
            }
        };
        self.record(call)
    }

    async fn quit(&self) -> Result<()> {
        self.lock()?.quit = true;
        Ok(())
    }
}

/// Element handle into a `MockDriver` page
#[derive(Debug)]
pub struct MockElement {
    id: String,
    index: usize,
    generation: u64,
    driver: MockDriver,
}

impl MockElement {
    fn with_node<T>(&self, f: impl FnOnce(&mut LiveNode, Instant) -> Result<T>) -> Result<T> {
        let now = Instant::now();
        let mut state = self.driver.lock()?;
        if state.generation != self.generation {
            return Err(Error::stale_element(self.id.clone()));
        }
        let node = state
            .nodes
            .get_mut(self.index)
            .filter(|n| n.is_present(now))
            .ok_or_else(|| Error::stale_element(self.id.clone()))?;
        f(node, now)
    }

    fn effect(&self, effect: Option<ClickEffect>) -> Result<()> {
        if let Some(effect) = effect {
            self.driver.lock()?.apply(effect);
        }
        Ok(())
    }
}

#[async_trait]
impl WebElement for MockElement {
    fn id(&self) -> &str {
        &self.id
    }

    async fn click(&self) -> Result<()> {
        let effect = self.with_node(|node, now| {
            if !node.is_displayed(now) {
                return Err(Error::not_interactable(self.id.clone()));
            }
            if !node.node.enabled {
                return Ok(None);
            }
            if node.node.is_toggle() {
                node.selected = !node.selected;
            }
            Ok(node.node.on_click.clone())
        })?;
        self.driver.record(format!("click:{}", self.id))?;
        self.effect(effect)
    }

    async fn clear(&self) -> Result<()> {
        self.with_node(|node, _| {
            node.value.clear();
            Ok(())
        })
    }

    async fn send_keys(&self, text: &str) -> Result<()> {
        self.with_node(|node, now| {
            if !node.is_displayed(now) || !node.node.enabled {
                return Err(Error::not_interactable(self.id.clone()));
            }
            node.value.push_str(text);
            Ok(())
        })
    }

    async fn submit(&self) -> Result<()> {
        self.with_node(|_, _| Ok(()))?;
        let effect = {
            let state = self.driver.lock()?;
            state
                .nodes
                .iter()
                .find(|n| n.node.attrs.get("type").map(String::as_str) == Some("submit"))
                .and_then(|n| n.node.on_click.clone())
        };
        self.driver.record(format!("submit:{}", self.id))?;
        self.effect(effect)
    }

    async fn text(&self) -> Result<String> {
        self.with_node(|node, now| {
            Ok(if node.is_displayed(now) {
                node.node.text.clone()
            } else {
                String::new()
            })
        })
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.with_node(|node, _| {
            Ok(match name {
                "value" if node.node.is_editable() => Some(node.value.clone()),
                "value" if !node.node.options.is_empty() => node
                    .selected_option
                    .and_then(|i| node.node.options.get(i))
                    .map(|(_, v)| v.clone()),
                "checked" if node.node.is_toggle() => node.selected.then(|| "true".to_string()),
                _ => node.node.attrs.get(name).cloned(),
            })
        })
    }

    async fn is_displayed(&self) -> Result<bool> {
        self.with_node(|node, now| Ok(node.is_displayed(now)))
    }

    async fn is_enabled(&self) -> Result<bool> {
        self.with_node(|node, _| Ok(node.node.enabled))
    }

    async fn is_selected(&self) -> Result<bool> {
        self.with_node(|node, _| Ok(node.selected))
    }

    async fn tag_name(&self) -> Result<String> {
        self.with_node(|node, _| Ok(node.node.tag.clone()))
    }

    async fn select_option(&self, by: SelectBy) -> Result<bool> {
        self.with_node(|node, _| {
            let options = &node.node.options;
            let hit = match &by {
                SelectBy::Text(text) => options.iter().position(|(t, _)| t == text),
                SelectBy::Value(value) => options.iter().position(|(_, v)| v == value),
                SelectBy::Index(index) => (*index < options.len()).then_some(*index),
            };
            if let Some(index) = hit {
                node.selected_option = Some(index);
            }
            Ok(hit.is_some())
        })
    }

    async fn selected_option(&self) -> Result<Option<(String, String)>> {
        self.with_node(|node, _| {
            Ok(node
                .selected_option
                .and_then(|i| node.node.options.get(i))
                .cloned())
        })
    }
}
