//! Common test utilities
//!
//! A mock copy of the demo site and a harness wired to mock sessions.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use harness_oxide::config::Config;
use harness_oxide::driver::{ClickEffect, MockNode, MockPage, MockSite};
use harness_oxide::session::{MockDriverFactory, SessionManagerImpl};

pub const BASE: &str = "https://herokuapp.test";

fn url(path: &str) -> String {
    format!("{}/{}", BASE, path)
}

/// Mock of the pages the built-in suites visit
pub fn herokuapp_site() -> MockSite {
    MockSite::new()
        .page(
            &url("login"),
            MockPage::new("The Internet")
                .node(MockNode::new("div").class("large-4 columns"))
                .node(MockNode::new("input").id("username"))
                .node(MockNode::new("input").id("password").attr("type", "password"))
                .node(
                    MockNode::new("button")
                        .attr("type", "submit")
                        .class("radius")
                        .text("Login")
                        .on_click(ClickEffect::Navigate(url("secure"))),
                ),
        )
        .page(
            &url("secure"),
            MockPage::new("The Internet")
                .node(
                    MockNode::new("div")
                        .id("flash")
                        .class("flash success")
                        .text("You logged into a secure area!"),
                )
                .node(
                    MockNode::new("h4")
                        .class("subheader")
                        .text("Welcome to the Secure Area. When you are done click logout below.")
                        .alias("//h4[contains(text(), 'Welcome')]"),
                )
                .node(
                    MockNode::new("a")
                        .attr("href", "/logout")
                        .text("Logout")
                        .alias("//a[@href='/logout']")
                        .on_click(ClickEffect::Navigate(url("login"))),
                ),
        )
        .page(
            &url("dropdown"),
            MockPage::new("The Internet").node(MockNode::new("select").id("dropdown").options(&[
                ("Please select an option", ""),
                ("Option 1", "1"),
                ("Option 2", "2"),
            ])),
        )
        .page(
            &url("checkboxes"),
            MockPage::new("The Internet")
                .node(
                    MockNode::new("input")
                        .attr("type", "checkbox")
                        .alias("//input[@type='checkbox']")
                        .alias("(//input[@type='checkbox'])[1]"),
                )
                .node(
                    MockNode::new("input")
                        .attr("type", "checkbox")
                        .checked()
                        .alias("//input[@type='checkbox']")
                        .alias("(//input[@type='checkbox'])[2]"),
                ),
        )
        .page(
            &url("dynamic_loading/1"),
            MockPage::new("The Internet")
                .node(MockNode::new("div").id("start"))
                .node(
                    MockNode::new("button")
                        .text("Start")
                        .alias("div#start button")
                        .on_click(ClickEffect::Reveal {
                            target: "#finish".to_string(),
                            after: Duration::from_secs(2),
                        }),
                )
                .node(
                    MockNode::new("div")
                        .id("loading")
                        .hidden()
                        .alias("//div[@id='loading']"),
                )
                .node(MockNode::new("div").id("finish").text("Hello World!").hidden()),
        )
        .page(
            &url("tables"),
            MockPage::new("The Internet")
                .node(
                    MockNode::new("th")
                        .text("Last Name")
                        .alias("#table1 th:nth-child(1)"),
                )
                .node(MockNode::new("tr").alias("table#table1 tbody tr"))
                .node(MockNode::new("tr").alias("table#table1 tbody tr"))
                .node(MockNode::new("tr").alias("table#table1 tbody tr"))
                .node(
                    MockNode::new("td")
                        .text("Smith")
                        .alias("//table[@id='table1']//tr[1]/td[1]"),
                )
                .node(
                    MockNode::new("td")
                        .text("John")
                        .alias("//table[@id='table1']//tr[1]/td[2]"),
                ),
        )
}

/// Configuration for mock runs: no screenshots, short waits
pub fn test_config() -> Arc<Config> {
    Arc::new(Config {
        implicit_wait: 3.0,
        page_load_timeout: 10.0,
        retry_delay: 0.5,
        take_screenshot_on_failure: false,
        take_screenshot_on_success: false,
        max_workers: 3,
        ..Default::default()
    })
}

/// Session manager over mock drivers of the demo site
pub fn mock_sessions() -> (Arc<SessionManagerImpl>, Arc<MockDriverFactory>) {
    mock_sessions_for(herokuapp_site())
}

pub fn mock_sessions_for(site: MockSite) -> (Arc<SessionManagerImpl>, Arc<MockDriverFactory>) {
    let factory = Arc::new(MockDriverFactory::new(site));
    (Arc::new(SessionManagerImpl::new(factory.clone())), factory)
}
