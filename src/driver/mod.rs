//! # Browser driver layer
//!
//! The capability interface the harness drives browsers through, with two
//! bindings.
//!
//! ## Module structure
//! - `traits`: `WebDriver` and `WebElement` capability traits
//! - `types`: browser selection, launch options, W3C locator mapping
//! - `connection`: HTTP transport for one W3C WebDriver session
//! - `client`: `WebDriverSession`, the W3C binding
//! - `element`: remote element handles
//! - `scripts`: JavaScript snippets run in the page
//! - `mock`: in-memory driver for tests
//!
//! ## Example
//! ```rust,no_run
//! use harness_oxide::driver::{BrowserOptions, WebDriver, WebDriverSession, WebElement};
//! use harness_oxide::selector::Selector;
//!
//! # async fn example() -> harness_oxide::Result<()> {
//! let session = WebDriverSession::connect("http://localhost:4444", &BrowserOptions::default()).await?;
//! session.navigate("https://the-internet.herokuapp.com/login").await?;
//! let heading = session.find_element(&Selector::from("h2")).await?;
//! println!("{}", heading.text().await?);
//! session.quit().await?;
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod types;
pub mod connection;
pub mod client;
pub mod element;
pub mod scripts;
pub mod mock;


pub use traits::{ElementHandle, FrameRef, Gesture, SelectBy, WebDriver, WebElement};
pub use types::{BrowserOptions, BrowserType, ELEMENT_KEY};

pub use client::WebDriverSession;
pub use connection::HttpTransport;
pub use element::RemoteElement;

pub use mock::{ClickEffect, MockDriver, MockElement, MockNode, MockPage, MockSite};
