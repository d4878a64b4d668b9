//! Timeout and retry demonstrations
//!
//! Several of these fail on purpose: a misspelled selector exhausts its
//! retries, a too-short wait gives up while the page is still loading. The
//! runner records them with structured timeout details.

use std::sync::Arc;
use std::time::Duration;

use super::{flows, page};
use crate::runner::TestFile;

const START: &str = "div#start button";
const LOADING: &str = "//div[@id='loading']";

/// `suites/element_timeout.rs`
pub fn element_timeout_file(base: &str) -> TestFile {
    let base: Arc<str> = Arc::from(base);
    let found = base.clone();

    TestFile::new("suites/element_timeout.rs")
        .case("test_element_timeout_example", move |cmd| {
            let base = base.clone();
            async move {
                cmd.browser.navigate(&page(&base, "dynamic_loading/1")).await?;
                // Misspelled on purpose: surfaces as an element timeout
                cmd.element
                    .locator()
                    .find_or_fail("div#starts button", Some(Duration::from_secs(3)))
                    .await?;
                Ok(())
            }
        })
        .case("test_find_or_skip", move |cmd| {
            let base = found.clone();
            async move {
                cmd.browser.navigate(&page(&base, "dynamic_loading/1")).await?;
                // Optional lookups yield None instead of failing the test
                let missing = cmd
                    .element
                    .locator()
                    .find("#non-existent-element", Some(Duration::from_secs(1)), false)
                    .await?;
                anyhow::ensure!(missing.is_none(), "unexpected element found");
                Ok(())
            }
        })
}

/// `suites/element_retries.rs`
pub fn element_retries_file(base: &str) -> TestFile {
    let base: Arc<str> = Arc::from(base);
    let (b1, b2, b3) = (base.clone(), base.clone(), base);

    TestFile::new("suites/element_retries.rs")
        .case("test_element_timeout_example", move |cmd| {
            let base = b1.clone();
            async move {
                flows::start_and_wait_for_loading(
                    &cmd,
                    &base,
                    "div#starts button",
                    LOADING,
                    Duration::from_secs(1),
                )
                .await
            }
        })
        .case("test_element_timeout_example2", move |cmd| {
            let base = b2.clone();
            async move {
                flows::start_and_wait_for_loading(&cmd, &base, START, LOADING, Duration::from_secs(1))
                    .await
            }
        })
        .case("test_element_timeout_example3", move |cmd| {
            let base = b3.clone();
            async move {
                flows::start_and_wait_for_loading(
                    &cmd,
                    &base,
                    START,
                    "//div[@id='loadings']",
                    Duration::from_secs(1),
                )
                .await
            }
        })
}
