//! General interaction suites

use std::sync::Arc;

use super::{flows, LOGIN_PASSWORD, LOGIN_USERNAME};
use crate::runner::TestFile;

/// `suites/login.rs`: a single login round trip
pub fn login_file(base: &str) -> TestFile {
    let base: Arc<str> = Arc::from(base);
    TestFile::new("suites/login.rs").case("test_login", move |cmd| {
        let base = base.clone();
        async move { flows::login(&cmd, &base, LOGIN_USERNAME, LOGIN_PASSWORD).await }
    })
}

/// `suites/herokuapp.rs`: login, forms, selectors, waits and tables
pub fn interactions_file(base: &str) -> TestFile {
    let base: Arc<str> = Arc::from(base);
    let (b1, b2, b3, b4, b5) = (
        base.clone(),
        base.clone(),
        base.clone(),
        base.clone(),
        base,
    );

    TestFile::new("suites/herokuapp.rs")
        .case("test_login", move |cmd| {
            let base = b1.clone();
            async move { flows::login(&cmd, &base, LOGIN_USERNAME, LOGIN_PASSWORD).await }
        })
        .case("test_form_interactions", move |cmd| {
            let base = b2.clone();
            async move { flows::form_interactions(&cmd, &base).await }
        })
        .case("test_multiple_selector_types", move |cmd| {
            let base = b3.clone();
            async move {
                flows::multiple_selector_types(&cmd, &base, LOGIN_USERNAME, LOGIN_PASSWORD).await
            }
        })
        .case("test_dynamic_waits", move |cmd| {
            let base = b4.clone();
            async move { flows::dynamic_waits(&cmd, &base).await }
        })
        .case("test_table_interaction", move |cmd| {
            let base = b5.clone();
            async move { flows::table_interaction(&cmd, &base).await }
        })
}
