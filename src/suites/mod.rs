//! # Built-in test suites
//!
//! Example test files against the public "the-internet" demo site. They
//! double as usage samples for every selector shorthand and command group.
//!
//! ## Module structure
//! - `flows`: reusable test bodies parameterized by site and credentials
//! - `herokuapp`: the login and the general interaction files
//! - `timeouts`: files demonstrating element timeouts and retries
//!
//! Every file is registered against a base URL, so the same suites run
//! against the live site or a mock copy of it.

pub mod flows;
pub mod herokuapp;
pub mod timeouts;

use crate::runner::TestRegistry;

/// Public demo site the suites are written against
pub const HEROKUAPP: &str = "https://the-internet.herokuapp.com";

/// Credentials accepted by the demo login form
pub const LOGIN_USERNAME: &str = "tomsmith";
pub const LOGIN_PASSWORD: &str = "SuperSecretPassword!";

/// Registry of every built-in file against the live demo site
pub fn registry() -> TestRegistry {
    registry_for(HEROKUAPP)
}

/// Registry of every built-in file against `base`
pub fn registry_for(base: &str) -> TestRegistry {
    TestRegistry::new()
        .register(herokuapp::login_file(base))
        .register(herokuapp::interactions_file(base))
        .register(timeouts::element_timeout_file(base))
        .register(timeouts::element_retries_file(base))
}

/// Absolute URL of a page under `base`
pub(crate) fn page(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_paths() {
        assert_eq!(
            registry().paths(),
            vec![
                "suites/login.rs",
                "suites/herokuapp.rs",
                "suites/element_timeout.rs",
                "suites/element_retries.rs",
            ]
        );
        assert_eq!(
            registry().functions("suites/herokuapp.rs").unwrap(),
            vec![
                "test_login",
                "test_form_interactions",
                "test_multiple_selector_types",
                "test_dynamic_waits",
                "test_table_interaction",
            ]
        );
    }

    #[test]
    fn test_page_joins_paths() {
        assert_eq!(page("https://a.test/", "/login"), "https://a.test/login");
        assert_eq!(page("https://a.test", "dynamic_loading/1"), "https://a.test/dynamic_loading/1");
    }
}
