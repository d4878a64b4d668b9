//! Session lifecycle tests

use std::sync::Arc;
use std::time::Duration;

use crate::driver::{BrowserOptions, MockPage, MockSite, WebDriver};
use crate::session::mock::MockDriverFactory;
use crate::session::{SessionManager, SessionManagerImpl};
use crate::Error;

/// Helper function to create a manager plus the factory backing it
fn create_test_manager() -> (Arc<SessionManagerImpl>, Arc<MockDriverFactory>) {
    let site = MockSite::new().page("https://site.test/", MockPage::new("Home"));
    let factory = Arc::new(MockDriverFactory::new(site));
    (Arc::new(SessionManagerImpl::new(factory.clone())), factory)
}

#[tokio::test]
async fn test_session_is_configured_on_creation() {
    let (manager, factory) = create_test_manager();
    let options = BrowserOptions {
        implicit_wait: Duration::from_secs(4),
        page_load_timeout: Duration::from_secs(30),
        ..Default::default()
    };

    let session = manager.create_session("cfg", options).await.unwrap();
    session.driver.navigate("https://site.test/").await.unwrap();
    assert_eq!(session.driver.title().await.unwrap(), "Home");

    let drivers = factory.drivers();
    let driver = &drivers[0];
    assert_eq!(driver.implicit_waits(), vec![Duration::from_secs(4)]);
    assert_eq!(driver.page_load_timeout(), Some(Duration::from_secs(30)));
    assert!(driver.is_maximized());
}

#[tokio::test]
async fn test_maximize_failure_is_not_fatal() {
    let (manager, factory) = create_test_manager();
    factory.fail_maximize(true);

    let session = manager
        .create_session("max", BrowserOptions::default())
        .await
        .unwrap();
    assert_eq!(manager.session_count(), 1);
    assert!(!factory.drivers()[0].is_maximized());
    assert!(session.driver.maximize_window().await.is_err());
}

#[tokio::test]
async fn test_factory_failure_registers_nothing() {
    let (manager, factory) = create_test_manager();
    factory.fail_creates(true);

    let result = manager.create_session("broken", BrowserOptions::default()).await;
    assert!(matches!(result, Err(Error::WebDriver { .. })));
    assert_eq!(manager.session_count(), 0);
}

#[tokio::test]
async fn test_close_quits_driver() {
    let (manager, factory) = create_test_manager();
    manager
        .create_session("q", BrowserOptions::default())
        .await
        .unwrap();

    manager.close_session("q").await.unwrap();
    assert!(factory.drivers()[0].is_quit());
}

#[tokio::test]
async fn test_prefix_sweep() {
    let (manager, factory) = create_test_manager();
    for id in ["run1_a", "run1_b", "run2_a"] {
        manager
            .create_session(id, BrowserOptions::default())
            .await
            .unwrap();
    }

    let closed = manager.close_sessions_with_prefix("run1_").await;
    assert_eq!(closed, 2);
    assert_eq!(manager.list_sessions().unwrap(), vec!["run2_a".to_string()]);

    let quit: Vec<bool> = factory.drivers().iter().map(|d| d.is_quit()).collect();
    assert_eq!(quit, vec![true, true, false]);

    // Nothing left to sweep
    assert_eq!(manager.close_sessions_with_prefix("run1_").await, 0);
}
