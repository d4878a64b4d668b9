//! Reusable test bodies
//!
//! Each flow drives one page of the demo site and fails with a readable
//! message when a check does not hold.

use anyhow::{ensure, Context};
use std::time::Duration;

use super::page;
use crate::commands::Commands;

/// Log in, land on the secure area, and log out again
pub async fn login(cmd: &Commands, base: &str, username: &str, password: &str) -> anyhow::Result<()> {
    cmd.browser.navigate(&page(base, "login")).await?;

    cmd.form.type_text("#username", username).await?;
    cmd.form.type_text("#password", password).await?;
    cmd.element.click("button[type='submit']").await?;

    cmd.wait.present(".flash.success", None).await?;
    ensure!(
        cmd.validation
            .assert_text_contains(".flash.success", "You logged into a secure area")
            .await?,
        "success banner missing after login"
    );
    ensure!(
        cmd.validation.assert_url_contains("/secure").await?,
        "login did not reach the secure area"
    );

    cmd.element.click("//a[@href='/logout']").await?;
    ensure!(
        cmd.validation.assert_url_contains("/login").await?,
        "logout did not return to the login page"
    );
    Ok(())
}

/// Dropdown selection followed by checkbox state
pub async fn form_interactions(cmd: &Commands, base: &str) -> anyhow::Result<()> {
    cmd.browser.navigate(&page(base, "dropdown")).await?;
    cmd.form.select_by_text("#dropdown", "Option 1").await?;
    let value = cmd.form.get_selected_option_value("#dropdown").await?;
    ensure!(value.as_deref() == Some("1"), "unexpected dropdown value {:?}", value);

    cmd.browser.navigate(&page(base, "checkboxes")).await?;
    let checkboxes = cmd.element.find_all("//input[@type='checkbox']").await;
    ensure!(checkboxes.len() == 2, "expected two checkboxes, found {}", checkboxes.len());

    let first = "(//input[@type='checkbox'])[1]";
    if !cmd.form.is_checked(first).await? {
        cmd.element.click(first).await?;
    }

    ensure!(cmd.form.is_checked(first).await?, "first checkbox unchecked");
    ensure!(
        cmd.form.is_checked("(//input[@type='checkbox'])[2]").await?,
        "second checkbox unchecked"
    );
    Ok(())
}

/// One pass over every selector shorthand
pub async fn multiple_selector_types(
    cmd: &Commands,
    base: &str,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    cmd.browser.navigate(&page(base, "login")).await?;

    cmd.form.clear("#username").await?;
    cmd.form.type_text("#username", username).await?;
    cmd.form.type_text("#password", password).await?;
    cmd.element.click("button.radius").await?;

    ensure!(
        cmd.validation
            .assert_element_exists("//h4[contains(text(), 'Welcome')]")
            .await?,
        "welcome heading missing"
    );

    cmd.element.click("link=Logout").await?;
    ensure!(cmd.element.exists(".large-4").await, "login column missing after logout");
    Ok(())
}

/// Start a delayed load and read the revealed text
pub async fn dynamic_waits(cmd: &Commands, base: &str) -> anyhow::Result<()> {
    cmd.browser.navigate(&page(base, "dynamic_loading/1")).await?;
    cmd.element.click("div#start button").await?;
    cmd.wait.invisible("//div[@id='loading']", None).await?;

    ensure!(
        cmd.validation.assert_text_contains("#finish", "Hello World").await?,
        "finish text never appeared"
    );
    Ok(())
}

/// Read cells and sort a table
pub async fn table_interaction(cmd: &Commands, base: &str) -> anyhow::Result<()> {
    cmd.browser.navigate(&page(base, "tables")).await?;

    let rows = cmd.element.find_all("table#table1 tbody tr").await;
    ensure!(!rows.is_empty(), "table has no rows");

    cmd.element
        .get_text("//table[@id='table1']//tr[1]/td[2]")
        .await?
        .context("first row has no second cell")?;

    cmd.element.click("#table1 th:nth-child(1)").await?;
    cmd.element
        .get_text("//table[@id='table1']//tr[1]/td[1]")
        .await?
        .context("sorted table lost its first cell")?;
    Ok(())
}

/// Click the start button with a short budget, then require the loading
/// indicator to clear within `invisible_within`
pub async fn start_and_wait_for_loading(
    cmd: &Commands,
    base: &str,
    start: &str,
    loading: &str,
    invisible_within: Duration,
) -> anyhow::Result<()> {
    cmd.browser.navigate(&page(base, "dynamic_loading/1")).await?;

    cmd.element
        .with_timeout(Duration::from_secs(3))
        .click(start)
        .await
        .context("start button not found")?;

    ensure!(
        cmd.wait.invisible(loading, Some(invisible_within)).await?,
        "loading indicator did not disappear within {:?}",
        invisible_within
    );
    Ok(())
}
