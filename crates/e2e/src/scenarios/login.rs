use async_trait::async_trait;

use crate::check::ensure;
use crate::error::E2eResult;
use crate::page::{wait_for_url, Locator};
use crate::report::{log_pass, log_step};
use crate::selectors;

use super::{Scenario, ScenarioContext};

/// Sign in with the configured credentials
pub struct Login;

#[async_trait]
impl Scenario for Login {
    fn name(&self) -> &str {
        "Login"
    }

    async fn run(&self, ctx: &ScenarioContext<'_>) -> E2eResult<()> {
        log_step("TEST 1: Login as Super Admin");
        let page = ctx.page;

        ctx.open("/login").await?;

        page.fill(&Locator::css(selectors::input_named("email")), &ctx.config.email)
            .await?;
        page.fill(&Locator::css(selectors::input_named("password")), &ctx.config.password)
            .await?;
        page.click(&Locator::css(selectors::SUBMIT_BUTTON)).await?;

        wait_for_url(page, |url| !url.contains("login"), ctx.config.timeouts.login_redirect()).await?;
        ctx.network_idle().await?;

        let url = page.url().await?;
        ensure(!url.contains("login"), format!("Still on login page: {}", url))?;
        log_pass(&format!("Logged in → {}", url));
        ctx.screenshot("01_login_success").await;
        Ok(())
    }
}
