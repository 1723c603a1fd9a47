use async_trait::async_trait;

use crate::check::SoftCheck;
use crate::error::E2eResult;
use crate::page::Locator;
use crate::report::log_step;
use crate::selectors;

use super::{Scenario, ScenarioContext};

/// Follow each sidebar link from the dashboard
pub struct SidebarNavigation {
    /// (link label, expected path fragment)
    pub links: Vec<(String, String)>,
}

impl Default for SidebarNavigation {
    fn default() -> Self {
        Self {
            links: [
                ("Master Super Admin", "/super-admin"),
                ("Master PT", "/pt"),
                ("Master Tipe Barang", "/tipe-barang"),
            ]
            .into_iter()
            .map(|(label, path)| (label.to_string(), path.to_string()))
            .collect(),
        }
    }
}

#[async_trait]
impl Scenario for SidebarNavigation {
    fn name(&self) -> &str {
        "Sidebar Navigation"
    }

    async fn run(&self, ctx: &ScenarioContext<'_>) -> E2eResult<()> {
        log_step("TEST 6: Sidebar Navigation");
        let page = ctx.page;

        ctx.open("/").await?;

        for (label, expected_path) in &self.links {
            let link = Locator::css(selectors::link(label)).first();
            if !page.is_visible(&link).await? {
                ctx.check(SoftCheck::fail(format!("Sidebar link '{}' NOT visible", label)));
                continue;
            }

            page.click(&link).await?;
            ctx.network_idle().await?;
            ctx.settle(1000).await;

            let url = page.url().await?;
            ctx.check(SoftCheck::from_condition(
                url.contains(expected_path.as_str()),
                format!("Sidebar '{}' → {}", label, url),
                format!("Sidebar '{}' → unexpected URL: {}", label, url),
            ));
        }
        Ok(())
    }
}
