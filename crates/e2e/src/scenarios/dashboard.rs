use async_trait::async_trait;

use crate::check::SoftCheck;
use crate::error::E2eResult;
use crate::helpers::{wait_for_settled, TextPresent};
use crate::report::{log_pass, log_step};

use super::{Scenario, ScenarioContext};

/// Summary metric that only renders once dashboard data has arrived
const METRIC_LABEL: &str = "SPK Aktif";
const METRIC_ELEMENTS: &str = "h2, h3, p, span";

/// Open the dashboard and wait for its data
pub struct Dashboard;

#[async_trait]
impl Scenario for Dashboard {
    fn name(&self) -> &str {
        "Dashboard"
    }

    async fn run(&self, ctx: &ScenarioContext<'_>) -> E2eResult<()> {
        log_step("TEST 2: Dashboard: wait for data to load");
        let timeouts = &ctx.config.timeouts;

        ctx.open("/").await?;

        let metric = wait_for_settled(
            ctx.page,
            &TextPresent::new(METRIC_ELEMENTS, METRIC_LABEL),
            timeouts.dashboard_metric(),
        )
        .await;
        ctx.check(SoftCheck::from_condition(
            metric,
            format!("Dashboard heading '{}' visible", METRIC_LABEL),
            format!("Dashboard metric '{}' did not appear", METRIC_LABEL),
        ));

        let loaded = ctx.data_loaded(timeouts.dashboard_loaded()).await;
        ctx.check(SoftCheck::from_condition(
            loaded,
            "All skeleton loaders disappeared, data fully loaded",
            "Some skeleton loaders still visible after timeout",
        ));

        ctx.settle(2000).await;
        ctx.screenshot("02_dashboard_loaded").await;
        log_pass("Dashboard loaded with full data");
        Ok(())
    }
}
