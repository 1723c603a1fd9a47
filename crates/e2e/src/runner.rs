//! Main test runner that owns the browser session and runs scenarios in order

use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::config::RunConfig;
use crate::error::{E2eError, E2eResult};
use crate::helpers;
use crate::page::Page;
use crate::playwright::PlaywrightHandle;
use crate::report::{log_fail, RunSummary, ScenarioFailure};
use crate::scenarios::{default_suite, Scenario, ScenarioContext};

/// Main E2E test runner
pub struct TestRunner {
    config: RunConfig,
    scenarios: Vec<Box<dyn Scenario>>,
}

impl TestRunner {
    /// Runner for the full scenario list
    pub fn new(config: RunConfig) -> Self {
        Self::with_scenarios(config, default_suite())
    }

    pub fn with_scenarios(config: RunConfig, scenarios: Vec<Box<dyn Scenario>>) -> Self {
        Self { config, scenarios }
    }

    pub fn scenario_names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name()).collect()
    }

    /// Keep only the named scenarios, preserving run order
    pub fn select(mut self, names: &[String]) -> E2eResult<Self> {
        if names.is_empty() {
            return Ok(self);
        }
        if let Some(unknown) = names
            .iter()
            .find(|n| !self.scenarios.iter().any(|s| s.name() == n.as_str()))
        {
            return Err(E2eError::Config(format!(
                "unknown scenario '{}' (available: {})",
                unknown,
                self.scenario_names().join(", ")
            )));
        }
        self.scenarios.retain(|s| names.iter().any(|n| n == s.name()));
        Ok(self)
    }

    /// Check the target answers HTTP at all before starting a browser
    pub async fn preflight(&self) -> E2eResult<()> {
        let client = reqwest::Client::builder()
            .timeout(self.config.timeouts.preflight())
            .build()?;

        match client.get(&self.config.base_url).send().await {
            Ok(resp) => {
                info!("Target {} answered {}", self.config.base_url, resp.status());
                Ok(())
            }
            Err(e) => Err(E2eError::Preflight {
                url: self.config.base_url.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Launch the browser, run every scenario, and always close the browser
    pub async fn run(&self) -> E2eResult<RunSummary> {
        if self.config.preflight {
            self.preflight().await?;
        }

        let mut session = PlaywrightHandle::launch(self.config.playwright()).await?;
        let summary = self.run_on(&session).await;

        if let Err(e) = session.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        Ok(summary)
    }

    /// Run the scenarios against an already open page
    pub async fn run_on(&self, page: &dyn Page) -> RunSummary {
        let start = Instant::now();
        let ctx = ScenarioContext::new(page, &self.config);
        let mut summary = RunSummary::default();

        info!("Running {} scenario(s)...", self.scenarios.len());

        for scenario in &self.scenarios {
            let scenario_start = Instant::now();
            match scenario.run(&ctx).await {
                Ok(()) => {
                    summary.passed += 1;
                    debug!(
                        "{} finished in {} ms",
                        scenario.name(),
                        scenario_start.elapsed().as_millis()
                    );
                }
                Err(e) => {
                    summary.failed += 1;
                    log_fail(&format!("Test '{}' FAILED with exception: {}", scenario.name(), e));
                    error!("{:?}", e);
                    helpers::screenshot(page, &self.config.screenshot_dir, &error_shot_name(scenario.name()))
                        .await;
                    summary.failures.push(ScenarioFailure {
                        scenario: scenario.name().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        summary.soft_failures = ctx.soft_failures();
        summary.duration_ms = start.elapsed().as_millis() as u64;
        summary
    }
}

/// `Master Tipe Barang (CRUD)` → `error_master_tipe_barang_(crud)`
fn error_shot_name(scenario: &str) -> String {
    format!("error_{}", scenario.replace(' ', "_").to_lowercase())
}
