//! Console reporting: step banners, pass/fail lines and the run summary

use tracing::{error, info, warn};

const RULE: &str = "============================================================";

/// Banner announcing a scenario or a scenario phase
pub fn log_step(msg: &str) {
    info!("");
    info!("{}", RULE);
    info!("  {}", msg);
    info!("{}", RULE);
}

pub fn log_pass(msg: &str) {
    info!("  ✅ PASS: {}", msg);
}

pub fn log_fail(msg: &str) {
    warn!("  ❌ FAIL: {}", msg);
}

/// One scenario that raised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioFailure {
    pub scenario: String,
    pub error: String,
}

/// Result of running the scenario list
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,

    /// Soft checks that logged a failure without raising
    pub soft_failures: usize,
    pub duration_ms: u64,
    pub failures: Vec<ScenarioFailure>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    /// Whether the run counts as failed.
    ///
    /// Soft failures only count when `strict` is set.
    pub fn is_failure(&self, strict: bool) -> bool {
        self.failed > 0 || (strict && self.soft_failures > 0)
    }

    pub fn exit_code(&self, strict: bool) -> i32 {
        if self.is_failure(strict) {
            1
        } else {
            0
        }
    }

    pub fn log(&self) {
        info!("");
        info!("{}", RULE);
        info!("  TEST SUMMARY");
        info!("{}", RULE);
        info!("  Total : {}", self.total());
        info!("  Passed: {}", self.passed);
        info!("  Failed: {}", self.failed);
        info!("  Soft check failures: {}", self.soft_failures);
        info!("  Duration: {} ms", self.duration_ms);
        if !self.failures.is_empty() {
            info!("");
            error!("  Failures:");
            for failure in &self.failures {
                error!("    - {}: {}", failure.scenario, failure.error);
            }
        }
        info!("{}", RULE);
    }
}
