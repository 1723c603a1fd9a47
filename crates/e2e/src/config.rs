//! Run configuration
//!
//! Defaults target a local development instance. A YAML file can replace any
//! subset of the values, and the CLI layer overrides individual fields on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};
use crate::playwright::{Browser, PlaywrightConfig};

/// Everything a run needs to know about its target and environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Base URL of the application under test
    pub base_url: String,

    /// Login credentials
    pub email: String,
    pub password: String,

    /// Where checkpoint screenshots are written
    pub screenshot_dir: PathBuf,

    /// Browser settings
    pub browser: BrowserConfig,

    /// Upper bounds for every wait
    pub timeouts: Timeouts,

    /// CSS selector matching loading placeholders
    pub loader_selector: String,

    /// Probe the base URL before launching the browser
    pub preflight: bool,

    /// Count soft-check failures toward the exit code
    pub strict_soft_checks: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            email: "admin@gadaitop.com".to_string(),
            password: "admin123".to_string(),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            browser: BrowserConfig::default(),
            timeouts: Timeouts::default(),
            loader_selector: r#"[class*="skeleton"], [data-slot="skeleton"]"#.to_string(),
            preflight: true,
            strict_soft_checks: false,
        }
    }
}

impl RunConfig {
    /// Parse a config from a YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> E2eResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(E2eError::Config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.email.is_empty() || self.password.is_empty() {
            return Err(E2eError::Config("email and password must not be empty".into()));
        }
        if self.browser.viewport_width == 0 || self.browser.viewport_height == 0 {
            return Err(E2eError::Config("viewport dimensions must be non-zero".into()));
        }
        Ok(())
    }

    /// Absolute URL for an application route such as `/pt`
    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), route)
    }

    /// Driver settings derived from this run config
    pub fn playwright(&self) -> PlaywrightConfig {
        PlaywrightConfig {
            browser: self.browser.kind,
            headless: self.browser.headless,
            viewport_width: self.browser.viewport_width,
            viewport_height: self.browser.viewport_height,
            node_project_dir: self.browser.node_project_dir.clone(),
            launch_timeout: self.timeouts.launch(),
            command_timeout: self.timeouts.command(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub kind: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Directory whose `node_modules` provides `playwright`
    pub node_project_dir: PathBuf,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            kind: Browser::Chromium,
            headless: true,
            viewport_width: 1440,
            viewport_height: 900,
            node_project_dir: PathBuf::from("."),
        }
    }
}

/// Wait bounds in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub launch_ms: u64,
    pub command_ms: u64,
    pub login_redirect_ms: u64,
    pub heading_ms: u64,
    pub navigation_ms: u64,
    pub data_loaded_ms: u64,
    pub dashboard_metric_ms: u64,
    pub dashboard_loaded_ms: u64,
    pub dialog_open_ms: u64,
    pub dialog_close_ms: u64,
    pub preflight_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            launch_ms: 60_000,
            command_ms: 30_000,
            login_redirect_ms: 15_000,
            heading_ms: 10_000,
            navigation_ms: 10_000,
            data_loaded_ms: 15_000,
            dashboard_metric_ms: 15_000,
            dashboard_loaded_ms: 20_000,
            dialog_open_ms: 5_000,
            dialog_close_ms: 10_000,
            preflight_ms: 5_000,
        }
    }
}

impl Timeouts {
    pub fn launch(&self) -> Duration {
        Duration::from_millis(self.launch_ms)
    }

    pub fn command(&self) -> Duration {
        Duration::from_millis(self.command_ms)
    }

    pub fn login_redirect(&self) -> Duration {
        Duration::from_millis(self.login_redirect_ms)
    }

    pub fn heading(&self) -> Duration {
        Duration::from_millis(self.heading_ms)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn data_loaded(&self) -> Duration {
        Duration::from_millis(self.data_loaded_ms)
    }

    pub fn dashboard_metric(&self) -> Duration {
        Duration::from_millis(self.dashboard_metric_ms)
    }

    pub fn dashboard_loaded(&self) -> Duration {
        Duration::from_millis(self.dashboard_loaded_ms)
    }

    pub fn dialog_open(&self) -> Duration {
        Duration::from_millis(self.dialog_open_ms)
    }

    pub fn dialog_close(&self) -> Duration {
        Duration::from_millis(self.dialog_close_ms)
    }

    pub fn preflight(&self) -> Duration {
        Duration::from_millis(self.preflight_ms)
    }
}
