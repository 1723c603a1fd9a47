//! E2E runner entry point
//!
//! Runs every scenario against the configured target. With no arguments it
//! targets a local development instance.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gadaitop_e2e::playwright::Browser;
use gadaitop_e2e::{E2eResult, RunConfig, TestRunner};

#[derive(Parser, Debug)]
#[command(name = "gadaitop-e2e")]
#[command(about = "E2E test runner for the Gadai Top super admin console")]
struct Args {
    /// YAML config file; flags below override its values
    #[arg(long, env = "GADAITOP_E2E_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the application under test
    #[arg(long, env = "GADAITOP_E2E_BASE_URL")]
    base_url: Option<String>,

    /// Login email
    #[arg(long, env = "GADAITOP_E2E_EMAIL")]
    email: Option<String>,

    /// Login password
    #[arg(long, env = "GADAITOP_E2E_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Directory for checkpoint screenshots
    #[arg(long, env = "GADAITOP_E2E_SCREENSHOT_DIR")]
    screenshot_dir: Option<PathBuf>,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long)]
    browser: Option<Browser>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Run only the named scenario (repeatable)
    #[arg(long = "scenario")]
    scenarios: Vec<String>,

    /// Count soft-check failures toward the exit code
    #[arg(long)]
    strict: bool,

    /// Skip the base URL reachability probe
    #[arg(long)]
    no_preflight: bool,
}

impl Args {
    fn into_config(self) -> E2eResult<(RunConfig, Vec<String>)> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };

        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if let Some(email) = self.email {
            config.email = email;
        }
        if let Some(password) = self.password {
            config.password = password;
        }
        if let Some(dir) = self.screenshot_dir {
            config.screenshot_dir = dir;
        }
        if let Some(browser) = self.browser {
            config.browser.kind = browser;
        }
        if self.headed {
            config.browser.headless = false;
        }
        if self.strict {
            config.strict_soft_checks = true;
        }
        if self.no_preflight {
            config.preflight = false;
        }

        config.validate()?;
        Ok((config, self.scenarios))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();

    match async_main(args).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

async fn async_main(args: Args) -> E2eResult<u8> {
    let (config, scenarios) = args.into_config()?;
    let strict = config.strict_soft_checks;

    let runner = TestRunner::new(config).select(&scenarios)?;
    let summary = runner.run().await?;
    summary.log();

    Ok(summary.exit_code(strict) as u8)
}
