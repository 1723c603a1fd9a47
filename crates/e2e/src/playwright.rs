//! Playwright browser automation
//!
//! A single Node.js driver process owns the browser, context and page for
//! the whole run. Rust sends one JSON request per line on the driver's stdin
//! and reads one JSON response per line from its stdout.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::page::{LoadState, Locator, Page, WaitState};

/// Extra time allowed on top of a command's own timeout before the driver is
/// considered unresponsive
const RESPONSE_GRACE: Duration = Duration::from_secs(5);

/// How long `close` waits for the driver to exit on its own
const CLOSE_GRACE: Duration = Duration::from_secs(5);

const DRIVER_SCRIPT: &str = r#"
const readline = require('readline');
const playwright = require(require.resolve('playwright', { paths: [process.cwd(), __dirname] }));

const config = JSON.parse(process.argv[2]);

function send(message) {
  process.stdout.write(JSON.stringify(message) + '\n');
}

function resolve(page, segments) {
  let loc = null;
  for (const seg of segments) {
    loc = loc ? loc.locator(seg.selector) : page.locator(seg.selector);
    switch (seg.pick.kind) {
      case 'first': loc = loc.first(); break;
      case 'last': loc = loc.last(); break;
      case 'nth': loc = loc.nth(seg.pick.index); break;
    }
  }
  return loc;
}

async function handle(browser, page, req) {
  const timeout = req.timeout_ms;
  switch (req.op) {
    case 'goto': await page.goto(req.url, { timeout }); return null;
    case 'wait_for_load_state': await page.waitForLoadState(req.state, { timeout }); return null;
    case 'url': return page.url();
    case 'count': return await resolve(page, req.locator).count();
    case 'is_visible': return await resolve(page, req.locator).isVisible();
    case 'is_disabled': return await resolve(page, req.locator).isDisabled({ timeout });
    case 'click': await resolve(page, req.locator).click({ timeout }); return null;
    case 'fill': await resolve(page, req.locator).fill(req.value, { timeout }); return null;
    case 'clear': await resolve(page, req.locator).clear({ timeout }); return null;
    case 'press': await page.keyboard.press(req.key); return null;
    case 'wait_for': await resolve(page, req.locator).waitFor({ state: req.state, timeout }); return null;
    case 'wait_for_function': await page.waitForFunction(req.expression, null, { timeout }); return null;
    case 'screenshot': await page.screenshot({ path: req.path, fullPage: req.full_page }); return null;
    case 'close': await browser.close(); return null;
    default: throw new Error('unknown op: ' + req.op);
  }
}

(async () => {
  let browser;
  let page;
  try {
    browser = await playwright[config.browser].launch({ headless: config.headless });
    const context = await browser.newContext({
      viewport: { width: config.viewport_width, height: config.viewport_height }
    });
    page = await context.newPage();
  } catch (error) {
    send({ id: 0, ok: false, error: { name: error.name, message: error.message } });
    process.exit(1);
  }
  send({ id: 0, ok: true, value: 'ready' });

  const rl = readline.createInterface({ input: process.stdin, terminal: false });
  for await (const line of rl) {
    if (!line.trim()) continue;
    const req = JSON.parse(line);
    try {
      const value = await handle(browser, page, req);
      send({ id: req.id, ok: true, value });
      if (req.op === 'close') break;
    } catch (error) {
      send({ id: req.id, ok: false, error: { name: error.name, message: error.message } });
    }
  }
  process.exit(0);
})();
"#;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chromium" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(E2eError::Config(format!("unknown browser '{}'", other))),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub node_project_dir: PathBuf,
    pub launch_timeout: Duration,
    pub command_timeout: Duration,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1440,
            viewport_height: 900,
            node_project_dir: PathBuf::from("."),
            launch_timeout: Duration::from_secs(60),
            command_timeout: Duration::from_secs(30),
        }
    }
}

/// Launch parameters passed to the driver script as its only argument
#[derive(Debug, Serialize)]
struct LaunchArgs<'a> {
    browser: &'a str,
    headless: bool,
    viewport_width: u32,
    viewport_height: u32,
}

/// One driver operation
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Goto { url: String, timeout_ms: u64 },
    WaitForLoadState { state: LoadState, timeout_ms: u64 },
    Url,
    Count { locator: Locator },
    IsVisible { locator: Locator },
    IsDisabled { locator: Locator, timeout_ms: u64 },
    Click { locator: Locator, timeout_ms: u64 },
    Fill { locator: Locator, value: String, timeout_ms: u64 },
    Clear { locator: Locator, timeout_ms: u64 },
    Press { key: String },
    WaitFor { locator: Locator, state: WaitState, timeout_ms: u64 },
    WaitForFunction { expression: String, timeout_ms: u64 },
    Screenshot { path: PathBuf, full_page: bool },
    Close,
}

impl Command {
    /// The bound the driver itself enforces, if any
    fn timeout(&self) -> Option<Duration> {
        match self {
            Command::Goto { timeout_ms, .. }
            | Command::WaitForLoadState { timeout_ms, .. }
            | Command::IsDisabled { timeout_ms, .. }
            | Command::Click { timeout_ms, .. }
            | Command::Fill { timeout_ms, .. }
            | Command::Clear { timeout_ms, .. }
            | Command::WaitFor { timeout_ms, .. }
            | Command::WaitForFunction { timeout_ms, .. } => {
                Some(Duration::from_millis(*timeout_ms))
            }
            _ => None,
        }
    }

    fn name(&self) -> String {
        match self {
            Command::Goto { url, .. } => format!("goto:{}", url),
            Command::WaitForLoadState { state, .. } => format!("wait_for_load_state:{:?}", state),
            Command::Url => "url".to_string(),
            Command::Count { locator } => format!("count:{}", locator),
            Command::IsVisible { locator } => format!("is_visible:{}", locator),
            Command::IsDisabled { locator, .. } => format!("is_disabled:{}", locator),
            Command::Click { locator, .. } => format!("click:{}", locator),
            Command::Fill { locator, .. } => format!("fill:{}", locator),
            Command::Clear { locator, .. } => format!("clear:{}", locator),
            Command::Press { key } => format!("press:{}", key),
            Command::WaitFor { locator, state, .. } => format!("wait_for:{}:{:?}", locator, state),
            Command::WaitForFunction { .. } => "wait_for_function".to_string(),
            Command::Screenshot { path, .. } => format!("screenshot:{}", path.display()),
            Command::Close => "close".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Request<'a> {
    id: u64,
    #[serde(flatten)]
    command: &'a Command,
}

#[derive(Debug, Deserialize)]
struct Response {
    id: u64,
    ok: bool,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    error: Option<DriverError>,
}

#[derive(Debug, Deserialize)]
struct DriverError {
    #[serde(default)]
    name: String,
    message: String,
}

impl Response {
    fn into_result(self, what: &str) -> E2eResult<serde_json::Value> {
        if self.ok {
            return Ok(self.value);
        }
        let error = self.error.unwrap_or(DriverError {
            name: String::new(),
            message: "driver reported failure without detail".to_string(),
        });
        if error.name == "TimeoutError" {
            Err(E2eError::Timeout(format!("{} ({})", what, error.message)))
        } else {
            Err(E2eError::Playwright(format!("{}: {}", what, error.message)))
        }
    }
}

struct DriverIo {
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl DriverIo {
    async fn read_response(&mut self, id: u64) -> E2eResult<Response> {
        while let Some(line) = self.stdout.next_line().await? {
            match serde_json::from_str::<Response>(&line) {
                Ok(resp) if resp.id == id => return Ok(resp),
                Ok(resp) => warn!("Discarding stale driver response {}", resp.id),
                Err(_) => debug!("[driver stdout] {}", line),
            }
        }
        Err(E2eError::Driver("driver exited before responding".into()))
    }
}

/// Playwright browser session: one browser, one context, one page
pub struct PlaywrightHandle {
    child: Child,
    io: Mutex<DriverIo>,
    next_id: AtomicU64,
    command_timeout: Duration,
    closed: bool,

    /// Keeps the driver script alive for the lifetime of the process
    _script_dir: tempfile::TempDir,
}

impl PlaywrightHandle {
    /// Launch the driver and wait until the page is ready
    pub async fn launch(config: PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed(&config.node_project_dir).await?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("driver.js");
        std::fs::write(&script_path, DRIVER_SCRIPT)?;

        let args = serde_json::to_string(&LaunchArgs {
            browser: config.browser.as_str(),
            headless: config.headless,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
        })?;

        info!(
            "Launching {} ({}x{}, headless={})",
            config.browser.as_str(),
            config.viewport_width,
            config.viewport_height,
            config.headless
        );

        let mut child = TokioCommand::new("node")
            .arg(&script_path)
            .arg(args)
            .current_dir(&config.node_project_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| E2eError::BrowserLaunch(format!("failed to spawn node: {}", e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::BrowserLaunch("driver stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::BrowserLaunch("driver stdout unavailable".into()))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("[driver stderr] {}", line);
                }
            });
        }

        let mut io = DriverIo {
            stdin,
            stdout: BufReader::new(stdout).lines(),
        };

        let ready = tokio::time::timeout(config.launch_timeout, io.read_response(0))
            .await
            .map_err(|_| {
                E2eError::BrowserLaunch(format!(
                    "browser not ready after {} ms",
                    config.launch_timeout.as_millis()
                ))
            })?
            .map_err(|e| E2eError::BrowserLaunch(e.to_string()))?;
        ready
            .into_result("launch")
            .map_err(|e| E2eError::BrowserLaunch(e.to_string()))?;

        info!("Browser session ready");

        Ok(Self {
            child,
            io: Mutex::new(io),
            next_id: AtomicU64::new(1),
            command_timeout: config.command_timeout,
            closed: false,
            _script_dir: script_dir,
        })
    }

    /// Check if Playwright is installed
    async fn check_playwright_installed(project_dir: &Path) -> E2eResult<()> {
        let status = TokioCommand::new("npx")
            .args(["playwright", "--version"])
            .current_dir(project_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Send one command and wait for its response
    pub async fn request(&self, command: Command) -> E2eResult<serde_json::Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let what = command.name();
        let mut line = serde_json::to_string(&Request { id, command: &command })?;
        line.push('\n');

        let deadline = command.timeout().unwrap_or(self.command_timeout) + RESPONSE_GRACE;

        let mut io = self.io.lock().await;
        io.stdin.write_all(line.as_bytes()).await?;
        io.stdin.flush().await?;

        let response = tokio::time::timeout(deadline, io.read_response(id))
            .await
            .map_err(|_| E2eError::Driver(format!("no response to {} within {:?}", what, deadline)))??;

        response.into_result(&what)
    }

    fn millis(duration: Duration) -> u64 {
        duration.as_millis() as u64
    }

    /// Close the browser and stop the driver
    pub async fn close(&mut self) -> E2eResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if let Err(e) = self.request(Command::Close).await {
            warn!("Browser close request failed: {}", e);
        }

        if let Ok(Ok(status)) = tokio::time::timeout(CLOSE_GRACE, self.child.wait()).await {
            debug!("Driver exited with {}", status);
            return Ok(());
        }

        // Try graceful shutdown first
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = self.child.id() {
                if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok()
                    && tokio::time::timeout(CLOSE_GRACE, self.child.wait()).await.is_ok()
                {
                    return Ok(());
                }
            }
        }

        // Force kill if still running
        warn!("Driver did not exit, killing it");
        self.child.kill().await?;
        Ok(())
    }
}

impl Drop for PlaywrightHandle {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.child.start_kill();
        }
    }
}

#[async_trait]
impl Page for PlaywrightHandle {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.request(Command::Goto {
            url: url.to_string(),
            timeout_ms: Self::millis(self.command_timeout),
        })
        .await
        .map(|_| ())
    }

    async fn wait_for_load_state(&self, state: LoadState) -> E2eResult<()> {
        self.request(Command::WaitForLoadState {
            state,
            timeout_ms: Self::millis(self.command_timeout),
        })
        .await
        .map(|_| ())
    }

    async fn url(&self) -> E2eResult<String> {
        let value = self.request(Command::Url).await?;
        value
            .as_str()
            .map(String::from)
            .ok_or_else(|| E2eError::Driver(format!("expected URL string, got {}", value)))
    }

    async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        let value = self.request(Command::Count { locator: locator.clone() }).await?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| E2eError::Driver(format!("expected count, got {}", value)))
    }

    async fn is_visible(&self, locator: &Locator) -> E2eResult<bool> {
        let value = self.request(Command::IsVisible { locator: locator.clone() }).await?;
        value
            .as_bool()
            .ok_or_else(|| E2eError::Driver(format!("expected bool, got {}", value)))
    }

    async fn is_disabled(&self, locator: &Locator) -> E2eResult<bool> {
        let value = self
            .request(Command::IsDisabled {
                locator: locator.clone(),
                timeout_ms: Self::millis(self.command_timeout),
            })
            .await?;
        value
            .as_bool()
            .ok_or_else(|| E2eError::Driver(format!("expected bool, got {}", value)))
    }

    async fn click(&self, locator: &Locator) -> E2eResult<()> {
        self.request(Command::Click {
            locator: locator.clone(),
            timeout_ms: Self::millis(self.command_timeout),
        })
        .await
        .map(|_| ())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        self.request(Command::Fill {
            locator: locator.clone(),
            value: value.to_string(),
            timeout_ms: Self::millis(self.command_timeout),
        })
        .await
        .map(|_| ())
    }

    async fn clear(&self, locator: &Locator) -> E2eResult<()> {
        self.request(Command::Clear {
            locator: locator.clone(),
            timeout_ms: Self::millis(self.command_timeout),
        })
        .await
        .map(|_| ())
    }

    async fn press(&self, key: &str) -> E2eResult<()> {
        self.request(Command::Press { key: key.to_string() }).await.map(|_| ())
    }

    async fn wait_for(&self, locator: &Locator, state: WaitState, timeout: Duration) -> E2eResult<()> {
        self.request(Command::WaitFor {
            locator: locator.clone(),
            state,
            timeout_ms: Self::millis(timeout),
        })
        .await
        .map(|_| ())
    }

    async fn wait_for_function(&self, expression: &str, timeout: Duration) -> E2eResult<()> {
        self.request(Command::WaitForFunction {
            expression: expression.to_string(),
            timeout_ms: Self::millis(timeout),
        })
        .await
        .map(|_| ())
    }

    async fn screenshot(&self, path: &Path, full_page: bool) -> E2eResult<()> {
        self.request(Command::Screenshot {
            path: path.to_path_buf(),
            full_page,
        })
        .await
        .map(|_| ())
    }
}
