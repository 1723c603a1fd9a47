//! Browser page capability surface
//!
//! Scenarios talk to the browser only through the [`Page`] trait. The
//! Playwright driver in [`crate::playwright`] is the production
//! implementation; tests substitute an in-memory fake.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use crate::error::{E2eError, E2eResult};

/// Interval between URL polls in [`wait_for_url`]
const URL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Which of the matched elements a locator segment narrows to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum Pick {
    All,
    First,
    Last,
    Nth(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub selector: String,
    pub pick: Pick,
}

/// A chain of selectors, each scoped to the elements picked by the previous one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator {
    segments: Vec<Segment>,
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment {
                selector: selector.into(),
                pick: Pick::All,
            }],
        }
    }

    /// Scope a further selector inside this locator
    pub fn locator(mut self, selector: impl Into<String>) -> Self {
        self.segments.push(Segment {
            selector: selector.into(),
            pick: Pick::All,
        });
        self
    }

    pub fn first(self) -> Self {
        self.pick(Pick::First)
    }

    pub fn last(self) -> Self {
        self.pick(Pick::Last)
    }

    pub fn nth(self, index: usize) -> Self {
        self.pick(Pick::Nth(index))
    }

    fn pick(mut self, pick: Pick) -> Self {
        if let Some(last) = self.segments.last_mut() {
            last.pick = pick;
        }
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(" >> ")?;
            }
            f.write_str(&segment.selector)?;
            match segment.pick {
                Pick::All => {}
                Pick::First => f.write_str(" >> nth=0")?,
                Pick::Last => f.write_str(" >> nth=-1")?,
                Pick::Nth(n) => write!(f, " >> nth={}", n)?,
            }
        }
        Ok(())
    }
}

/// Element state to wait for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

/// Page load milestone to wait for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Load,
    #[serde(rename = "domcontentloaded")]
    DomContentLoaded,
    #[default]
    NetworkIdle,
}

/// Browser operations the scenarios depend on.
///
/// Every method that waits takes an explicit upper bound and fails with
/// [`E2eError::Timeout`] once it is exceeded. Nothing is retried.
#[async_trait]
pub trait Page: Send + Sync {
    async fn goto(&self, url: &str) -> E2eResult<()>;

    async fn wait_for_load_state(&self, state: LoadState) -> E2eResult<()>;

    async fn url(&self) -> E2eResult<String>;

    async fn count(&self, locator: &Locator) -> E2eResult<usize>;

    /// Immediate visibility probe, never waits
    async fn is_visible(&self, locator: &Locator) -> E2eResult<bool>;

    async fn is_disabled(&self, locator: &Locator) -> E2eResult<bool>;

    async fn click(&self, locator: &Locator) -> E2eResult<()>;

    async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()>;

    async fn clear(&self, locator: &Locator) -> E2eResult<()>;

    /// Press a key on the page keyboard
    async fn press(&self, key: &str) -> E2eResult<()>;

    async fn wait_for(&self, locator: &Locator, state: WaitState, timeout: Duration) -> E2eResult<()>;

    /// Re-evaluate a JavaScript expression until it is truthy
    async fn wait_for_function(&self, expression: &str, timeout: Duration) -> E2eResult<()>;

    async fn screenshot(&self, path: &Path, full_page: bool) -> E2eResult<()>;

    /// Fixed settle delay
    async fn wait_for_timeout(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Poll the page URL until `predicate` accepts it or `timeout` elapses.
///
/// Returns the accepted URL.
pub async fn wait_for_url<F>(page: &dyn Page, predicate: F, timeout: Duration) -> E2eResult<String>
where
    F: Fn(&str) -> bool + Send,
{
    let start = Instant::now();
    loop {
        let url = page.url().await?;
        if predicate(&url) {
            return Ok(url);
        }
        if start.elapsed() >= timeout {
            debug!("URL wait gave up at {}", url);
            return Err(E2eError::Timeout(format!(
                "URL change within {} ms (still at {})",
                timeout.as_millis(),
                url
            )));
        }
        tokio::time::sleep(URL_POLL_INTERVAL).await;
    }
}

/// Quote `text` for use inside a `:has-text("...")` or `text="..."` selector
pub fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}
