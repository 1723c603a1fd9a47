//! Helpers shared by every scenario

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::E2eResult;
use crate::page::{Locator, Page};
use crate::report::log_fail;
use crate::selectors;

/// Decides whether the current view has finished loading.
///
/// Implementations produce a JavaScript expression that the page
/// re-evaluates until it is truthy.
pub trait SettlePredicate: Send + Sync {
    fn expression(&self) -> String;
}

/// Settled once nothing matches `selector`
#[derive(Debug, Clone)]
pub struct NoMatchingElements {
    pub selector: String,
}

impl NoMatchingElements {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }
}

impl SettlePredicate for NoMatchingElements {
    fn expression(&self) -> String {
        format!(
            "document.querySelectorAll({}).length === 0",
            js_string(&self.selector)
        )
    }
}

/// Settled once any element matching `selector` contains `text`
#[derive(Debug, Clone)]
pub struct TextPresent {
    pub selector: String,
    pub text: String,
}

impl TextPresent {
    pub fn new(selector: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            text: text.into(),
        }
    }
}

impl SettlePredicate for TextPresent {
    fn expression(&self) -> String {
        format!(
            "Array.from(document.querySelectorAll({})).some(el => el.textContent && el.textContent.includes({}))",
            js_string(&self.selector),
            js_string(&self.text)
        )
    }
}

fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Wait until `predicate` holds. Returns false on timeout or any other
/// failure; never raises.
pub async fn wait_for_settled(
    page: &dyn Page,
    predicate: &dyn SettlePredicate,
    timeout: Duration,
) -> bool {
    match page.wait_for_function(&predicate.expression(), timeout).await {
        Ok(()) => true,
        Err(e) => {
            debug!("View did not settle: {}", e);
            false
        }
    }
}

/// Wait until loading placeholders matching `loader_selector` are gone
pub async fn wait_for_data_loaded(page: &dyn Page, loader_selector: &str, timeout: Duration) -> bool {
    wait_for_settled(page, &NoMatchingElements::new(loader_selector), timeout).await
}

/// Capture a full-page screenshot to `<dir>/<name>.png`.
///
/// Failures are logged and swallowed.
pub async fn screenshot(page: &dyn Page, dir: &Path, name: &str) -> Option<PathBuf> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!("Cannot create screenshot dir {}: {}", dir.display(), e);
        return None;
    }
    let path = dir.join(format!("{}.png", name));
    match page.screenshot(&path, true).await {
        Ok(()) => {
            info!("  📸 Screenshot saved: {}", path.display());
            Some(path)
        }
        Err(e) => {
            warn!("Screenshot '{}' failed: {}", name, e);
            None
        }
    }
}

/// Opens a table row's action menu and picks a command from it
#[derive(Debug, Clone)]
pub struct RowActions {
    /// Candidate selectors for the row's action control, tried in order
    pub strategies: Vec<String>,

    /// Delay between opening the menu and looking for the item
    pub settle: Duration,
}

impl Default for RowActions {
    fn default() -> Self {
        Self {
            strategies: vec![
                selectors::ROW_ACTION_ICON_BUTTON.to_string(),
                selectors::ROW_ACTION_LAST_CELL_BUTTON.to_string(),
            ],
            settle: Duration::from_millis(500),
        }
    }
}

impl RowActions {
    /// First strategy whose control is visible in `row`
    async fn find_control(&self, page: &dyn Page, row: &Locator) -> E2eResult<Option<Locator>> {
        for strategy in &self.strategies {
            let control = row.clone().locator(strategy.as_str()).first();
            if page.is_visible(&control).await? {
                return Ok(Some(control));
            }
        }
        Ok(None)
    }

    /// Click `action_text` in the action menu of the first row matching
    /// `row_selector`. Returns whether the menu item was clicked.
    pub async fn click(&self, page: &dyn Page, row_selector: &str, action_text: &str) -> E2eResult<bool> {
        let row = Locator::css(row_selector).first();

        let Some(control) = self.find_control(page, &row).await? else {
            log_fail("Action button not found in row");
            return Ok(false);
        };

        page.click(&control).await?;
        page.wait_for_timeout(self.settle).await;

        let item = Locator::css(selectors::menu_item(action_text)).first();
        if page.is_visible(&item).await? {
            page.click(&item).await?;
            Ok(true)
        } else {
            log_fail(&format!("Menu item '{}' not visible", action_text));
            page.press("Escape").await?;
            Ok(false)
        }
    }
}

/// [`RowActions::click`] with the default control strategies
pub async fn click_row_action(page: &dyn Page, row_selector: &str, action_text: &str) -> E2eResult<bool> {
    RowActions::default().click(page, row_selector, action_text).await
}
