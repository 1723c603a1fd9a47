//! Scenarios exercised against the super admin console
//!
//! Each scenario starts by navigating to a known route, so none depends on
//! where the previous one left the page.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::check::SoftCheck;
use crate::config::RunConfig;
use crate::error::E2eResult;
use crate::helpers::{self, RowActions};
use crate::page::{LoadState, Page};

pub mod dashboard;
pub mod entity_list;
pub mod login;
pub mod sidebar;
pub mod tipe_barang;

pub use dashboard::Dashboard;
pub use entity_list::{EntityList, EntityProfile};
pub use login::Login;
pub use sidebar::SidebarNavigation;
pub use tipe_barang::TipeBarangCrud;

/// A named, independently failing test sequence
#[async_trait]
pub trait Scenario: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, ctx: &ScenarioContext<'_>) -> E2eResult<()>;
}

/// The full scenario list in run order
pub fn default_suite() -> Vec<Box<dyn Scenario>> {
    vec![
        Box::new(Login),
        Box::new(Dashboard),
        Box::new(SidebarNavigation::default()),
        Box::new(EntityList::new(EntityProfile::super_admin())),
        Box::new(EntityList::new(EntityProfile::pt())),
        Box::new(TipeBarangCrud::from_clock()),
    ]
}

/// Shared state handed to every scenario
pub struct ScenarioContext<'a> {
    pub page: &'a dyn Page,
    pub config: &'a RunConfig,
    pub row_actions: RowActions,
    soft_failures: AtomicUsize,
}

impl<'a> ScenarioContext<'a> {
    pub fn new(page: &'a dyn Page, config: &'a RunConfig) -> Self {
        Self {
            page,
            config,
            row_actions: RowActions::default(),
            soft_failures: AtomicUsize::new(0),
        }
    }

    /// Log a soft check; returns whether it passed
    pub fn check(&self, check: SoftCheck) -> bool {
        check.log();
        if !check.passed {
            self.soft_failures.fetch_add(1, Ordering::Relaxed);
        }
        check.passed
    }

    pub fn soft_failures(&self) -> usize {
        self.soft_failures.load(Ordering::Relaxed)
    }

    pub fn url(&self, route: &str) -> String {
        self.config.url(route)
    }

    /// Navigate to an application route and wait for network idle
    pub async fn open(&self, route: &str) -> E2eResult<()> {
        self.page.goto(&self.url(route)).await?;
        self.page.wait_for_load_state(LoadState::NetworkIdle).await
    }

    pub async fn network_idle(&self) -> E2eResult<()> {
        self.page.wait_for_load_state(LoadState::NetworkIdle).await
    }

    pub async fn settle(&self, millis: u64) {
        self.page.wait_for_timeout(Duration::from_millis(millis)).await;
    }

    pub async fn screenshot(&self, name: &str) -> Option<PathBuf> {
        helpers::screenshot(self.page, &self.config.screenshot_dir, name).await
    }

    pub async fn data_loaded(&self, timeout: Duration) -> bool {
        helpers::wait_for_data_loaded(self.page, &self.config.loader_selector, timeout).await
    }

    pub async fn click_row_action(&self, row_selector: &str, action_text: &str) -> E2eResult<bool> {
        self.row_actions.click(self.page, row_selector, action_text).await
    }
}
