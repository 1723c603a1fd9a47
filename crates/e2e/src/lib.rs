//! Gadai Top super admin E2E test runner
//!
//! This crate drives one headless browser session through the super admin
//! console and reports which scenarios passed:
//! - Controls Playwright through a long-lived Node driver speaking JSON lines
//! - Runs scenarios strictly in sequence against one shared page
//! - Separates soft checks (logged) from hard assertions (fail the scenario)
//! - Writes full-page screenshots at every checkpoint
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── preflight() -> reachability of base URL              │
//! │    ├── PlaywrightHandle::launch() -> browser/context/page   │
//! │    ├── run_on(page) -> RunSummary                           │
//! │    └── close()                                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario (one per screen)                                  │
//! │    ├── Login, Dashboard, SidebarNavigation                  │
//! │    ├── EntityList(super_admin | pt)                         │
//! │    └── TipeBarangCrud (create → edit → delete)              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  helpers                                                    │
//! │    ├── screenshot(page, dir, name)                          │
//! │    ├── wait_for_data_loaded(page, loader, timeout) -> bool  │
//! │    └── RowActions::click(page, row, action) -> bool         │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod check;
pub mod config;
pub mod error;
pub mod helpers;
pub mod page;
pub mod playwright;
pub mod report;
pub mod runner;
pub mod scenarios;
pub mod selectors;

pub use check::{ensure, SoftCheck};
pub use config::RunConfig;
pub use error::{E2eError, E2eResult};
pub use page::{Locator, Page};
pub use report::RunSummary;
pub use runner::TestRunner;
