//! Create, edit and delete one item type through the dialog-based screen
//!
//! The item is identified by a time-derived code so repeated runs do not
//! collide with each other or with seeded data.

use async_trait::async_trait;

use crate::check::{ensure, SoftCheck};
use crate::error::E2eResult;
use crate::page::{Locator, WaitState};
use crate::report::{log_pass, log_step};
use crate::selectors;

use super::{Scenario, ScenarioContext};

const ROUTE: &str = "/tipe-barang";
const HEADING: &str = "Master Tipe Barang";
const CREATE_TITLE: &str = "Tambah Tipe Barang";
const EDIT_TITLE: &str = "Edit Tipe Barang";
const CODE_FIELD: &str = "typeCode";
const NAME_FIELD: &str = "typeName";

/// Query that no item type can match
pub const NEGATIVE_QUERY: &str = "xyz_no_match_999";

/// Values for the item created by one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrudFixture {
    pub code: String,
    pub name: String,
    pub edited_name: String,
}

impl CrudFixture {
    /// Codes are always `Z` plus four digits, so no code is a substring of
    /// another run's code
    pub fn from_unix_seconds(seconds: i64) -> Self {
        let code = format!("Z{:04}", seconds.rem_euclid(10_000));
        Self {
            name: format!("E2E Test Item {}", code),
            edited_name: format!("E2E EDITED {}", code),
            code,
        }
    }

    pub fn now() -> Self {
        Self::from_unix_seconds(chrono::Utc::now().timestamp())
    }
}

/// Whether a phase left the page in a state the next phase can use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

pub struct TipeBarangCrud {
    /// Fixed fixture; generated from the clock at scenario start when unset
    fixture: Option<CrudFixture>,
}

impl TipeBarangCrud {
    pub fn from_clock() -> Self {
        Self { fixture: None }
    }

    pub fn with_fixture(fixture: CrudFixture) -> Self {
        Self {
            fixture: Some(fixture),
        }
    }

    fn search_input() -> Locator {
        Locator::css(selectors::search_input(&["Search"])).first()
    }

    fn dialog() -> Locator {
        Locator::css(selectors::DIALOG)
    }

    /// Replace the search box contents and let the table filter
    async fn search_for(ctx: &ScenarioContext<'_>, query: &str) -> E2eResult<()> {
        let input = Self::search_input();
        ctx.page.clear(&input).await?;
        ctx.settle(500).await;
        ctx.page.fill(&input, query).await?;
        ctx.settle(1000).await;
        Ok(())
    }

    async fn clear_search(ctx: &ScenarioContext<'_>) -> E2eResult<()> {
        ctx.page.clear(&Self::search_input()).await?;
        ctx.settle(500).await;
        Ok(())
    }

    async fn rows_containing(ctx: &ScenarioContext<'_>, text: &str) -> E2eResult<usize> {
        ctx.page.count(&Locator::css(selectors::row_containing(text))).await
    }

    async fn list(&self, ctx: &ScenarioContext<'_>) -> E2eResult<()> {
        let page = ctx.page;

        ctx.open(ROUTE).await?;
        page.wait_for(
            &Locator::css(selectors::heading(HEADING)),
            WaitState::Visible,
            ctx.config.timeouts.heading(),
        )
        .await?;
        log_pass("Page heading visible");

        let loaded = ctx.data_loaded(ctx.config.timeouts.data_loaded()).await;
        ctx.check(SoftCheck::from_condition(
            loaded,
            "Table data loaded",
            "Table skeletons still visible",
        ));
        ctx.screenshot("05a_tipe_barang_list").await;

        let rows = page.count(&Locator::css(selectors::TABLE_ROWS)).await?;
        log_pass(&format!("Table has {} row(s)", rows));

        let input = Self::search_input();
        if page.is_visible(&input).await? {
            page.fill(&input, NEGATIVE_QUERY).await?;
            ctx.settle(500).await;
            let no_results = page.count(&Locator::css(selectors::NO_RESULTS)).await?;
            let matched = Self::rows_containing(ctx, NEGATIVE_QUERY).await?;
            ctx.check(SoftCheck::from_condition(
                no_results > 0 && matched == 0,
                "Search negative test: 'No results' shown",
                format!("Search '{}' did not show 'No results'", NEGATIVE_QUERY),
            ));
            Self::clear_search(ctx).await?;
        }
        Ok(())
    }

    async fn create(&self, ctx: &ScenarioContext<'_>, fixture: &CrudFixture) -> E2eResult<Flow> {
        log_step("TEST 5d: Create Tipe Barang");
        let page = ctx.page;
        let timeouts = &ctx.config.timeouts;

        let add = Locator::css(selectors::ADD_BUTTON);
        if !page.is_visible(&add).await? {
            ctx.check(SoftCheck::fail("'Tambah Data' button not found"));
            return Ok(Flow::Stop);
        }
        page.click(&add).await?;

        let dialog = Self::dialog();
        page.wait_for(&dialog, WaitState::Visible, timeouts.dialog_open()).await?;
        log_pass("Create dialog opened");

        let title = dialog.clone().locator(selectors::exact_text(CREATE_TITLE));
        ctx.check(SoftCheck::from_condition(
            page.is_visible(&title).await?,
            format!("Dialog title: '{}'", CREATE_TITLE),
            format!("Dialog title '{}' not shown", CREATE_TITLE),
        ));

        page.fill(&dialog.clone().locator(selectors::input_named(CODE_FIELD)), &fixture.code)
            .await?;
        page.fill(&dialog.clone().locator(selectors::input_named(NAME_FIELD)), &fixture.name)
            .await?;
        log_pass(&format!("Filled Code='{}', Name='{}'", fixture.code, fixture.name));
        ctx.screenshot("05b_tipe_barang_create_dialog").await;

        page.click(&dialog.clone().locator(selectors::SAVE_BUTTON)).await?;
        if page
            .wait_for(&dialog, WaitState::Hidden, timeouts.dialog_close())
            .await
            .is_err()
        {
            ctx.check(SoftCheck::fail("Dialog did not close after submit"));
            ctx.screenshot("05b_tipe_barang_create_error").await;
            return Ok(Flow::Stop);
        }
        log_pass("Create dialog closed, item created");

        ctx.settle(2000).await;
        ctx.network_idle().await?;

        Self::search_for(ctx, &fixture.code).await?;
        let found = Self::rows_containing(ctx, &fixture.code).await?;
        ctx.check(SoftCheck::from_condition(
            found == 1,
            format!("Created item '{}' found in table", fixture.code),
            format!("Created item '{}' matched {} row(s), expected 1", fixture.code, found),
        ));

        Self::clear_search(ctx).await?;
        ctx.screenshot("05c_tipe_barang_after_create").await;
        Ok(Flow::Continue)
    }

    async fn edit(
        &self,
        ctx: &ScenarioContext<'_>,
        fixture: &CrudFixture,
        code_locked: &mut Option<bool>,
    ) -> E2eResult<Flow> {
        log_step("TEST 5e: Edit Tipe Barang");
        let page = ctx.page;
        let timeouts = &ctx.config.timeouts;

        Self::search_for(ctx, &fixture.code).await?;

        let target = selectors::row_containing(&fixture.code);
        if page.count(&Locator::css(&target)).await? == 0 {
            ctx.check(SoftCheck::fail("Cannot find item to edit"));
            Self::clear_search(ctx).await?;
            return Ok(Flow::Stop);
        }

        if !ctx.click_row_action(&target, "Edit").await? {
            return Ok(Flow::Continue);
        }

        let dialog = Self::dialog();
        page.wait_for(&dialog, WaitState::Visible, timeouts.dialog_open()).await?;
        log_pass("Edit dialog opened");

        let title = dialog.clone().locator(selectors::exact_text(EDIT_TITLE));
        ctx.check(SoftCheck::from_condition(
            page.is_visible(&title).await?,
            format!("Dialog title: '{}'", EDIT_TITLE),
            format!("Dialog title '{}' not shown", EDIT_TITLE),
        ));

        let locked = page
            .is_disabled(&dialog.clone().locator(selectors::input_named(CODE_FIELD)))
            .await?;
        *code_locked = Some(locked);
        ctx.check(SoftCheck::from_condition(
            locked,
            "Code field disabled in edit mode ✓",
            "Code field is editable in edit mode",
        ));

        let name_field = dialog.clone().locator(selectors::input_named(NAME_FIELD));
        page.clear(&name_field).await?;
        page.fill(&name_field, &fixture.edited_name).await?;
        log_pass(&format!("Changed name to '{}'", fixture.edited_name));
        ctx.screenshot("05d_tipe_barang_edit_dialog").await;

        page.click(&dialog.clone().locator(selectors::SAVE_BUTTON)).await?;
        if page
            .wait_for(&dialog, WaitState::Hidden, timeouts.dialog_close())
            .await
            .is_err()
        {
            ctx.check(SoftCheck::fail("Edit dialog did not close"));
            ctx.screenshot("05d_tipe_barang_edit_error").await;
            Self::clear_search(ctx).await?;
            return Ok(Flow::Stop);
        }
        log_pass("Edit dialog closed, item updated");

        ctx.settle(2000).await;
        ctx.network_idle().await?;

        Self::search_for(ctx, &fixture.edited_name).await?;
        let edited = Self::rows_containing(ctx, &fixture.edited_name).await?;
        // Every row carrying the code, so a leftover pre-edit row shows up
        Self::search_for(ctx, &fixture.code).await?;
        let stale = Self::rows_containing(ctx, &fixture.name).await?;
        ctx.check(SoftCheck::from_condition(
            edited == 1 && stale == 0,
            format!("Edited item '{}' found in table", fixture.edited_name),
            format!(
                "Edited item '{}' matched {} row(s), stale name matched {}",
                fixture.edited_name, edited, stale
            ),
        ));

        ctx.screenshot("05e_tipe_barang_after_edit").await;
        Ok(Flow::Continue)
    }

    async fn delete(&self, ctx: &ScenarioContext<'_>, fixture: &CrudFixture) -> E2eResult<Flow> {
        log_step("TEST 5f: Delete Tipe Barang");
        let page = ctx.page;
        let timeouts = &ctx.config.timeouts;

        Self::search_for(ctx, &fixture.code).await?;

        let target = selectors::row_containing(&fixture.code);
        if page.count(&Locator::css(&target)).await? == 0 {
            ctx.check(SoftCheck::fail("Cannot find item to delete"));
            Self::clear_search(ctx).await?;
            return Ok(Flow::Stop);
        }

        if !ctx.click_row_action(&target, "Hapus").await? {
            return Ok(Flow::Continue);
        }

        // The action menu may still be in the DOM, so take the newest dialog
        let confirm = Locator::css(selectors::CONFIRM_DIALOG).last();
        if page
            .wait_for(&confirm, WaitState::Visible, timeouts.dialog_open())
            .await
            .is_err()
        {
            ctx.check(SoftCheck::fail("Confirmation dialog did not appear"));
            Self::clear_search(ctx).await?;
            return Ok(Flow::Stop);
        }
        log_pass("Confirmation dialog appeared");
        ctx.screenshot("05f_tipe_barang_delete_confirm").await;

        let affirmative = confirm.clone().locator(selectors::confirm_button());
        if page.count(&affirmative).await? > 0 {
            page.click(&affirmative.first()).await?;
        } else {
            page.click(&confirm.clone().locator(selectors::BUTTON).last()).await?;
        }

        if page
            .wait_for(&confirm, WaitState::Hidden, timeouts.dialog_close())
            .await
            .is_err()
        {
            ctx.check(SoftCheck::fail("Confirmation dialog did not close"));
            ctx.screenshot("05f_tipe_barang_delete_error").await;
            Self::clear_search(ctx).await?;
            return Ok(Flow::Stop);
        }
        log_pass("Confirmation dialog closed");

        ctx.settle(2000).await;
        ctx.network_idle().await?;

        Self::search_for(ctx, &fixture.code).await?;
        let remaining = Self::rows_containing(ctx, &fixture.code).await?;
        let no_results = page.count(&Locator::css(selectors::NO_RESULTS)).await?;
        ctx.check(SoftCheck::from_condition(
            remaining == 0 || no_results > 0,
            format!("Item '{}' successfully deleted", fixture.code),
            format!("Item '{}' still exists after deletion", fixture.code),
        ));

        Self::clear_search(ctx).await?;
        ctx.screenshot("05g_tipe_barang_after_delete").await;
        Ok(Flow::Continue)
    }

    async fn phases(
        &self,
        ctx: &ScenarioContext<'_>,
        fixture: &CrudFixture,
        code_locked: &mut Option<bool>,
    ) -> E2eResult<()> {
        self.list(ctx).await?;
        if self.create(ctx, fixture).await? == Flow::Stop {
            return Ok(());
        }
        if self.edit(ctx, fixture, code_locked).await? == Flow::Stop {
            return Ok(());
        }
        self.delete(ctx, fixture).await?;
        Ok(())
    }
}

#[async_trait]
impl Scenario for TipeBarangCrud {
    fn name(&self) -> &str {
        "Master Tipe Barang (CRUD)"
    }

    async fn run(&self, ctx: &ScenarioContext<'_>) -> E2eResult<()> {
        log_step("TEST 5: Master Tipe Barang");
        let fixture = self.fixture.clone().unwrap_or_else(CrudFixture::now);

        let mut code_locked = None;
        self.phases(ctx, &fixture, &mut code_locked).await?;

        // Checked after delete so the item is cleaned up either way
        ensure(
            code_locked != Some(false),
            format!("Code field for '{}' was editable in edit mode", fixture.code),
        )
    }
}
