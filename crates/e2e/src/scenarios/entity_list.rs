//! List, search, detail and create-form checks for route-based master data
//! screens

use async_trait::async_trait;
use regex::Regex;

use crate::check::SoftCheck;
use crate::error::{E2eError, E2eResult};
use crate::page::{wait_for_url, Locator, WaitState};
use crate::report::{log_pass, log_step};
use crate::selectors;

use super::{Scenario, ScenarioContext};

/// What differs between the master data screens
#[derive(Debug, Clone)]
pub struct EntityProfile {
    /// Scenario name
    pub name: String,

    /// Banner shown when the scenario starts
    pub title: String,

    /// List route, e.g. `/pt`
    pub route: String,

    /// Text of the page's `h1`
    pub heading: String,

    /// Placeholder fragments identifying the search box
    pub search_placeholders: Vec<String>,
    pub search_query: String,

    /// 1-based row whose detail page is opened
    pub detail_row: usize,

    /// Input names the create form must show
    pub create_fields: Vec<String>,

    /// Screenshot names are `<prefix><step>_<slug>_<what>`, e.g.
    /// `04a_master_pt_list`
    pub screenshot_prefix: String,
    pub screenshot_slug: String,
}

impl EntityProfile {
    pub fn super_admin() -> Self {
        Self {
            name: "Master Super Admin".into(),
            title: "TEST 3: Master Super Admin".into(),
            route: "/super-admin".into(),
            heading: "Super Admin".into(),
            search_placeholders: vec!["Cari".into(), "Search".into()],
            search_query: "admin".into(),
            detail_row: 2,
            create_fields: ["fullName", "email", "phoneNumber", "password", "confirmPassword"]
                .map(String::from)
                .to_vec(),
            screenshot_prefix: "03".into(),
            screenshot_slug: "super_admin".into(),
        }
    }

    pub fn pt() -> Self {
        Self {
            name: "Master PT".into(),
            title: "TEST 4: Master PT".into(),
            route: "/pt".into(),
            heading: "Master PT".into(),
            search_placeholders: vec!["Search".into()],
            search_query: "PT".into(),
            detail_row: 1,
            create_fields: ["code", "name", "adminName", "adminEmail", "password", "confirmPassword"]
                .map(String::from)
                .to_vec(),
            screenshot_prefix: "04".into(),
            screenshot_slug: "master_pt".into(),
        }
    }

    fn shot(&self, step: char, what: &str) -> String {
        format!("{}{}_{}_{}", self.screenshot_prefix, step, self.screenshot_slug, what)
    }

    /// Matches `<base><route>/<id>` and nothing shorter
    pub fn detail_url_pattern(&self) -> E2eResult<Regex> {
        let pattern = format!("{}/[^/?#]+", regex::escape(&self.route));
        Ok(Regex::new(&pattern)?)
    }
}

/// One master data screen driven by an [`EntityProfile`]
pub struct EntityList {
    pub profile: EntityProfile,
}

impl EntityList {
    pub fn new(profile: EntityProfile) -> Self {
        Self { profile }
    }

    async fn search(&self, ctx: &ScenarioContext<'_>) -> E2eResult<()> {
        let page = ctx.page;
        let fragments: Vec<&str> = self.profile.search_placeholders.iter().map(String::as_str).collect();
        let input = Locator::css(selectors::search_input(&fragments)).first();
        if !page.is_visible(&input).await? {
            return Ok(());
        }

        page.fill(&input, &self.profile.search_query).await?;
        ctx.settle(500).await;
        let filtered = page.count(&Locator::css(selectors::TABLE_ROWS)).await?;
        log_pass(&format!("Search '{}' → {} result(s)", self.profile.search_query, filtered));
        page.clear(&input).await?;
        ctx.settle(500).await;
        Ok(())
    }

    async fn detail(&self, ctx: &ScenarioContext<'_>) -> E2eResult<()> {
        let page = ctx.page;
        let profile = &self.profile;

        if !ctx
            .click_row_action(&selectors::row_at(profile.detail_row), "Detail")
            .await?
        {
            return Ok(());
        }

        let list_url = ctx.url(&profile.route);
        let pattern = profile.detail_url_pattern()?;
        let reached: E2eResult<String> = async {
            wait_for_url(
                page,
                |url| pattern.is_match(url) && url != list_url,
                ctx.config.timeouts.navigation(),
            )
            .await?;
            ctx.network_idle().await?;
            ctx.settle(1000).await;
            page.url().await
        }
        .await;

        match reached {
            Ok(url) => {
                log_pass(&format!("Detail page → {}", url));
                ctx.screenshot(&profile.shot('b', "detail")).await;
            }
            Err(e) => {
                ctx.check(SoftCheck::fail(format!(
                    "Detail navigation did not happen. URL: {} ({})",
                    page.url().await?,
                    e
                )));
                ctx.screenshot(&profile.shot('b', "detail_error")).await;
            }
        }

        ctx.open(&profile.route).await
    }

    async fn create_form(&self, ctx: &ScenarioContext<'_>) -> E2eResult<()> {
        let page = ctx.page;
        let profile = &self.profile;

        ctx.settle(500).await;
        ctx.data_loaded(ctx.config.timeouts.data_loaded()).await;

        let add = Locator::css(selectors::ADD_BUTTON);
        if !page.is_visible(&add).await? {
            ctx.check(SoftCheck::fail("'Tambah Data' button not found"));
            return Ok(());
        }
        page.click(&add).await?;

        let create_suffix = format!("{}/create", profile.route);
        let checked: E2eResult<()> = async {
            wait_for_url(
                page,
                |url| url.ends_with(&create_suffix),
                ctx.config.timeouts.navigation(),
            )
            .await?;
            ctx.network_idle().await?;
            ctx.settle(1000).await;
            log_pass(&format!("Create page → {}", page.url().await?));

            for field in &profile.create_fields {
                let visible = page.is_visible(&Locator::css(selectors::input_named(field))).await?;
                ctx.check(SoftCheck::from_condition(
                    visible,
                    format!("  Field '{}' visible", field),
                    format!("  Field '{}' NOT visible", field),
                ));
            }

            ctx.screenshot(&profile.shot('c', "create_form")).await;
            Ok::<(), E2eError>(())
        }
        .await;

        if let Err(e) = checked {
            ctx.check(SoftCheck::fail(format!(
                "Create page did not navigate. URL: {} ({})",
                page.url().await?,
                e
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Scenario for EntityList {
    fn name(&self) -> &str {
        &self.profile.name
    }

    async fn run(&self, ctx: &ScenarioContext<'_>) -> E2eResult<()> {
        let page = ctx.page;
        let profile = &self.profile;
        log_step(&profile.title);

        ctx.open(&profile.route).await?;
        page.wait_for(
            &Locator::css(selectors::heading(&profile.heading)),
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
        ctx.screenshot(&profile.shot('a', "list")).await;

        let rows = page.count(&Locator::css(selectors::TABLE_ROWS)).await?;
        if rows == 0 {
            ctx.check(SoftCheck::fail("Table has no rows"));
            return Ok(());
        }
        log_pass(&format!("Table has {} row(s)", rows));

        self.search(ctx).await?;
        self.detail(ctx).await?;
        self.create_form(ctx).await
    }
}
