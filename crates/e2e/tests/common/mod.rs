//! In-memory stand-in for the admin console.
//!
//! `FakeConsole` implements `Page` by interpreting the selectors the
//! scenarios use against a small model of the app: a session, three list
//! screens, a row action menu and the Tipe Barang dialogs.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use gadaitop_e2e::page::{LoadState, Locator, Page, Pick, WaitState};
use gadaitop_e2e::selectors;
use gadaitop_e2e::{E2eError, E2eResult, RunConfig};

pub const BASE: &str = "http://app.test";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub code: String,
    pub name: String,
}

impl Row {
    fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    fn contains(&self, text: &str) -> bool {
        self.code.contains(text) || self.name.contains(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Dialog {
    Create { code: String, name: String },
    Edit { index: usize, name: String },
    ConfirmDelete { index: usize },
}

/// Things the fake can be told to get wrong
#[derive(Debug, Clone)]
pub struct Knobs {
    pub dashboard_metric: bool,
    pub skeletons_stay: bool,
    pub icon_buttons: bool,
    pub detail_navigates: bool,
    pub code_editable_in_edit: bool,
    pub dialog_sticks: bool,
    pub screenshot_fails: bool,
    pub missing_menu_items: Vec<String>,
    pub missing_links: Vec<String>,
    pub plain_confirm_buttons: bool,
    pub edit_keeps_old_row: bool,
    pub detail_never_idle: bool,
}

impl Default for Knobs {
    fn default() -> Self {
        Self {
            dashboard_metric: true,
            skeletons_stay: false,
            icon_buttons: true,
            detail_navigates: true,
            code_editable_in_edit: false,
            dialog_sticks: false,
            screenshot_fails: false,
            missing_menu_items: Vec::new(),
            missing_links: Vec::new(),
            plain_confirm_buttons: false,
            edit_keeps_old_row: false,
            detail_never_idle: false,
        }
    }
}

#[derive(Debug)]
struct State {
    url: String,
    logged_in: bool,
    login_form: HashMap<String, String>,
    rows: HashMap<&'static str, Vec<Row>>,
    search: String,
    menu_for: Option<usize>,
    dialog: Option<Dialog>,
    knobs: Knobs,
    visited: Vec<String>,
    events: Vec<String>,
    pressed: Vec<String>,
    screenshots: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
enum El {
    Row(usize),
    RowAction(usize),
    MenuItem(String),
    Dialog,
    DialogTitle,
    Input(String),
    DialogInput(String),
    SearchInput,
    AddButton,
    Heading,
    Link(String),
    NoResults,
    LoginSubmit,
    Save,
    Confirm,
    Cancel,
}

const LIST_ROUTES: [(&str, &str); 3] = [
    ("/super-admin", "Master Super Admin"),
    ("/pt", "Master PT"),
    ("/tipe-barang", "Master Tipe Barang"),
];

fn quoted(selector: &str) -> Option<String> {
    let start = selector.find('"')? + 1;
    let end = selector[start..].find('"')? + start;
    Some(selector[start..end].to_string())
}

fn route_for_label(label: &str) -> Option<&'static str> {
    LIST_ROUTES.iter().find(|(_, l)| *l == label).map(|(r, _)| *r)
}

impl State {
    fn route(&self) -> &str {
        self.url.strip_prefix(BASE).unwrap_or(&self.url)
    }

    fn list_route(&self) -> Option<&'static str> {
        let route = self.route();
        LIST_ROUTES.iter().map(|(r, _)| *r).find(|r| *r == route)
    }

    fn current_rows(&self) -> Vec<usize> {
        let Some(route) = self.list_route() else {
            return Vec::new();
        };
        self.rows[route]
            .iter()
            .enumerate()
            .filter(|(_, row)| self.search.is_empty() || row.contains(&self.search))
            .map(|(i, _)| i)
            .collect()
    }

    fn row(&self, index: usize) -> Option<&Row> {
        self.list_route().and_then(|r| self.rows[r].get(index))
    }

    fn create_fields(&self) -> &'static [&'static str] {
        match self.route() {
            "/super-admin/create" => &["fullName", "email", "phoneNumber", "password", "confirmPassword"],
            "/pt/create" => &["code", "name", "adminName", "adminEmail", "password", "confirmPassword"],
            "/login" => &["email", "password"],
            _ => &[],
        }
    }

    fn resolve_root(&self, selector: &str) -> Vec<El> {
        let rows = self.current_rows();
        match selector {
            s if s == selectors::TABLE_ROWS => rows.into_iter().map(El::Row).collect(),
            s if s.starts_with("table tbody tr:nth-child(") => {
                let n: usize = s
                    .trim_start_matches("table tbody tr:nth-child(")
                    .trim_end_matches(')')
                    .parse()
                    .unwrap_or(0);
                rows.get(n.wrapping_sub(1)).map(|i| vec![El::Row(*i)]).unwrap_or_default()
            }
            s if s.starts_with("table tbody tr:has-text(") => {
                let text = quoted(s).unwrap_or_default();
                rows.into_iter()
                    .filter(|i| self.row(*i).is_some_and(|r| r.contains(&text)))
                    .map(El::Row)
                    .collect()
            }
            s if s.starts_with(r#"[role="menuitem"]"#) => {
                let text = quoted(&s[r#"[role="menuitem"]"#.len()..]).unwrap_or_default();
                if self.menu_for.is_some() && !self.knobs.missing_menu_items.contains(&text) {
                    vec![El::MenuItem(text)]
                } else {
                    vec![]
                }
            }
            s if s == selectors::DIALOG => match &self.dialog {
                Some(Dialog::Create { .. }) | Some(Dialog::Edit { .. }) => vec![El::Dialog],
                _ => vec![],
            },
            s if s == selectors::CONFIRM_DIALOG => {
                self.dialog.iter().map(|_| El::Dialog).collect()
            }
            s if s.starts_with("input[placeholder*=") => {
                if self.list_route().is_some() {
                    vec![El::SearchInput]
                } else {
                    vec![]
                }
            }
            s if s.starts_with("input[name=") => {
                let name = quoted(s).unwrap_or_default();
                if self.create_fields().contains(&name.as_str()) {
                    vec![El::Input(name)]
                } else {
                    vec![]
                }
            }
            s if s == selectors::ADD_BUTTON => {
                self.list_route().map(|_| El::AddButton).into_iter().collect()
            }
            s if s.starts_with("h1:has-text(") => {
                let text = quoted(s).unwrap_or_default();
                LIST_ROUTES
                    .iter()
                    .find(|(r, h)| Some(*r) == self.list_route() && h.contains(&text))
                    .map(|_| vec![El::Heading])
                    .unwrap_or_default()
            }
            s if s.starts_with("a:has-text(") => {
                let label = quoted(s).unwrap_or_default();
                if self.logged_in && !self.knobs.missing_links.contains(&label) {
                    route_for_label(&label).map(|_| vec![El::Link(label)]).unwrap_or_default()
                } else {
                    vec![]
                }
            }
            s if s == selectors::NO_RESULTS => {
                if self.list_route().is_some() && self.current_rows().is_empty() {
                    vec![El::NoResults]
                } else {
                    vec![]
                }
            }
            s if s == selectors::SUBMIT_BUTTON && self.route() == "/login" => vec![El::LoginSubmit],
            _ => vec![],
        }
    }

    fn resolve_within(&self, scope: &El, selector: &str) -> Vec<El> {
        match scope {
            El::Row(i) => {
                if selector == selectors::ROW_ACTION_ICON_BUTTON && self.knobs.icon_buttons {
                    vec![El::RowAction(*i)]
                } else if selector == selectors::ROW_ACTION_LAST_CELL_BUTTON {
                    vec![El::RowAction(*i)]
                } else {
                    vec![]
                }
            }
            El::Dialog => match (&self.dialog, selector) {
                (Some(Dialog::Create { .. }), s) if s == selectors::exact_text("Tambah Tipe Barang") => {
                    vec![El::DialogTitle]
                }
                (Some(Dialog::Edit { .. }), s) if s == selectors::exact_text("Edit Tipe Barang") => {
                    vec![El::DialogTitle]
                }
                (Some(Dialog::Create { .. }) | Some(Dialog::Edit { .. }), s) if s.starts_with("input[name=") => {
                    vec![El::DialogInput(quoted(s).unwrap_or_default())]
                }
                (Some(Dialog::Create { .. }) | Some(Dialog::Edit { .. }), s) if s == selectors::SAVE_BUTTON => {
                    vec![El::Save]
                }
                (Some(Dialog::ConfirmDelete { .. }), s)
                    if s == selectors::confirm_button() && !self.knobs.plain_confirm_buttons =>
                {
                    vec![El::Confirm]
                }
                (Some(Dialog::ConfirmDelete { .. }), s) if s == selectors::BUTTON => {
                    vec![El::Cancel, El::Confirm]
                }
                _ => vec![],
            },
            _ => vec![],
        }
    }

    fn resolve(&self, locator: &Locator) -> Vec<El> {
        let mut current: Option<Vec<El>> = None;
        for segment in locator.segments() {
            let found = match &current {
                None => self.resolve_root(&segment.selector),
                Some(scopes) => scopes
                    .iter()
                    .flat_map(|scope| self.resolve_within(scope, &segment.selector))
                    .collect(),
            };
            let picked = match segment.pick {
                Pick::All => found,
                Pick::First => found.into_iter().take(1).collect(),
                Pick::Last => found.into_iter().last().into_iter().collect(),
                Pick::Nth(n) => found.into_iter().nth(n).into_iter().collect(),
            };
            current = Some(picked);
        }
        current.unwrap_or_default()
    }

    fn navigate(&mut self, route: &str) {
        let route = if !self.logged_in && route != "/login" { "/login" } else { route };
        self.url = format!("{}{}", BASE, route);
        self.visited.push(route.to_string());
        self.search.clear();
        self.menu_for = None;
        self.dialog = None;
    }

    fn single(&self, locator: &Locator) -> E2eResult<El> {
        let mut found = self.resolve(locator);
        match found.len() {
            0 => Err(E2eError::Timeout(format!("{} never became actionable", locator))),
            1 => Ok(found.remove(0)),
            n => Err(E2eError::Playwright(format!(
                "strict mode violation: {} resolved to {} elements",
                locator, n
            ))),
        }
    }

    fn activate(&mut self, el: El) {
        match el {
            El::LoginSubmit => {
                let ok = self.login_form.get("email").map(String::as_str) == Some("admin@gadaitop.com")
                    && self.login_form.get("password").map(String::as_str) == Some("admin123");
                if ok {
                    self.logged_in = true;
                    self.navigate("/");
                }
            }
            El::Link(label) => {
                if let Some(route) = route_for_label(&label) {
                    self.navigate(route);
                }
            }
            El::RowAction(i) => self.menu_for = Some(i),
            El::MenuItem(text) => {
                let Some(index) = self.menu_for.take() else { return };
                match text.as_str() {
                    "Detail" if self.knobs.detail_navigates => {
                        let route = format!("{}/id-{}", self.route(), index);
                        self.navigate(&route);
                    }
                    "Edit" => {
                        let name = self.row(index).map(|r| r.name.clone()).unwrap_or_default();
                        self.dialog = Some(Dialog::Edit { index, name });
                    }
                    "Hapus" => self.dialog = Some(Dialog::ConfirmDelete { index }),
                    _ => {}
                }
            }
            El::AddButton => {
                if self.list_route() == Some("/tipe-barang") {
                    self.dialog = Some(Dialog::Create {
                        code: String::new(),
                        name: String::new(),
                    });
                } else {
                    let route = format!("{}/create", self.route());
                    self.navigate(&route);
                }
            }
            El::Save if !self.knobs.dialog_sticks => match self.dialog.take() {
                Some(Dialog::Create { code, name }) => {
                    self.events.push(format!("created {} / {}", code, name));
                    self.rows.get_mut("/tipe-barang").unwrap().push(Row { code, name });
                }
                Some(Dialog::Edit { index, name }) if self.knobs.edit_keeps_old_row => {
                    let rows = self.rows.get_mut("/tipe-barang").unwrap();
                    let code = rows[index].code.clone();
                    self.events.push(format!("duplicated {} / {}", code, name));
                    rows.push(Row { code, name });
                }
                Some(Dialog::Edit { index, name }) => {
                    let row = &mut self.rows.get_mut("/tipe-barang").unwrap()[index];
                    self.events.push(format!("updated {} / {}", row.code, name));
                    row.name = name;
                }
                other => self.dialog = other,
            },
            El::Confirm => {
                if let Some(Dialog::ConfirmDelete { index }) = self.dialog.take() {
                    let row = self.rows.get_mut("/tipe-barang").unwrap().remove(index);
                    self.events.push(format!("deleted {}", row.code));
                }
            }
            El::Cancel => self.dialog = None,
            _ => {}
        }
    }

    fn set_value(&mut self, el: El, value: &str) -> E2eResult<()> {
        match el {
            El::SearchInput => self.search = value.to_string(),
            El::Input(name) => {
                self.login_form.insert(name, value.to_string());
            }
            El::DialogInput(name) => match (&mut self.dialog, name.as_str()) {
                (Some(Dialog::Create { code, .. }), "typeCode") => *code = value.to_string(),
                (Some(Dialog::Create { name, .. }), "typeName") => *name = value.to_string(),
                (Some(Dialog::Edit { .. }), "typeCode") if !self.knobs.code_editable_in_edit => {
                    return Err(E2eError::Playwright("element is not enabled".into()));
                }
                (Some(Dialog::Edit { name, .. }), "typeName") => *name = value.to_string(),
                _ => {}
            },
            other => {
                return Err(E2eError::Playwright(format!("{:?} is not an input", other)));
            }
        }
        Ok(())
    }
}

pub struct FakeConsole {
    state: Mutex<State>,
}

impl FakeConsole {
    pub fn new(knobs: Knobs) -> Self {
        let mut rows = HashMap::new();
        rows.insert(
            "/super-admin",
            vec![
                Row::new("admin@gadaitop.com", "Super Admin"),
                Row::new("ops-admin@gadaitop.com", "Ops Admin"),
            ],
        );
        rows.insert("/pt", vec![Row::new("PT01", "PT Gadai Top Sejahtera")]);
        rows.insert(
            "/tipe-barang",
            vec![Row::new("EM", "Emas"), Row::new("HP", "Handphone")],
        );

        Self {
            state: Mutex::new(State {
                url: "about:blank".into(),
                logged_in: false,
                login_form: HashMap::new(),
                rows,
                search: String::new(),
                menu_for: None,
                dialog: None,
                knobs,
                visited: Vec::new(),
                events: Vec::new(),
                pressed: Vec::new(),
                screenshots: Vec::new(),
            }),
        }
    }

    /// Start with an authenticated session
    pub fn logged_in(self) -> Self {
        self.state.lock().unwrap().logged_in = true;
        self
    }

    pub fn with_rows(self, route: &'static str, rows: Vec<(&str, &str)>) -> Self {
        self.state
            .lock()
            .unwrap()
            .rows
            .insert(route, rows.into_iter().map(|(c, n)| Row::new(c, n)).collect());
        self
    }

    pub fn rows(&self, route: &str) -> Vec<Row> {
        self.state.lock().unwrap().rows[route].clone()
    }

    pub fn visited(&self) -> Vec<String> {
        self.state.lock().unwrap().visited.clone()
    }

    pub fn events(&self) -> Vec<String> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn pressed(&self) -> Vec<String> {
        self.state.lock().unwrap().pressed.clone()
    }

    pub fn current_url(&self) -> String {
        self.state.lock().unwrap().url.clone()
    }

    pub fn screenshot_names(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .screenshots
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .collect()
    }
}

#[async_trait]
impl Page for FakeConsole {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let route = url.strip_prefix(BASE).unwrap_or(url).to_string();
        self.state.lock().unwrap().navigate(&route);
        Ok(())
    }

    async fn wait_for_load_state(&self, _state: LoadState) -> E2eResult<()> {
        let state = self.state.lock().unwrap();
        if state.knobs.detail_never_idle && state.route().contains("/id-") {
            return Err(E2eError::Timeout("networkidle".into()));
        }
        Ok(())
    }

    async fn url(&self) -> E2eResult<String> {
        Ok(self.current_url())
    }

    async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        Ok(self.state.lock().unwrap().resolve(locator).len())
    }

    async fn is_visible(&self, locator: &Locator) -> E2eResult<bool> {
        Ok(!self.state.lock().unwrap().resolve(locator).is_empty())
    }

    async fn is_disabled(&self, locator: &Locator) -> E2eResult<bool> {
        let state = self.state.lock().unwrap();
        match state.single(locator)? {
            El::DialogInput(name) if name == "typeCode" => Ok(matches!(state.dialog, Some(Dialog::Edit { .. }))
                && !state.knobs.code_editable_in_edit),
            _ => Ok(false),
        }
    }

    async fn click(&self, locator: &Locator) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        let el = state.single(locator)?;
        state.activate(el);
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        let el = state.single(locator)?;
        state.set_value(el, value)
    }

    async fn clear(&self, locator: &Locator) -> E2eResult<()> {
        self.fill(locator, "").await
    }

    async fn press(&self, key: &str) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        state.pressed.push(key.to_string());
        if key == "Escape" {
            state.menu_for = None;
        }
        Ok(())
    }

    async fn wait_for(&self, locator: &Locator, wait: WaitState, _timeout: Duration) -> E2eResult<()> {
        let present = !self.state.lock().unwrap().resolve(locator).is_empty();
        let reached = match wait {
            WaitState::Visible | WaitState::Attached => present,
            WaitState::Hidden | WaitState::Detached => !present,
        };
        if reached {
            Ok(())
        } else {
            Err(E2eError::Timeout(format!("{} to be {:?}", locator, wait)))
        }
    }

    async fn wait_for_function(&self, expression: &str, _timeout: Duration) -> E2eResult<()> {
        let state = self.state.lock().unwrap();
        let holds = if expression.contains("skeleton") {
            !state.knobs.skeletons_stay
        } else if expression.contains("SPK Aktif") {
            state.knobs.dashboard_metric && state.route() == "/"
        } else {
            true
        };
        if holds {
            Ok(())
        } else {
            Err(E2eError::Timeout("function to become truthy".into()))
        }
    }

    async fn screenshot(&self, path: &Path, _full_page: bool) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.knobs.screenshot_fails {
            return Err(E2eError::Playwright("screenshot: target closed".into()));
        }
        state.screenshots.push(path.to_path_buf());
        Ok(())
    }

    async fn wait_for_timeout(&self, _duration: Duration) {}
}

/// Config pointing at the fake, with screenshots under `dir`
pub fn config(dir: &Path) -> RunConfig {
    RunConfig {
        base_url: BASE.to_string(),
        screenshot_dir: dir.to_path_buf(),
        preflight: false,
        ..Default::default()
    }
}
