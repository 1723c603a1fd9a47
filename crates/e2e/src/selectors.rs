//! Selectors for the admin console markup

use crate::page::quote;

pub const TABLE_ROWS: &str = "table tbody tr";
pub const ADD_BUTTON: &str = r#"button:has-text("Tambah Data")"#;
pub const DIALOG: &str = r#"[role="dialog"]"#;
pub const CONFIRM_DIALOG: &str = r#"[role="alertdialog"], [role="dialog"]"#;
pub const SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;
pub const SAVE_BUTTON: &str = r#"button[type="submit"]:has-text("Simpan")"#;
pub const NO_RESULTS: &str = r#"td:has-text("No results")"#;
pub const BUTTON: &str = "button";

/// Affirmative labels a destructive-action confirmation may use
pub const CONFIRM_LABELS: [&str; 4] = ["Ya", "Hapus", "Konfirmasi", "Lanjutkan"];

/// Row action control candidates, most specific first
pub const ROW_ACTION_ICON_BUTTON: &str =
    "button:has(svg.lucide-more-horizontal), button:has(.sr-only)";
pub const ROW_ACTION_LAST_CELL_BUTTON: &str = "td:last-child button";

pub fn has_text(base: &str, text: &str) -> String {
    format!("{}:has-text({})", base, quote(text))
}

pub fn input_named(name: &str) -> String {
    format!("input[name={}]", quote(name))
}

pub fn exact_text(text: &str) -> String {
    format!("text={}", quote(text))
}

pub fn heading(text: &str) -> String {
    has_text("h1", text)
}

pub fn link(text: &str) -> String {
    has_text("a", text)
}

pub fn menu_item(text: &str) -> String {
    has_text(r#"[role="menuitem"]"#, text)
}

/// 1-based row position, as CSS counts it
pub fn row_at(position: usize) -> String {
    format!("{}:nth-child({})", TABLE_ROWS, position)
}

pub fn row_containing(text: &str) -> String {
    has_text(TABLE_ROWS, text)
}

/// Any input whose placeholder contains one of `fragments`
pub fn search_input(fragments: &[&str]) -> String {
    fragments
        .iter()
        .map(|f| format!("input[placeholder*={}]", quote(f)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn confirm_button() -> String {
    CONFIRM_LABELS
        .iter()
        .map(|label| has_text(BUTTON, label))
        .collect::<Vec<_>>()
        .join(", ")
}
