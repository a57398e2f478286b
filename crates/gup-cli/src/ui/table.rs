//! Table rendering for CLI output using comfy-table.
//!
//! | Command | Table Function |
//! |---------|----------------|
//! | `gup list` | `render_profiles_table()` |
//! | `gup status` (out of sync) | `render_diff_table()` |

use comfy_table::presets::NOTHING;
use comfy_table::{Cell, ColumnConstraint, ContentArrangement, Table, Width};

use gup_core::{FieldDiff, SELECTED_MARKER};

use super::color::terminal_width;
use super::format::{or_unset, truncate_str};

/// One row of the profile list.
#[derive(Debug, Clone)]
pub struct ProfileRow {
    /// Whether this is the selection for the current repository.
    pub selected: bool,
    /// Profile label
    pub label: String,
    /// Git user name
    pub user_name: String,
    /// Git email
    pub email: String,
    /// Signing key, empty when unused
    pub signing_key: String,
    /// Profile id
    pub id: String,
}

fn base_table() -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_width(terminal_width());
    table
}

/// Render the profile list for `gup list`.
///
/// # Example Output
///
/// ```text
///   LABEL   NAME    EMAIL            SIGNING KEY   ID
/// ✔ Work    Alice   alice@corp.com   (unset)       0f8fad5b
///   Home    Alice   alice@home.org   4AEE18F8      7c9e6679
/// ```
pub fn render_profiles_table(rows: &[ProfileRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut table = base_table();
    table.set_header(vec![
        Cell::new(""),
        Cell::new("LABEL"),
        Cell::new("NAME"),
        Cell::new("EMAIL"),
        Cell::new("SIGNING KEY"),
        Cell::new("ID"),
    ]);
    table.set_constraints(vec![
        ColumnConstraint::Absolute(Width::Fixed(1)), // marker
        ColumnConstraint::LowerBoundary(Width::Fixed(8)), // LABEL
        ColumnConstraint::LowerBoundary(Width::Fixed(8)), // NAME
        ColumnConstraint::LowerBoundary(Width::Fixed(12)), // EMAIL
        ColumnConstraint::LowerBoundary(Width::Fixed(11)), // SIGNING KEY
        ColumnConstraint::Absolute(Width::Fixed(8)), // ID
    ]);

    for row in rows {
        let marker = if row.selected {
            SELECTED_MARKER.trim()
        } else {
            ""
        };
        table.add_row(vec![
            Cell::new(marker),
            Cell::new(truncate_str(or_unset(&row.label), 24)),
            Cell::new(or_unset(&row.user_name)),
            Cell::new(or_unset(&row.email)),
            Cell::new(truncate_str(or_unset(&row.signing_key), 16)),
            Cell::new(row.id.get(..8).unwrap_or(&row.id)),
        ]);
    }

    table.trim_fmt().to_string()
}

/// Render profile-vs-config differences for `gup status`.
///
/// # Example Output
///
/// ```text
/// KEY          PROFILE          CONFIGURED
/// user.email   alice@corp.com   alice@home.org
/// ```
pub fn render_diff_table(diffs: &[FieldDiff]) -> String {
    if diffs.is_empty() {
        return String::new();
    }

    let mut table = base_table();
    table.set_header(vec![
        Cell::new("KEY"),
        Cell::new("PROFILE"),
        Cell::new("CONFIGURED"),
    ]);

    for diff in diffs {
        table.add_row(vec![
            Cell::new(diff.key),
            Cell::new(or_unset(&diff.expected)),
            Cell::new(or_unset(&diff.actual)),
        ]);
    }

    table.trim_fmt().to_string()
}
