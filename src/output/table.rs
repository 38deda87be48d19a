//! Terminal tables for run summaries and client listings

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

/// Shown in place of a table with no rows
pub const NO_ROWS: &str = "Nothing to show.";

/// Render rows as a rounded table with a centered header.
pub fn format_table<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return NO_ROWS.to_string();
    }

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}
