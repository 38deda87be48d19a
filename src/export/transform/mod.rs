//! Record-to-sheet transforms, one module per resource kind
//!
//! Transforms are pure: they take already fetched records (and any auxiliary
//! data) and return a [`SheetBundle`]. Rows and columns keep first-seen
//! order so identical input always yields identical sheets.

use std::collections::HashMap;

use serde_json::Value;

use crate::output::{Cell, Sheet};

pub mod device_control;
pub mod exclusions;
pub mod host_groups;
pub mod ioa_rules;
pub mod iocs;
pub mod prevention;
pub mod recommended;
pub mod response;
pub mod sensor_update;

/// Sheet for records with no usable discriminator
pub const UNKNOWN: &str = "Unknown";

/// Platforms policy exports leave out
const SKIPPED_PLATFORMS: [&str; 2] = ["Mobile", "Meta"];

/// Routing key for a record: the string at `field`, or [`UNKNOWN`].
pub fn discriminator(record: &Value, field: &str) -> String {
    match record.get(field).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Platform of a policy, or `None` for platforms that are not exported.
pub fn policy_platform(policy: &Value) -> Option<String> {
    let platform = discriminator(policy, "platform_name");
    (!SKIPPED_PLATFORMS.contains(&platform.as_str())).then_some(platform)
}

/// Values grouped by key, keys in first-seen order
#[derive(Debug)]
pub struct Groups<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for Groups<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Default> Groups<T> {
    pub fn entry(&mut self, key: &str) -> &mut T {
        let idx = match self.entries.iter().position(|(k, _)| k == key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key.to_string(), T::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }
}

impl<T> IntoIterator for Groups<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Row-label by column grid, both axes in first-seen order.
///
/// Setting a cell twice keeps the later value.
#[derive(Debug, Default)]
pub struct Pivot {
    columns: Vec<String>,
    rows: Vec<String>,
    cells: HashMap<(usize, usize), Cell>,
}

impl Pivot {
    /// Index of column `name`, adding it if unseen.
    pub fn column(&mut self, name: &str) -> usize {
        match self.columns.iter().position(|c| c == name) {
            Some(idx) => idx,
            None => {
                self.columns.push(name.to_string());
                self.columns.len() - 1
            }
        }
    }

    /// Index of row `label`, adding it if unseen.
    pub fn row(&mut self, label: &str) -> usize {
        match self.rows.iter().position(|r| r == label) {
            Some(idx) => idx,
            None => {
                self.rows.push(label.to_string());
                self.rows.len() - 1
            }
        }
    }

    pub fn set(&mut self, row: &str, column: usize, value: impl Into<Cell>) {
        let row = self.row(row);
        self.cells.insert((row, column), value.into());
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Render as a sheet. `leading` names the columns before the pivot
    /// columns; `lead` produces their cells for each row label.
    pub fn into_sheet<F>(mut self, name: &str, leading: &[&str], lead: F) -> Sheet
    where
        F: Fn(&str) -> Vec<Cell>,
    {
        let headers = leading
            .iter()
            .map(|h| h.to_string())
            .chain(self.columns.iter().cloned());
        let mut sheet = Sheet::new(name, headers);

        for (r, label) in self.rows.iter().enumerate() {
            let mut row = lead(label);
            row.resize(leading.len(), Cell::empty());
            row.extend(
                (0..self.columns.len()).map(|c| self.cells.remove(&(r, c)).unwrap_or_default()),
            );
            sheet.push_row(row);
        }
        sheet
    }
}
