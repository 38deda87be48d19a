//! Logical spreadsheet model: sheets, cells and the bundle written per export

use std::fmt;

use chrono::{DateTime, Utc};
use log::warn;
use serde::Serialize;

/// Longest sheet name a workbook accepts
pub const MAX_SHEET_NAME: usize = 31;

/// Name of the trailing metadata sheet
pub const META_SHEET: &str = "Meta";

/// Format of `generated_at_utc`: UTC, second precision
pub const GENERATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// One scalar cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(i64),
}

impl Cell {
    pub fn empty() -> Self {
        Cell::Text(String::new())
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::empty()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<usize> for Cell {
    fn from(n: usize) -> Self {
        Cell::Number(n as i64)
    }
}

impl From<u64> for Cell {
    fn from(n: u64) -> Self {
        Cell::Number(n as i64)
    }
}

/// A named table with ordered headers and rows.
///
/// Every row has exactly `headers.len()` cells; short rows are padded with
/// empty text and long rows are cut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new<S: Into<String>>(name: impl Into<String>, headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), Cell::empty());
        self.rows.push(row);
    }

    /// Column values of the first row whose first cell is `label`
    pub fn row_by_label(&self, label: &str) -> Option<&[Cell]> {
        self.rows
            .iter()
            .find(|r| matches!(r.first(), Some(Cell::Text(s)) if s == label))
            .map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reduce a discriminator value to a usable sheet name.
///
/// Characters a workbook rejects become `_`, then the name is cut to
/// [`MAX_SHEET_NAME`] characters. Distinct inputs may collide.
pub fn sheet_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_matches('\'');
    if cleaned.trim().is_empty() {
        return "Unknown".to_string();
    }
    cleaned.chars().take(MAX_SHEET_NAME).collect()
}

/// Ordered sheets for one export plus the values its Meta sheet reports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetBundle {
    sheets: Vec<Sheet>,
    meta_extras: Vec<(String, Cell)>,
}

impl SheetBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet under its normalized name.
    ///
    /// A sheet whose normalized name is already taken replaces the earlier
    /// one in place (last write wins).
    pub fn insert(&mut self, mut sheet: Sheet) {
        let original = std::mem::take(&mut sheet.name);
        sheet.name = sheet_name(&original);

        if sheet.name.eq_ignore_ascii_case(META_SHEET) {
            warn!("Sheet '{}' clashes with the metadata sheet and is dropped", original);
            return;
        }

        match self
            .sheets
            .iter_mut()
            .find(|s| s.name.eq_ignore_ascii_case(&sheet.name))
        {
            Some(existing) => {
                warn!(
                    "Sheet name '{}' (from '{}') already used; replacing earlier sheet",
                    sheet.name, original
                );
                *existing = sheet;
            }
            None => self.sheets.push(sheet),
        }
    }

    /// Record an extra column for the Meta sheet.
    pub fn meta(&mut self, key: &str, value: impl Into<Cell>) {
        self.meta_extras.push((key.to_string(), value.into()));
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Build the trailing metadata sheet.
    pub fn meta_sheet(&self, generated_at: DateTime<Utc>) -> Sheet {
        let mut headers = vec![
            "generated_at_utc".to_string(),
            "sheet_names".to_string(),
            "sheet_count".to_string(),
        ];
        let mut row = vec![
            Cell::Text(generated_at.format(GENERATED_AT_FORMAT).to_string()),
            Cell::Text(self.sheet_names().join(", ")),
            Cell::from(self.sheets.len()),
        ];
        for (key, value) in &self.meta_extras {
            headers.push(key.clone());
            row.push(value.clone());
        }

        let mut meta = Sheet::new(META_SHEET, headers);
        meta.push_row(row);
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sheet(name: &str, marker: &str) -> Sheet {
        let mut s = Sheet::new(name, ["col"]);
        s.push_row(vec![Cell::from(marker)]);
        s
    }

    #[test]
    fn test_push_row_pads_to_header_width() {
        let mut s = Sheet::new("Windows", ["Setting", "Recommended", "Default"]);
        s.push_row(vec![Cell::from("Quarantine")]);
        assert_eq!(s.rows[0].len(), 3);
        assert_eq!(s.rows[0][2], Cell::empty());
    }

    #[test]
    fn test_sheet_name_truncates_to_31_chars() {
        let long = "a".repeat(40);
        assert_eq!(sheet_name(&long).chars().count(), 31);
        assert_eq!(sheet_name("Windows"), "Windows");
    }

    #[test]
    fn test_sheet_name_replaces_forbidden_characters() {
        assert_eq!(sheet_name("ipv4/ipv6"), "ipv4_ipv6");
        assert_eq!(sheet_name(""), "Unknown");
    }

    #[test]
    fn test_truncation_collision_is_last_write_wins() {
        let prefix = "x".repeat(31);
        let mut bundle = SheetBundle::new();
        bundle.insert(sheet("Linux", "linux"));
        bundle.insert(sheet(&format!("{}first", prefix), "first"));
        bundle.insert(sheet(&format!("{}second", prefix), "second"));

        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.sheet_names(), vec!["Linux", prefix.as_str()]);
        let kept = bundle.sheet(&prefix).unwrap();
        assert_eq!(kept.rows[0][0], Cell::from("second"));
    }

    #[test]
    fn test_data_sheet_named_meta_is_dropped() {
        let mut bundle = SheetBundle::new();
        bundle.insert(sheet("Meta", "x"));
        assert!(bundle.is_empty());
    }

    #[test]
    fn test_meta_sheet_contents() {
        let mut bundle = SheetBundle::new();
        bundle.insert(sheet("Windows", "w"));
        bundle.insert(sheet("Mac", "m"));
        bundle.meta("total_rules", 12usize);

        let at = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let meta = bundle.meta_sheet(at);

        assert_eq!(meta.name, "Meta");
        assert_eq!(
            meta.headers,
            vec!["generated_at_utc", "sheet_names", "sheet_count", "total_rules"]
        );
        assert_eq!(
            meta.rows[0],
            vec![
                Cell::from("2026-03-04T05:06:07Z"),
                Cell::from("Windows, Mac"),
                Cell::Number(2),
                Cell::Number(12),
            ]
        );
    }
}
