//! Workbook writer for sheet bundles

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use super::sheet::{Cell, Sheet, SheetBundle};
use crate::error::{ExportError, Result};

/// Workbook file extension
pub const XLSX_SUFFIX: &str = "xlsx";

/// Append `.xlsx` unless the path already ends with it (any case).
pub fn with_xlsx_suffix(path: &Path) -> PathBuf {
    let has_suffix = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(XLSX_SUFFIX));

    if has_suffix {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(XLSX_SUFFIX);
        PathBuf::from(name)
    }
}

/// Output file for one export: `<dir>/<prefix>_<client slug>.xlsx`
pub fn output_path(dir: &Path, prefix: &str, client_slug: &str) -> PathBuf {
    with_xlsx_suffix(&dir.join(format!("{}_{}", prefix, client_slug)))
}

/// Longest string Excel stores in one cell, in characters
pub const MAX_CELL_CHARS: usize = 32_767;

/// Cut `s` to at most [`MAX_CELL_CHARS`] characters.
fn clip_cell(s: &str) -> Cow<'_, str> {
    match s.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => Cow::Owned(s[..end].to_string()),
        None => Cow::Borrowed(s),
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet, header: &Format) -> std::result::Result<(), XlsxError> {
    worksheet.set_name(&sheet.name)?;

    for (col, title) in sheet.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, title, header)?;
    }

    for (r, row) in sheet.rows.iter().enumerate() {
        let row_idx = (r + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(s) if s.is_empty() => {}
                Cell::Text(s) => {
                    let text = clip_cell(s);
                    if let Cow::Owned(_) = text {
                        warn!(
                            "Sheet '{}' row {} column {}: value truncated to {} characters",
                            sheet.name,
                            row_idx + 1,
                            col + 1,
                            MAX_CELL_CHARS
                        );
                    }
                    worksheet.write_string(row_idx, col as u16, &*text)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(row_idx, col as u16, *n as f64)?;
                }
            }
        }
    }

    worksheet.autofit();
    Ok(())
}

fn render(bundle: &SheetBundle, generated_at: DateTime<Utc>) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for sheet in bundle.sheets() {
        write_sheet(workbook.add_worksheet(), sheet, &header)?;
    }
    write_sheet(workbook.add_worksheet(), &bundle.meta_sheet(generated_at), &header)?;

    workbook.save_to_buffer()
}

/// Write `bundle` plus its Meta sheet to `dest`, all or nothing.
///
/// The workbook is rendered in memory, written beside the destination and
/// renamed into place. On failure nothing is left under the final name.
pub fn write_bundle(bundle: &SheetBundle, dest: &Path, generated_at: DateTime<Utc>) -> Result<PathBuf> {
    let dest = with_xlsx_suffix(dest);
    let write_err = |message: String| ExportError::Write {
        path: dest.display().to_string(),
        message,
    };

    let bytes = render(bundle, generated_at).map_err(|e| write_err(e.to_string()))?;

    let tmp = partial_path(&dest);
    debug!("Writing {} bytes to {}", bytes.len(), tmp.display());

    let finalize = fs::write(&tmp, &bytes).and_then(|_| fs::rename(&tmp, &dest));
    if let Err(e) = finalize {
        if tmp.exists() {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!("Could not remove {}: {}", tmp.display(), cleanup);
            }
        }
        return Err(write_err(e.to_string()).into());
    }

    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    fn bundle() -> SheetBundle {
        let mut bundle = SheetBundle::new();
        let mut sheet = Sheet::new("Windows", ["Setting", "Recommended", "Default"]);
        sheet.push_row(vec![Cell::from("Quarantine"), Cell::from("ON"), Cell::from("OFF")]);
        sheet.push_row(vec![Cell::from("Host Count"), Cell::empty(), Cell::Number(3)]);
        bundle.insert(sheet);
        bundle
    }

    #[test]
    fn test_with_xlsx_suffix() {
        assert_eq!(with_xlsx_suffix(Path::new("out")), PathBuf::from("out.xlsx"));
        assert_eq!(with_xlsx_suffix(Path::new("out.XLSX")), PathBuf::from("out.XLSX"));
        assert_eq!(with_xlsx_suffix(Path::new("out.csv")), PathBuf::from("out.csv.xlsx"));
    }

    #[test]
    fn test_output_path_uses_prefix_and_slug() {
        let path = output_path(Path::new("/tmp/x"), "crowdstrike_iocs", "Acme_Corp");
        assert_eq!(path, PathBuf::from("/tmp/x/crowdstrike_iocs_Acme_Corp.xlsx"));
    }

    #[test]
    fn test_write_bundle_creates_workbook() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("report");

        let written = write_bundle(&bundle(), &dest, Utc::now()).unwrap();

        assert_eq!(written, dir.path().join("report.xlsx"));
        let bytes = fs::read(&written).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
        assert!(!partial_path(&written).exists());
    }

    #[test]
    fn test_clip_cell_respects_char_boundaries() {
        assert!(matches!(clip_cell("short"), Cow::Borrowed("short")));

        let exact = "a".repeat(MAX_CELL_CHARS);
        assert!(matches!(clip_cell(&exact), Cow::Borrowed(_)));

        let long = "é".repeat(MAX_CELL_CHARS + 10);
        let clipped = clip_cell(&long);
        assert_eq!(clipped.chars().count(), MAX_CELL_CHARS);
        assert!(clipped.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_write_bundle_truncates_oversized_cells() {
        let dir = TempDir::new().unwrap();
        let ids: Vec<String> = (0..1100).map(|i| format!("'{:032x}'", i)).collect();
        let rule = format!("device_id:[{}]", ids.join(","));
        assert!(rule.chars().count() > MAX_CELL_CHARS);

        let mut bundle = SheetBundle::new();
        let mut sheet = Sheet::new("Host Groups", ["Name", "Assignment Rule"]);
        sheet.push_row(vec![Cell::from("Static Servers"), Cell::from(rule)]);
        bundle.insert(sheet);

        let written = write_bundle(&bundle, &dir.path().join("groups.xlsx"), Utc::now()).unwrap();
        assert_eq!(&fs::read(&written).unwrap()[..2], b"PK");
    }

    #[test]
    fn test_write_bundle_failure_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("missing-dir").join("report.xlsx");

        let err = write_bundle(&bundle(), &dest, Utc::now()).unwrap_err();

        assert!(matches!(err, Error::Export(ExportError::Write { .. })));
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[test]
    fn test_write_bundle_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("report.xlsx");
        fs::write(&dest, b"stale").unwrap();

        write_bundle(&bundle(), &dest, Utc::now()).unwrap();

        assert_ne!(fs::read(&dest).unwrap(), b"stale");
    }
}
