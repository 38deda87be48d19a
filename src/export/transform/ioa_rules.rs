//! Custom IOA rules: one row per rule across all rule groups

use serde_json::Value;

use crate::export::value::{first_field_value, list_at, text_at};
use crate::output::{Cell, Sheet, SheetBundle};

pub const SHEET: &str = "IOARules";

const RULE_FIELDS: [&str; 5] = [
    "name",
    "description",
    "pattern_severity",
    "action_label",
    "ruletype_name",
];

/// Rule `field_values` entries reduced to their first value
const MATCH_FIELDS: [&str; 6] = [
    "ImageFilename",
    "CommandLine",
    "ParentImageFilename",
    "ParentCommandLine",
    "GrandparentImageFilename",
    "GrandparentCommandLine",
];

pub fn transform(rule_groups: &[Value]) -> SheetBundle {
    let mut sheet = Sheet::new(SHEET, RULE_FIELDS.into_iter().chain(MATCH_FIELDS));

    for group in rule_groups {
        for rule in list_at(group, &["rules"]) {
            let field_values = list_at(rule, &["field_values"]);
            let row = RULE_FIELDS
                .iter()
                .map(|f| text_at(rule, &[*f]))
                .chain(MATCH_FIELDS.iter().map(|f| first_field_value(field_values, f)))
                .map(Cell::from)
                .collect();
            sheet.push_row(row);
        }
    }

    let mut bundle = SheetBundle::new();
    if !sheet.is_empty() {
        bundle.meta("total_rules", sheet.rows.len());
        bundle.insert(sheet);
    }
    bundle
}
