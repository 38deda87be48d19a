//! Host groups: a single sheet with a trailing installed-host total

use serde_json::Value;

use crate::export::value::{text_at, text_or};
use crate::output::{Cell, Sheet, SheetBundle};

pub const SHEET: &str = "HostGroups";
pub const TOTAL_ROW: &str = "Total Hosts Installed";

pub fn transform(groups: &[Value], total_hosts: u64) -> SheetBundle {
    let mut bundle = SheetBundle::new();
    if groups.is_empty() {
        return bundle;
    }

    let mut sheet = Sheet::new(SHEET, ["Host Group", "Assignment Rule"]);
    for group in groups {
        sheet.push_row(vec![
            Cell::from(text_or(group, &["name"], "Unnamed")),
            Cell::from(text_at(group, &["assignment_rule"])),
        ]);
    }
    sheet.push_row(vec![Cell::from(TOTAL_ROW), Cell::from(total_hosts)]);

    bundle.insert(sheet);
    bundle.meta("total_host_groups", groups.len());
    bundle.meta("total_hosts", total_hosts);
    bundle
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_groups_then_total_row() {
        let groups = vec![
            json!({ "name": "Servers", "assignment_rule": "platform_name:'Linux'", "group_type": "dynamic" }),
            json!({ "group_type": "static" }),
        ];

        let bundle = transform(&groups, 1234);
        let sheet = bundle.sheet(SHEET).unwrap();

        assert_eq!(
            sheet.rows,
            vec![
                vec![Cell::from("Servers"), Cell::from("platform_name:'Linux'")],
                vec![Cell::from("Unnamed"), Cell::empty()],
                vec![Cell::from("Total Hosts Installed"), Cell::Number(1234)],
            ]
        );

        let meta = bundle.meta_sheet(Utc::now());
        assert_eq!(&meta.headers[3..], &["total_host_groups", "total_hosts"]);
        assert_eq!(&meta.rows[0][3..], &[Cell::Number(2), Cell::Number(1234)]);
    }

    #[test]
    fn test_no_groups_is_empty() {
        assert!(transform(&[], 50).is_empty());
    }
}
