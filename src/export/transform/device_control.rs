//! Device control (USB) policies: one sheet per platform

use serde_json::Value;

use super::{Groups, Pivot, policy_platform};
use crate::export::value::{list_at, text_at, text_or};
use crate::output::{Cell, SheetBundle};

/// Rows every device control sheet starts with
const FIXED_ROWS: [&str; 2] = ["enforcement_mode", "end_user_notification"];

pub fn transform(policies: &[Value]) -> SheetBundle {
    let mut platforms: Groups<Pivot> = Groups::default();

    for policy in policies {
        let Some(platform) = policy_platform(policy) else {
            continue;
        };
        let pivot = platforms.entry(&platform);
        for row in FIXED_ROWS {
            pivot.row(row);
        }
        let column = pivot.column(&text_or(policy, &["name"], "Unnamed"));

        for row in FIXED_ROWS {
            pivot.set(row, column, text_at(policy, &["settings", row]));
        }

        for class in list_at(policy, &["settings", "classes"]) {
            let id = text_at(class, &["id"]);
            let action = text_at(class, &["action"]);
            if !id.is_empty() && !action.is_empty() {
                pivot.set(&id, column, action);
            }
        }
    }

    let mut bundle = SheetBundle::new();
    for (platform, pivot) in platforms {
        bundle.insert(pivot.into_sheet(&platform, &["Setting"], |l| vec![Cell::from(l)]));
    }
    bundle
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fixed_rows_then_classes() {
        let policies = vec![
            json!({
                "name": "Block USB",
                "platform_name": "Windows",
                "settings": {
                    "enforcement_mode": "MONITOR_ENFORCE",
                    "end_user_notification": "SILENT",
                    "classes": [
                        { "id": "MASS_STORAGE", "action": "BLOCK_ALL" },
                        { "id": "IMAGING", "action": "FULL_ACCESS" },
                        { "id": "PRINTER" }
                    ]
                }
            }),
            json!({
                "name": "Audit",
                "platform_name": "Windows",
                "settings": {
                    "enforcement_mode": "MONITOR_ONLY",
                    "classes": [{ "id": "WIRELESS", "action": "FULL_ACCESS" }]
                }
            }),
        ];

        let sheet = transform(&policies).sheets()[0].clone();

        assert_eq!(sheet.headers, vec!["Setting", "Block USB", "Audit"]);
        let labels: Vec<String> = sheet.rows.iter().map(|r| r[0].to_string()).collect();
        assert_eq!(
            labels,
            vec![
                "enforcement_mode",
                "end_user_notification",
                "MASS_STORAGE",
                "IMAGING",
                "WIRELESS"
            ]
        );
        assert_eq!(
            sheet.row_by_label("end_user_notification").unwrap(),
            &[Cell::from("end_user_notification"), Cell::from("SILENT"), Cell::empty()]
        );
        assert_eq!(
            sheet.row_by_label("WIRELESS").unwrap(),
            &[Cell::from("WIRELESS"), Cell::empty(), Cell::from("FULL_ACCESS")]
        );
    }

    #[test]
    fn test_mobile_policies_are_skipped() {
        let policies = vec![json!({ "name": "Phones", "platform_name": "Mobile" })];
        assert!(transform(&policies).is_empty());
    }
}
