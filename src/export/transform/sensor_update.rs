//! Sensor update policies: one row per policy, grouped by platform

use serde_json::Value;

use super::{Groups, policy_platform};
use crate::export::value::{at, text, text_at, text_or};
use crate::output::{Cell, Sheet, SheetBundle};

const HEADERS: [&str; 3] = ["name", "build", "uninstall_protection"];

/// Reduce a build string to `N`, `N-1` or `N-2`.
///
/// Matching is case-insensitive and checks the most specific token first.
/// Strings without an `n` pass through unchanged.
pub fn normalize_build(build: &str) -> String {
    let lower = build.to_lowercase();
    if !lower.contains('n') {
        build.to_string()
    } else if lower.contains("n-2") {
        "N-2".to_string()
    } else if lower.contains("n-1") {
        "N-1".to_string()
    } else {
        "N".to_string()
    }
}

fn uninstall_protection(policy: &Value) -> String {
    let value = at(policy, &["settings", "uninstall_protection"])
        .or_else(|| policy.get("uninstall_protection"));
    match value {
        Some(Value::Bool(true)) => "Enabled".to_string(),
        Some(Value::Bool(false)) => "Disabled".to_string(),
        Some(other) => text(other),
        None => String::new(),
    }
}

pub fn transform(policies: &[Value]) -> SheetBundle {
    let mut platforms: Groups<Vec<Vec<Cell>>> = Groups::default();

    for policy in policies {
        let Some(platform) = policy_platform(policy) else {
            continue;
        };
        platforms.entry(&platform).push(vec![
            Cell::from(text_or(policy, &["name"], "Unnamed")),
            Cell::from(normalize_build(&text_at(policy, &["settings", "build"]))),
            Cell::from(uninstall_protection(policy)),
        ]);
    }

    let mut bundle = SheetBundle::new();
    for (platform, rows) in platforms {
        let mut sheet = Sheet::new(platform, HEADERS);
        for row in rows {
            sheet.push_row(row);
        }
        bundle.insert(sheet);
    }
    bundle
}
