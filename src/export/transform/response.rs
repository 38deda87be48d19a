//! Response policies: one sheet per platform, Enabled/Disabled per setting

use serde_json::Value;

use super::{Groups, Pivot, policy_platform};
use crate::export::value::{at, flag_at, list_at, text_at, text_or};
use crate::output::{Cell, SheetBundle};

/// `value.enabled`, unwrapping a nested `{enabled: {enabled: bool}}`.
fn enabled(setting: &Value) -> bool {
    match at(setting, &["value", "enabled"]) {
        Some(Value::Bool(b)) => *b,
        Some(nested @ Value::Object(_)) => flag_at(nested, &["enabled"]),
        _ => false,
    }
}

pub fn transform(policies: &[Value]) -> SheetBundle {
    let mut platforms: Groups<Pivot> = Groups::default();

    for policy in policies {
        let Some(platform) = policy_platform(policy) else {
            continue;
        };
        let pivot = platforms.entry(&platform);
        let column = pivot.column(&text_or(policy, &["name"], "Unnamed"));

        for group in list_at(policy, &["settings"]) {
            for setting in list_at(group, &["settings"]) {
                let label = if enabled(setting) { "Enabled" } else { "Disabled" };
                pivot.set(&text_at(setting, &["name"]), column, label);
            }
        }
    }

    let mut bundle = SheetBundle::new();
    for (platform, pivot) in platforms {
        bundle.insert(pivot.into_sheet(&platform, &["Setting"], |l| vec![Cell::from(l)]));
    }
    bundle
}
