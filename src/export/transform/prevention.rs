//! Prevention policies: one sheet per platform, settings by policy

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::{Groups, Pivot, policy_platform, recommended};
use crate::export::value::{list_at, text, text_at, text_or};
use crate::output::{Cell, SheetBundle};

/// Label of the synthetic per-policy host count row
pub const HOST_COUNT: &str = "Host Count";

/// Row dropped from every prevention sheet
pub const EXCLUDED_ROW: &str = "Extended User Mode Data (Prevention)";

/// A setting value reduced to display text
#[derive(Debug, PartialEq, Eq)]
enum Rendered {
    Single(String),
    Split { detection: String, prevention: String },
}

fn on_off(flag: bool) -> String {
    let token = if flag { "ON" } else { "OFF" };
    token.to_string()
}

fn render_part(value: &Value) -> String {
    match value {
        Value::Bool(b) => on_off(*b),
        other => text(other),
    }
}

fn render_object(map: &Map<String, Value>) -> Rendered {
    if map.contains_key("detection") && map.contains_key("prevention") {
        return Rendered::Split {
            detection: render_part(&map["detection"]),
            prevention: render_part(&map["prevention"]),
        };
    }

    // enabled / configured flags collapse to one boolean
    let flags: Option<Vec<bool>> = map
        .iter()
        .map(|(k, v)| match k.as_str() {
            "enabled" | "configured" => v.as_bool(),
            _ => None,
        })
        .collect();
    if let Some(flags) = flags.filter(|f| !f.is_empty()) {
        return Rendered::Single(on_off(flags.into_iter().all(|f| f)));
    }

    Rendered::Single(
        map.iter()
            .map(|(k, v)| format!("{}:{}", k, render_part(v)))
            .collect::<Vec<_>>()
            .join("/"),
    )
}

fn render(value: &Value) -> Rendered {
    match value {
        Value::Object(map) => render_object(map),
        other => Rendered::Single(render_part(other)),
    }
}

fn policy_name(policy: &Value) -> String {
    let id = text_at(policy, &["id"]);
    text_or(policy, &["name"], &id)
}

/// Hosts per `(platform, policy name)`, from a prevention-members listing.
///
/// Every platform has its own `platform_default` policy, so names alone
/// would merge their counts. Hosts whose policy id matches no known policy
/// are not counted.
pub fn host_counts(policies: &[Value], members: &[Value]) -> HashMap<(String, String), u64> {
    let keys: HashMap<String, (String, String)> = policies
        .iter()
        .filter_map(|p| {
            let platform = policy_platform(p)?;
            Some((text_at(p, &["id"]), (platform, policy_name(p))))
        })
        .filter(|(id, _)| !id.is_empty())
        .collect();

    let mut counts = HashMap::new();
    for host in members {
        let policy_id = text_at(host, &["device_policies", "prevention", "policy_id"]);
        if let Some(key) = keys.get(&policy_id) {
            *counts.entry(key.clone()).or_insert(0) += 1;
        }
    }
    counts
}

fn put(pivot: &mut Pivot, row: &str, column: usize, value: String) {
    if row != EXCLUDED_ROW {
        pivot.set(row, column, value);
    }
}

/// Build one sheet per platform.
///
/// `members` is the prevention-members listing; `None` means it could not
/// be fetched and the Host Count row is left blank.
pub fn transform(policies: &[Value], members: Option<&[Value]>) -> SheetBundle {
    let counts = members.map(|m| host_counts(policies, m));
    let mut platforms: Groups<Pivot> = Groups::default();

    for policy in policies {
        let Some(platform) = policy_platform(policy) else {
            continue;
        };
        let pivot = platforms.entry(&platform);
        let column = pivot.column(&policy_name(policy));

        for group in list_at(policy, &["prevention_settings"]) {
            for setting in list_at(group, &["settings"]) {
                let name = text_at(setting, &["name"]);
                if name.is_empty() {
                    continue;
                }
                match render(setting.get("value").unwrap_or(&Value::Null)) {
                    Rendered::Single(value) => put(pivot, &name, column, value),
                    Rendered::Split {
                        detection,
                        prevention,
                    } => {
                        if !detection.is_empty() {
                            put(pivot, &format!("{} (Detection)", name), column, detection);
                        }
                        if !prevention.is_empty() {
                            put(pivot, &format!("{} (Prevention)", name), column, prevention);
                        }
                    }
                }
            }
        }
    }

    let mut bundle = SheetBundle::new();
    for (platform, mut pivot) in platforms {
        let columns = pivot.columns().to_vec();
        for (column, name) in columns.iter().enumerate() {
            let cell = match &counts {
                Some(counts) => {
                    let key = (platform.clone(), name.clone());
                    Cell::from(counts.get(&key).copied().unwrap_or(0))
                }
                None => Cell::empty(),
            };
            pivot.set(HOST_COUNT, column, cell);
        }

        let sheet = pivot.into_sheet(&platform, &["Setting", "Recommended"], |label| {
            let recommended = if label == HOST_COUNT {
                ""
            } else {
                recommended::lookup(&platform, label).unwrap_or("")
            };
            vec![Cell::from(label), Cell::from(recommended)]
        });
        bundle.insert(sheet);
    }
    bundle
}
