//! Exclusions: one sheet per exclusion family

use serde_json::Value;

use crate::export::value::text_at;
use crate::output::{Cell, Sheet, SheetBundle};

pub const CERTIFICATE: &str = "Certificate Based Exclusion";
pub const MACHINE_LEARNING: &str = "ML Exclusion";
pub const IOA: &str = "IOA Exclusion";
pub const SENSOR_VISIBILITY: &str = "Sensor Visibility Exclusion";

/// (header, record field) pairs for a family's sheet
type Layout = &'static [(&'static str, &'static str)];

const CERTIFICATE_LAYOUT: Layout = &[
    ("issuer", "issuer"),
    ("serial", "serial"),
    ("created_by", "created_by"),
    ("created_timestamp", "created_on"),
];

const VALUE_LAYOUT: Layout = &[
    ("value", "value"),
    ("created_by", "created_by"),
    ("created_timestamp", "created_on"),
];

const IOA_LAYOUT: Layout = &[
    ("name", "name"),
    ("ifn_regex", "ifn_regex"),
    ("cl_regex", "cl_regex"),
    ("created_by", "created_by"),
    ("created_timestamp", "created_on"),
];

fn layout(family: &str) -> Layout {
    match family {
        CERTIFICATE => CERTIFICATE_LAYOUT,
        IOA => IOA_LAYOUT,
        _ => VALUE_LAYOUT,
    }
}

/// One sheet per family section, in the order given.
///
/// A section is present only when its id query returned ids; its sheet is
/// written even if every detail lookup failed.
pub fn transform(sections: &[(&str, &[Value])]) -> SheetBundle {
    let mut bundle = SheetBundle::new();

    for (family, records) in sections {
        let layout = layout(family);
        let mut sheet = Sheet::new(*family, layout.iter().map(|(header, _)| *header));
        for record in records.iter() {
            sheet.push_row(
                layout
                    .iter()
                    .map(|(_, field)| Cell::from(text_at(record, &[*field])))
                    .collect(),
            );
        }
        bundle.insert(sheet);
    }
    bundle
}
