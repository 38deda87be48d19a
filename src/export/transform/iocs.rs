//! Indicators of compromise: one sheet per indicator type

use serde_json::Value;

use super::{Groups, discriminator};
use crate::export::value::text_at;
use crate::output::{Cell, Sheet, SheetBundle};

const HEADERS: [&str; 4] = ["value", "original_filename", "action", "platforms"];

pub fn transform(indicators: &[Value]) -> SheetBundle {
    let mut types: Groups<Vec<Vec<Cell>>> = Groups::default();

    for ioc in indicators {
        types.entry(&discriminator(ioc, "type")).push(vec![
            Cell::from(text_at(ioc, &["value"])),
            Cell::from(text_at(ioc, &["metadata", "original_filename"])),
            Cell::from(text_at(ioc, &["action"])),
            Cell::from(text_at(ioc, &["platforms"])),
        ]);
    }

    let mut bundle = SheetBundle::new();
    for (ioc_type, rows) in types {
        let mut sheet = Sheet::new(ioc_type, HEADERS);
        for row in rows {
            sheet.push_row(row);
        }
        bundle.insert(sheet);
    }
    bundle
}
