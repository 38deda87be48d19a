//! JSON output wrapper

use chrono::Utc;
use serde::Serialize;

use super::sheet::GENERATED_AT_FORMAT;

/// Payload plus generation metadata
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub data: T,
    pub meta: Metadata,
}

#[derive(Debug, Serialize)]
pub struct Metadata {
    /// UTC, same format as the workbook Meta sheet
    pub generated_at: String,
    pub version: String,
}

impl<T> JsonOutput<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: Metadata {
                generated_at: Utc::now().format(GENERATED_AT_FORMAT).to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

/// Pretty-printed JSON with a `meta` block
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput::new(data))
}
