//! Output: workbook bundles and terminal formatting

pub mod json;
pub mod sheet;
pub mod table;
pub mod xlsx;

pub use sheet::{Cell, Sheet, SheetBundle};
