//! Workbook extraction module
//!
//! Reads xlsx/xlsm/xlsb/xls/ods workbooks and describes their structure:
//! - One section per sheet, in workbook order
//! - One field per column, header text as name and caption
//! - Date/time cells carried as text

mod extractor;

pub use extractor::{
    signature_from_filename, ColumnKind, SheetColumn, SheetTable, WorkbookExtractor,
};
