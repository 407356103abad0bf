//! Workbook extractor implementation - spreadsheet → ExtractedDocument

use crate::error::{ConvertError, ConvertResult};
use crate::types::{ExtractedDocument, Field, Section};
use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Number, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Textual form used for date/time cells (matches the usual timestamp display)
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Inferred kind of a column's data cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    /// No data cells
    Empty,
    Number,
    Boolean,
    /// Every data cell is a date/time; values are carried as text
    DateTime,
    Text,
    /// More than one kind of cell
    Mixed,
}

/// One column of a sheet with its header and data values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetColumn {
    pub header: String,
    pub kind: ColumnKind,
    /// Data cells below the header. Date/time cells are always strings.
    pub values: Vec<Value>,
}

/// One worksheet read from the workbook, columns in physical order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetTable {
    pub name: String,
    pub columns: Vec<SheetColumn>,
}

impl SheetTable {
    /// Number of data rows (excluding the header row)
    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header.as_str()).collect()
    }

    /// Structural section for this sheet: one field per column
    pub fn to_section(&self) -> Section {
        let mut section = Section::new(self.name.clone());
        for column in &self.columns {
            section.add_field(Field::from_header(column.header.clone()));
        }
        section
    }
}

/// Extractor for turning a workbook on disk into an [`ExtractedDocument`]
pub struct WorkbookExtractor {
    path: PathBuf,
}

impl WorkbookExtractor {
    /// Create a new extractor for the workbook at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every sheet, in workbook order
    pub fn read_sheets(&self) -> ConvertResult<Vec<SheetTable>> {
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| {
            ConvertError::UnreadableWorkbook(format!(
                "Failed to open {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let sheet_names = workbook.sheet_names().to_vec();
        info!(
            path = %self.path.display(),
            sheets = sheet_names.len(),
            "Opened workbook"
        );

        let mut sheets = Vec::with_capacity(sheet_names.len());
        for sheet_name in sheet_names {
            let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
                ConvertError::UnreadableWorkbook(format!(
                    "Failed to read sheet '{}': {}",
                    sheet_name, e
                ))
            })?;
            let table = read_table(&sheet_name, &range);
            debug!(
                sheet = %table.name,
                columns = table.columns.len(),
                rows = table.row_count(),
                "Read sheet"
            );
            sheets.push(table);
        }

        Ok(sheets)
    }

    /// Extract the structural document, deriving the signature from `source_name`
    pub fn extract(&self, source_name: &str) -> ConvertResult<ExtractedDocument> {
        let sheets = self.read_sheets()?;
        let sections = sheets.iter().map(SheetTable::to_section).collect();
        Ok(ExtractedDocument::new(
            signature_from_filename(source_name),
            sections,
        ))
    }
}

/// Document signature from an uploaded filename.
///
/// Takes the basename and keeps everything before the first `.`, so
/// `report.v2.xlsx` becomes `report`.
pub fn signature_from_filename(filename: &str) -> String {
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    basename.split('.').next().unwrap_or(basename).to_string()
}

/// Convert a calamine range into headers plus column values
fn read_table(sheet_name: &str, range: &Range<Data>) -> SheetTable {
    if range.is_empty() {
        return SheetTable {
            name: sheet_name.to_string(),
            columns: Vec::new(),
        };
    }

    let (height, width) = range.get_size();

    // Row 0 is the header row
    let raw_headers: Vec<Option<String>> = (0..width)
        .map(|col| range.get((0, col)).and_then(header_text))
        .collect();
    let headers = dedupe_headers(raw_headers);
    let empty = Data::Empty;

    let columns = headers
        .into_iter()
        .enumerate()
        .map(|(col, header)| {
            let cells: Vec<&Data> = (1..height)
                .map(|row| range.get((row, col)).unwrap_or(&empty))
                .collect();
            SheetColumn {
                header,
                kind: infer_kind(&cells),
                values: cells.into_iter().map(cell_value).collect(),
            }
        })
        .collect();

    SheetTable {
        name: sheet_name.to_string(),
        columns,
    }
}

/// Header text for a cell, `None` for blank cells
fn header_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.trim().is_empty() => None,
        other => Some(cell_text(other)),
    }
}

/// Name blank headers `Unnamed: N` and suffix repeats with `.1`, `.2`, ...
fn dedupe_headers(raw: Vec<Option<String>>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let base = name.unwrap_or_else(|| format!("Unnamed: {}", idx));
        let mut candidate = base.clone();
        let mut counter = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", base, counter);
            counter += 1;
        }
        seen.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}

/// Textual representation of any cell
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => datetime_text(cell),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

fn datetime_text(cell: &Data) -> String {
    let parsed: Option<NaiveDateTime> = cell.as_datetime();
    match parsed {
        Some(dt) => dt.format(DATETIME_FORMAT).to_string(),
        None => cell.to_string(),
    }
}

/// Integral floats print without a fractional part
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// JSON value for a data cell; temporal cells become strings
fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::Int(i) => Value::Number((*i).into()),
        Data::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Data::Bool(b) => Value::Bool(*b),
        other => Value::String(cell_text(other)),
    }
}

fn cell_kind(cell: &Data) -> Option<ColumnKind> {
    match cell {
        Data::Empty => None,
        Data::Int(_) | Data::Float(_) => Some(ColumnKind::Number),
        Data::Bool(_) => Some(ColumnKind::Boolean),
        Data::DateTime(_) | Data::DateTimeIso(_) => Some(ColumnKind::DateTime),
        Data::String(_) | Data::DurationIso(_) | Data::Error(_) => Some(ColumnKind::Text),
    }
}

fn infer_kind(cells: &[&Data]) -> ColumnKind {
    let mut kinds = cells.iter().filter_map(|c| cell_kind(c));
    let first = match kinds.next() {
        Some(kind) => kind,
        None => return ColumnKind::Empty,
    };
    if kinds.all(|k| k == first) {
        first
    } else {
        ColumnKind::Mixed
    }
}
