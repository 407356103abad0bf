//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use sheet2json::error::{ConvertError, ConvertResult};
use sheet2json::llm::GenerationClient;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One fixture cell
pub enum Cell {
    Text(&'static str),
    Number(f64),
    Bool(bool),
    /// (year, month, day) written with a date number format
    Date(u16, u8, u8),
    Blank,
}

/// Write a workbook with the given sheets (name, rows)
pub fn write_workbook(path: &Path, sheets: Vec<(&str, Vec<Vec<Cell>>)>) {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    for (name, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    Cell::Text(s) => {
                        sheet.write_string(r, c, *s).unwrap();
                    }
                    Cell::Number(n) => {
                        sheet.write_number(r, c, *n).unwrap();
                    }
                    Cell::Bool(b) => {
                        sheet.write_boolean(r, c, *b).unwrap();
                    }
                    Cell::Date(y, m, d) => {
                        let date = ExcelDateTime::from_ymd(*y, *m, *d).unwrap();
                        sheet
                            .write_datetime_with_format(r, c, &date, &date_format)
                            .unwrap();
                    }
                    Cell::Blank => {}
                }
            }
        }
    }

    workbook.save(path).unwrap();
}

/// Two sheets: People [Name, Date] and Orders [ID, Amount]
pub fn two_sheet_workbook(dir: &Path, file_name: &str) -> PathBuf {
    let path = dir.join(file_name);
    write_workbook(
        &path,
        vec![
            (
                "People",
                vec![
                    vec![Cell::Text("Name"), Cell::Text("Date")],
                    vec![Cell::Text("Ana"), Cell::Date(2024, 1, 15)],
                    vec![Cell::Text("Luis"), Cell::Date(2024, 2, 29)],
                ],
            ),
            (
                "Orders",
                vec![
                    vec![Cell::Text("ID"), Cell::Text("Amount")],
                    vec![Cell::Number(1.0), Cell::Number(19.99)],
                    vec![Cell::Number(2.0), Cell::Number(5.0)],
                ],
            ),
        ],
    );
    path
}

/// Generation client that records prompts and answers with a fixed reply
pub struct RecordingClient {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl RecordingClient {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for RecordingClient {
    async fn generate(&self, prompt: &str) -> ConvertResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(message) => Err(ConvertError::GenerationService(message.clone())),
        }
    }
}

/// A reply wrapping a valid document in conversational text
pub const WRAPPED_REPLY: &str = r#"Sure! Here is the JSON you asked for:
{
  "signature": "ventas",
  "type": "Excel",
  "Sections": [
    {"Name": "People", "Header": true, "USePosition": true,
     "Fields": [{"fName": "Name", "caption": "Name"}, {"fName": "Date", "caption": "Fecha"}]},
    {"Name": "Orders", "Header": true, "USePosition": true,
     "Fields": [{"fName": "ID", "caption": "ID"}, {"fName": "Amount", "caption": "Importe"}]}
  ]
}
Let me know if you need anything else."#;
