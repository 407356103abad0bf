//! Workbook extraction tests

mod common;

use common::{two_sheet_workbook, write_workbook, Cell};
use pretty_assertions::assert_eq;
use sheet2json::error::ConvertError;
use sheet2json::excel::{signature_from_filename, ColumnKind, WorkbookExtractor};
use sheet2json::types::{DocumentType, ExtractedDocument};
use tempfile::TempDir;

// ═══════════════════════════════════════════════════════════════════════════
// SECTIONS AND FIELDS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_one_section_per_sheet_in_order() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("three.xlsx");
    write_workbook(
        &path,
        vec![
            ("Zeta", vec![vec![Cell::Text("z")]]),
            ("Alpha", vec![vec![Cell::Text("a")]]),
            ("Mid", vec![vec![Cell::Text("m")]]),
        ],
    );

    let doc = WorkbookExtractor::new(&path).extract("three.xlsx").unwrap();
    let names: Vec<&str> = doc.sections.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
}

#[test]
fn test_two_sheet_fields_in_column_order() {
    let temp = TempDir::new().unwrap();
    let path = two_sheet_workbook(temp.path(), "ventas.xlsx");

    let doc = WorkbookExtractor::new(&path).extract("ventas.xlsx").unwrap();

    assert_eq!(doc.signature, "ventas");
    assert_eq!(doc.doc_type, DocumentType::Excel);
    assert_eq!(doc.sections.len(), 2);
    assert_eq!(doc.sections[0].field_names(), vec!["Name", "Date"]);
    assert_eq!(doc.sections[1].field_names(), vec!["ID", "Amount"]);

    for section in &doc.sections {
        assert!(section.header);
        assert!(section.use_position);
        for field in &section.fields {
            assert_eq!(field.field_name, field.caption);
        }
    }
}

#[test]
fn test_wide_sheet_keeps_physical_column_order() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("wide.xlsx");
    let headers = ["h", "g", "f", "e", "d", "c", "b", "a"];
    write_workbook(
        &path,
        vec![("Wide", vec![headers.iter().map(|h| Cell::Text(*h)).collect()])],
    );

    let doc = WorkbookExtractor::new(&path).extract("wide.xlsx").unwrap();
    assert_eq!(doc.sections[0].field_names(), headers.to_vec());
}

#[test]
fn test_empty_sheet_has_no_fields() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("blank.xlsx");
    write_workbook(
        &path,
        vec![
            ("Data", vec![vec![Cell::Text("A")]]),
            ("Empty", vec![]),
        ],
    );

    let doc = WorkbookExtractor::new(&path).extract("blank.xlsx").unwrap();
    assert_eq!(doc.sections.len(), 2);
    assert_eq!(doc.sections[1].name, "Empty");
    assert!(doc.sections[1].fields.is_empty());
}

#[test]
fn test_blank_and_duplicate_headers() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dupes.xlsx");
    write_workbook(
        &path,
        vec![(
            "Sheet1",
            vec![
                vec![
                    Cell::Text("Total"),
                    Cell::Blank,
                    Cell::Text("Total"),
                    Cell::Number(2024.0),
                ],
                vec![
                    Cell::Number(1.0),
                    Cell::Number(2.0),
                    Cell::Number(3.0),
                    Cell::Number(4.0),
                ],
            ],
        )],
    );

    let doc = WorkbookExtractor::new(&path).extract("dupes.xlsx").unwrap();
    assert_eq!(
        doc.sections[0].field_names(),
        vec!["Total", "Unnamed: 1", "Total.1", "2024"]
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// COLUMN VALUES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_date_columns_are_text() {
    let temp = TempDir::new().unwrap();
    let path = two_sheet_workbook(temp.path(), "dates.xlsx");

    let sheets = WorkbookExtractor::new(&path).read_sheets().unwrap();
    let date_column = &sheets[0].columns[1];

    assert_eq!(date_column.header, "Date");
    assert_eq!(date_column.kind, ColumnKind::DateTime);
    assert!(date_column.values.iter().all(|v| v.is_string()));
    assert_eq!(date_column.values[0], "2024-01-15 00:00:00");
    assert_eq!(date_column.values[1], "2024-02-29 00:00:00");
}

#[test]
fn test_no_temporal_value_escapes_as_non_string() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("mixed.xlsx");
    write_workbook(
        &path,
        vec![(
            "Mixed",
            vec![
                vec![Cell::Text("When"), Cell::Text("Flag")],
                vec![Cell::Date(2023, 12, 31), Cell::Bool(true)],
                vec![Cell::Text("soon"), Cell::Bool(false)],
            ],
        )],
    );

    let sheets = WorkbookExtractor::new(&path).read_sheets().unwrap();
    let when = &sheets[0].columns[0];
    assert_eq!(when.kind, ColumnKind::Mixed);
    assert_eq!(when.values[0], "2023-12-31 00:00:00");
    assert_eq!(when.values[1], "soon");
    assert_eq!(sheets[0].columns[1].kind, ColumnKind::Boolean);
}

#[test]
fn test_numeric_columns() {
    let temp = TempDir::new().unwrap();
    let path = two_sheet_workbook(temp.path(), "nums.xlsx");

    let sheets = WorkbookExtractor::new(&path).read_sheets().unwrap();
    let orders = &sheets[1];
    assert_eq!(orders.row_count(), 2);
    assert_eq!(orders.columns[0].kind, ColumnKind::Number);
    assert_eq!(orders.columns[1].values[0], 19.99);
}

// ═══════════════════════════════════════════════════════════════════════════
// SIGNATURE, ROUND TRIP, FAILURES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_signature_splits_on_first_dot() {
    // Multi-dot names lose everything after the first dot
    assert_eq!(signature_from_filename("report.v2.xlsx"), "report");
}

#[test]
fn test_signature_uses_source_name_not_stored_path() {
    let temp = TempDir::new().unwrap();
    let path = two_sheet_workbook(temp.path(), "0b7c-stored.xlsx");
    let doc = WorkbookExtractor::new(&path).extract("Informe Anual.xlsx").unwrap();
    assert_eq!(doc.signature, "Informe Anual");
}

#[test]
fn test_extracted_document_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = two_sheet_workbook(temp.path(), "round.xlsx");

    let doc = WorkbookExtractor::new(&path).extract("round.xlsx").unwrap();
    let decoded = ExtractedDocument::from_json(&doc.to_json().unwrap()).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_missing_file_is_unreadable() {
    let err = WorkbookExtractor::new("/nonexistent/book.xlsx")
        .extract("book.xlsx")
        .unwrap_err();
    assert!(matches!(err, ConvertError::UnreadableWorkbook(_)));
}

#[test]
fn test_garbage_file_is_unreadable() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("fake.xlsx");
    std::fs::write(&path, b"this is not a zip archive").unwrap();

    let err = WorkbookExtractor::new(&path).extract("fake.xlsx").unwrap_err();
    assert!(matches!(err, ConvertError::UnreadableWorkbook(_)));
    assert_eq!(err.stage(), "extraction");
}

#[test]
fn test_unknown_extension_is_unreadable() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("notes.txt");
    std::fs::write(&path, b"a,b,c").unwrap();

    let err = WorkbookExtractor::new(&path).extract("notes.txt").unwrap_err();
    assert!(matches!(err, ConvertError::UnreadableWorkbook(_)));
}
