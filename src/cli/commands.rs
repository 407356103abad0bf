use crate::error::{ConvertError, ConvertResult};
use crate::excel::{signature_from_filename, SheetTable, WorkbookExtractor};
use crate::pipeline::{render_output, write_json_atomic, Converter};
use crate::prompt;
use crate::types::ExtractedDocument;
use crate::validation::SchemaValidator;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Name the workbook was given by its owner, used for the signature
fn source_name(input: &Path) -> String {
    input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Execute the extract command: print (or write) the structural document
pub fn extract(input: PathBuf, output: Option<PathBuf>, verbose: bool) -> ConvertResult<()> {
    let sheets = WorkbookExtractor::new(&input).read_sheets()?;

    if verbose {
        for sheet in &sheets {
            eprintln!(
                "   📊 Sheet: {} ({} columns, {} rows)",
                sheet.name.bright_blue(),
                sheet.columns.len(),
                sheet.row_count()
            );
            for column in &sheet.columns {
                eprintln!("      {} [{:?}]", column.header, column.kind);
            }
        }
    }

    let document = ExtractedDocument::new(
        signature_from_filename(&source_name(&input)),
        sheets.iter().map(SheetTable::to_section).collect(),
    );
    let rendered = render_output(&document)?;

    match output {
        Some(path) => {
            write_json_atomic(&path, &rendered)?;
            eprintln!("{}", "✅ Extraction complete".bold().green());
            eprintln!("   Sections: {}", document.sections.len());
            eprintln!("   Output:   {}", path.display());
        }
        None => println!("{}", String::from_utf8_lossy(&rendered)),
    }

    Ok(())
}

/// Execute the prompt command: print the instruction that would be sent
pub fn prompt(input: PathBuf) -> ConvertResult<()> {
    let document = WorkbookExtractor::new(&input).extract(&source_name(&input))?;
    println!("{}", prompt::synthesize(&document)?);
    Ok(())
}

/// Execute the convert command: full pipeline against the generation service
pub async fn convert(
    converter: &Converter,
    input: PathBuf,
    output: Option<PathBuf>,
) -> ConvertResult<()> {
    eprintln!("{}", "🔄 sheet2json - Convert".bold().green());
    eprintln!("   Input: {}", input.display());

    let generated = converter
        .convert_file(&input, &source_name(&input))
        .await?;

    let path = match output {
        Some(path) => {
            write_json_atomic(&path, &render_output(&generated)?)?;
            path
        }
        None => {
            converter.config().ensure_upload_dir()?;
            converter.write_output(&generated)?
        }
    };

    eprintln!("{}", "✅ Conversion complete".bold().green());
    if let Some(count) = generated.section_count() {
        eprintln!("   Sections: {}", count);
    }
    eprintln!("   Output:   {}", path.display());
    Ok(())
}

/// Execute the validate command against the target (or a custom) schema
pub fn validate(file: PathBuf, schema: Option<PathBuf>) -> ConvertResult<()> {
    let validator = match schema {
        Some(path) => SchemaValidator::from_file(&path)?,
        None => SchemaValidator::target()?,
    };

    let content = fs::read_to_string(&file)?;
    let instance: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| ConvertError::InvalidDocument(format!("{}: {}", file.display(), e)))?;

    match validator.validate(&instance) {
        Ok(()) => {
            println!("{} {}", "✅ Valid:".bold().green(), file.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "❌ Invalid:".bold().red(), file.display());
            Err(e)
        }
    }
}
