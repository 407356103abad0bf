//! Conversion pipeline
//!
//! extract → synthesize → generate → recover → (validate) → write.
//! Every stage failure ends the request; there are no retries and no
//! partial results.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{ConvertConfig, OUTPUT_FILE_NAME};
use crate::error::{ConvertError, ConvertResult};
use crate::excel::WorkbookExtractor;
use crate::llm::GenerationClient;
use crate::prompt;
use crate::recovery::recover_json;
use crate::types::{ExtractedDocument, GeneratedDocument};
use crate::validation::SchemaValidator;

/// Runs uploads through the full conversion
pub struct Converter {
    config: ConvertConfig,
    client: Arc<dyn GenerationClient>,
    validator: Option<SchemaValidator>,
}

impl Converter {
    /// Build a converter; compiles the schema when validation is enabled
    pub fn new(config: ConvertConfig, client: Arc<dyn GenerationClient>) -> ConvertResult<Self> {
        let validator = if config.validate_schema {
            Some(match &config.schema_path {
                Some(path) => SchemaValidator::from_file(path)?,
                None => SchemaValidator::target()?,
            })
        } else {
            None
        };

        Ok(Self {
            config,
            client,
            validator,
        })
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Read the workbook at `path`; `source_name` is the name the caller uploaded it as
    pub fn extract(path: &Path, source_name: &str) -> ConvertResult<ExtractedDocument> {
        let document = WorkbookExtractor::new(path).extract(source_name)?;
        info!(
            signature = %document.signature,
            sections = document.sections.len(),
            "Extracted workbook structure"
        );
        Ok(document)
    }

    /// Ask the generation service for a normalized document
    pub async fn generate(&self, document: &ExtractedDocument) -> ConvertResult<GeneratedDocument> {
        let prompt = prompt::synthesize(document)?;
        info!(prompt_len = prompt.len(), "Synthesized prompt");

        let reply = self.client.generate(&prompt).await?;

        let value = recover_json(&reply, self.config.recovery).inspect_err(|e| {
            warn!(error = %e, "Could not recover JSON from reply");
        })?;

        if let Some(validator) = &self.validator {
            validator.validate(&value)?;
        }

        let generated = GeneratedDocument::from_value(value)?;
        if let Some(count) = generated.section_count() {
            if count != document.sections.len() {
                warn!(
                    expected = document.sections.len(),
                    actual = count,
                    "Generated section count differs from workbook"
                );
            }
        }
        Ok(generated)
    }

    /// Extract off the async runtime, then generate
    pub async fn convert_file(&self, path: &Path, source_name: &str) -> ConvertResult<GeneratedDocument> {
        let owned_path = path.to_path_buf();
        let owned_name = source_name.to_string();
        let document = tokio::task::spawn_blocking(move || Self::extract(&owned_path, &owned_name))
            .await
            .map_err(|e| {
                ConvertError::UnreadableWorkbook(format!("Extraction task failed: {}", e))
            })??;

        self.generate(&document).await
    }

    /// Path the next output will be written to
    fn output_path(&self) -> PathBuf {
        if self.config.per_request_output {
            self.config
                .upload_dir
                .join(format!("output-{}.json", Uuid::new_v4()))
        } else {
            self.config.upload_dir.join(OUTPUT_FILE_NAME)
        }
    }

    /// Write `document` into the upload directory and return its path
    pub fn write_output(&self, document: &GeneratedDocument) -> ConvertResult<PathBuf> {
        self.write_rendered(&render_output(document)?)
    }

    /// Write already rendered output bytes and return their path
    pub fn write_rendered(&self, bytes: &[u8]) -> ConvertResult<PathBuf> {
        let path = self.output_path();
        write_json_atomic(&path, bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "Wrote output");
        Ok(path)
    }
}

/// Pretty JSON with 4-space indentation; non-ASCII is written as-is
pub fn render_output<T: Serialize>(value: &T) -> ConvertResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Write through a uniquely named sibling and rename into place
pub fn write_json_atomic(path: &Path, bytes: &[u8]) -> ConvertResult<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| OUTPUT_FILE_NAME.to_string());
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    std::fs::write(&tmp, bytes)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
