use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConvertError, ConvertResult};

//==============================================================================
// Extracted Document (workbook structure)
//==============================================================================

/// Source type of an extracted document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DocumentType {
    /// Spreadsheet workbook (the only supported source)
    #[default]
    Excel,
}

/// One column of a sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Field {
    #[serde(rename = "fName")]
    pub field_name: String,
    pub caption: String,
}

impl Field {
    /// Build a field whose name and caption are both the column header
    pub fn from_header(header: impl Into<String>) -> Self {
        let header = header.into();
        Self {
            field_name: header.clone(),
            caption: header,
        }
    }
}

/// One sheet of a workbook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Section {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Header")]
    pub header: bool,
    #[serde(rename = "USePosition")]
    pub use_position: bool,
    #[serde(rename = "Fields")]
    pub fields: Vec<Field>,
}

impl Section {
    /// Create a section with the fixed header/position flags
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header: true,
            use_position: true,
            fields: Vec::new(),
        }
    }

    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Field names in column order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.field_name.as_str()).collect()
    }
}

/// Structural description of a workbook, built once per upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractedDocument {
    pub signature: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(rename = "Sections")]
    pub sections: Vec<Section>,
}

impl ExtractedDocument {
    pub fn new(signature: impl Into<String>, sections: Vec<Section>) -> Self {
        Self {
            signature: signature.into(),
            doc_type: DocumentType::Excel,
            sections,
        }
    }

    /// Decode from JSON, rejecting missing or unknown properties
    pub fn from_json(json: &str) -> ConvertResult<Self> {
        serde_json::from_str(json).map_err(|e| ConvertError::InvalidDocument(e.to_string()))
    }

    pub fn to_json(&self) -> ConvertResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

//==============================================================================
// Generated Document (model output)
//==============================================================================

/// JSON object produced by the generation service.
///
/// The shape is expected to mirror [`ExtractedDocument`] but is not enforced;
/// use [`GeneratedDocument::to_extracted`] for a strict typed view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedDocument(Map<String, Value>);

impl GeneratedDocument {
    /// Accept any JSON object; reject arrays and scalars
    pub fn from_value(value: Value) -> ConvertResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ConvertError::InvalidDocument(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Number of entries in the `Sections` array, if present
    pub fn section_count(&self) -> Option<usize> {
        self.0
            .get("Sections")
            .and_then(Value::as_array)
            .map(Vec::len)
    }

    /// Strict conversion into the extracted-document shape
    pub fn to_extracted(&self) -> ConvertResult<ExtractedDocument> {
        serde_json::from_value(self.to_value())
            .map_err(|e| ConvertError::InvalidDocument(e.to_string()))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
