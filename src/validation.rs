//! Optional JSON Schema check for generated documents

use std::path::Path;

use jsonschema::JSONSchema;
use serde_json::{json, Value};

use crate::error::{ConvertError, ConvertResult};

/// Target schema for generated documents
pub fn target_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Spreadsheet layout",
        "type": "object",
        "required": ["signature", "type", "Sections"],
        "additionalProperties": false,
        "properties": {
            "signature": {"type": "string"},
            "type": {"const": "Excel"},
            "Sections": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "required": ["Name", "Header", "USePosition", "Fields"],
                    "additionalProperties": false,
                    "properties": {
                        "Name": {"type": "string"},
                        "Header": {"type": "boolean"},
                        "USePosition": {"type": "boolean"},
                        "Fields": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "required": ["fName", "caption"],
                                "additionalProperties": false,
                                "properties": {
                                    "fName": {"type": "string"},
                                    "caption": {"type": "string"}
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}

/// Compiled JSON Schema
pub struct SchemaValidator {
    compiled: JSONSchema,
}

impl SchemaValidator {
    pub fn new(schema: &Value) -> ConvertResult<Self> {
        let compiled = JSONSchema::compile(schema)
            .map_err(|e| ConvertError::Config(format!("Failed to compile schema: {}", e)))?;
        Ok(Self { compiled })
    }

    /// Validator for the built-in target schema
    pub fn target() -> ConvertResult<Self> {
        Self::new(&target_schema())
    }

    /// Load a schema from a JSON file
    pub fn from_file(path: &Path) -> ConvertResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let schema: Value = serde_json::from_str(&content).map_err(|e| {
            ConvertError::Config(format!("Failed to parse schema {}: {}", path.display(), e))
        })?;
        Self::new(&schema)
    }

    /// `Ok(())` when `instance` conforms, `SchemaViolation` listing every error otherwise
    pub fn validate(&self, instance: &Value) -> ConvertResult<()> {
        if let Err(errors) = self.compiled.validate(instance) {
            let error_messages: Vec<String> = errors
                .map(|e| format!("  - {} (at '{}')", e, e.instance_path))
                .collect();
            return Err(ConvertError::SchemaViolation(error_messages.join("\n")));
        }
        Ok(())
    }

    pub fn is_valid(&self, instance: &Value) -> bool {
        self.compiled.is_valid(instance)
    }
}
