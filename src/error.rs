use thiserror::Error;

pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Unreadable workbook: {0}")]
    UnreadableWorkbook(String),

    #[error("Generation service error: {0}")]
    GenerationService(String),

    #[error("No JSON found in response text")]
    NoJsonFound,

    #[error("Malformed JSON in response: {message} (extracted: {fragment})")]
    MalformedJson { fragment: String, message: String },

    #[error("Schema validation failed:\n{0}")]
    SchemaViolation(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConvertError {
    /// Pipeline stage the error belongs to, used for user-facing messages
    pub fn stage(&self) -> &'static str {
        match self {
            ConvertError::UnreadableWorkbook(_) => "extraction",
            ConvertError::GenerationService(_) => "generation",
            ConvertError::NoJsonFound | ConvertError::MalformedJson { .. } => "recovery",
            ConvertError::SchemaViolation(_) => "validation",
            ConvertError::InvalidDocument(_) => "document",
            ConvertError::Config(_) => "configuration",
            ConvertError::Io(_) | ConvertError::Json(_) => "output",
        }
    }
}
