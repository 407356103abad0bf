//! Runtime configuration
//!
//! Everything the pipeline needs is carried in these structs and handed to
//! components at construction. Nothing reads process state after startup.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConvertError, ConvertResult};
use crate::recovery::RecoveryStrategy;

/// Environment variable holding the generation-service credential
pub const API_KEY_ENV: &str = "OPENAI_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Name of the output file written after each conversion
pub const OUTPUT_FILE_NAME: &str = "output.json";

/// Generation service connection settings
#[derive(Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl GenerationConfig {
    /// Settings with defaults for everything but the credential
    pub fn new(api_key: impl Into<String>) -> ConvertResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConvertError::Config(format!(
                "{} must be set to a non-empty API key",
                API_KEY_ENV
            )));
        }
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full chat-completions endpoint URL
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

// Keep the key out of logs
impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Pipeline settings shared by the CLI and the API server
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Directory for saved uploads and the output file
    pub upload_dir: PathBuf,
    pub recovery: RecoveryStrategy,
    /// Run the generated document through the schema validator
    pub validate_schema: bool,
    /// Custom JSON Schema file; the built-in target schema is used when unset
    pub schema_path: Option<PathBuf>,
    /// Write `output-<uuid>.json` instead of overwriting `output.json`
    pub per_request_output: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            recovery: RecoveryStrategy::Greedy,
            validate_schema: false,
            schema_path: None,
            per_request_output: false,
        }
    }
}

impl ConvertConfig {
    /// Create the upload directory if it does not exist
    pub fn ensure_upload_dir(&self) -> ConvertResult<()> {
        std::fs::create_dir_all(&self.upload_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_defaults() {
        let config = GenerationConfig::new("sk-test").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(
            config.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_generation_rejects_empty_key() {
        let err = GenerationConfig::new("  ").unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_generation_builders() {
        let config = GenerationConfig::new("k")
            .unwrap()
            .with_base_url("http://localhost:9000/v1/")
            .with_model("gpt-4o-mini")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(
            config.completions_url(),
            "http://localhost:9000/v1/chat/completions"
        );
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_debug_hides_key() {
        let config = GenerationConfig::new("sk-secret").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn test_convert_defaults() {
        let config = ConvertConfig::default();
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.recovery, RecoveryStrategy::Greedy);
        assert!(!config.validate_schema);
        assert!(!config.per_request_output);
    }

    #[test]
    fn test_ensure_upload_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = ConvertConfig {
            upload_dir: temp.path().join("nested").join("uploads"),
            ..Default::default()
        };
        config.ensure_upload_dir().unwrap();
        assert!(config.upload_dir.is_dir());
    }
}
