//! sheet2json - spreadsheet structure to normalized JSON
//!
//! Reads a workbook, describes its sheets and column headers, asks a
//! chat-completion service to produce a normalized JSON layout and recovers
//! that JSON from the reply.
//!
//! # Pipeline
//!
//! - [`excel`]: workbook → [`ExtractedDocument`]
//! - [`prompt`]: document → instruction text
//! - [`llm`]: instruction → raw reply
//! - [`recovery`]: raw reply → JSON object
//! - [`validation`]: optional JSON Schema check
//! - [`pipeline`]: the stages above plus the output writer
//!
//! # Example
//!
//! ```no_run
//! use sheet2json::excel::WorkbookExtractor;
//! use sheet2json::prompt;
//!
//! let document = WorkbookExtractor::new("report.xlsx").extract("report.xlsx")?;
//! println!("Sections: {}", document.sections.len());
//! println!("{}", prompt::synthesize(&document)?);
//! # Ok::<(), sheet2json::error::ConvertError>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod excel;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod recovery;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use error::{ConvertError, ConvertResult};
pub use types::{DocumentType, ExtractedDocument, Field, GeneratedDocument, Section};
