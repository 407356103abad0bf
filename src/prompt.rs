//! Prompt synthesis for the generation service
//!
//! Turns an [`ExtractedDocument`] into a single instruction string that embeds
//! an example of the target shape and the extracted structure itself.

use serde_json::{json, Value};

use crate::error::ConvertResult;
use crate::types::ExtractedDocument;

/// System-role persona sent ahead of every prompt
pub const SYSTEM_PERSONA: &str = "You are a helpful assistant.";

/// Example of the target shape, with descriptions in place of values
pub fn example_schema() -> Value {
    json!({
        "signature": "the file name goes here",
        "type": "the file type goes here",
        "Sections": [
            {
                "Name": "name of the sheet in the file",
                "Header": true,
                "USePosition": true,
                "Fields": [
                    {
                        "fName": "name of each column header goes here",
                        "caption": "caption for the column goes here"
                    }
                ]
            }
        ]
    })
}

/// Build the user-role instruction for `document`.
///
/// Deterministic: the same document always yields the same prompt.
pub fn synthesize(document: &ExtractedDocument) -> ConvertResult<String> {
    let schema = serde_json::to_string(&example_schema())?;
    let data = serde_json::to_string(document)?;

    Ok(format!(
        "Generate valid JSON following this schema: {schema} \
         using this data: {data}. \
         The output must be valid JSON. \
         Make sure to include every required property, especially a non-empty 'Sections' array, \
         and do not add properties that are not in the schema. \
         The value of 'type' must be 'Excel'."
    ))
}

/// Recover the embedded document from a prompt built by [`synthesize`]
pub fn embedded_document(prompt: &str) -> Option<ExtractedDocument> {
    let start = prompt.find("using this data: ")? + "using this data: ".len();
    let rest = &prompt[start..];
    let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<ExtractedDocument>();
    stream.next()?.ok()
}
