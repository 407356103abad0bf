//! JSON recovery from free-text model replies
//!
//! Model replies often wrap the JSON payload in conversational text
//! ("Sure! Here is your JSON: {...} Hope that helps."). Two strategies pull
//! the object back out:
//!
//! - [`RecoveryStrategy::Greedy`]: everything from the first `{` to the last
//!   `}`. Several independent objects in one reply produce an over-broad span
//!   that fails to decode.
//! - [`RecoveryStrategy::Balanced`]: the first brace-balanced object that
//!   decodes, skipping braces inside string literals.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ConvertError, ConvertResult};

/// How to locate the JSON object inside a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryStrategy {
    #[default]
    Greedy,
    Balanced,
}

fn greedy_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("static regex is valid"))
}

/// Recover a JSON object from `text` with the given strategy
pub fn recover_json(text: &str, strategy: RecoveryStrategy) -> ConvertResult<Value> {
    match strategy {
        RecoveryStrategy::Greedy => recover_greedy(text),
        RecoveryStrategy::Balanced => recover_balanced(text),
    }
}

/// Decode the span from the first `{` to the last `}`
pub fn recover_greedy(text: &str) -> ConvertResult<Value> {
    let Some(span) = greedy_pattern().find(text) else {
        debug!(response = %text, "No JSON span in response text");
        return Err(ConvertError::NoJsonFound);
    };
    decode_span(span.as_str())
}

/// Decode the first brace-balanced object in `text`.
///
/// Candidates that balance but fail to decode are skipped; if none decode,
/// the error for the first candidate is returned.
pub fn recover_balanced(text: &str) -> ConvertResult<Value> {
    let mut first_error = None;
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        match balanced_end(&text[start..]) {
            Some(len) => {
                let candidate = &text[start..start + len];
                match decode_span(candidate) {
                    Ok(value) => return Ok(value),
                    Err(e) => {
                        first_error.get_or_insert(e);
                    }
                }
            }
            None => {}
        }
        search_from = start + 1;
    }

    Err(first_error.unwrap_or(ConvertError::NoJsonFound))
}

/// Byte length of the balanced object starting at `s[0] == '{'`
fn balanced_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in s.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn decode_span(span: &str) -> ConvertResult<Value> {
    serde_json::from_str(span).map_err(|e| {
        warn!(error = %e, "Extracted span is not valid JSON");
        debug!(fragment = %span, "Rejected JSON fragment");
        ConvertError::MalformedJson {
            fragment: span.to_string(),
            message: e.to_string(),
        }
    })
}
