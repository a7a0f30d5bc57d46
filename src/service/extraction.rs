//! JSON extraction from free-form model output
//!
//! Models are asked to answer with a JSON object but routinely wrap it in
//! prose or markdown. Candidates are located in this order:
//!
//! 1. The first ```` ```json ```` fenced block.
//! 2. A brace span in the remaining text, either the greedy first-`{` to
//!    last-`}` span or, with [`BraceStrategy::Balanced`], each balanced
//!    top-level object in turn (braces inside string literals are ignored).
//!
//! The input text is never modified.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json[ \t]*\r?\n(.*?)\r?\n[ \t]*```").unwrap());
static LEADING_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^```(?:json)?\s*").unwrap());
static TRAILING_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*```$").unwrap());

/// How a JSON object is located when the output has no fenced block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BraceStrategy {
    /// First `{` through last `}`. Trailing braces in prose break it.
    #[default]
    Greedy,
    /// Balanced scan that tracks string literals
    Balanced,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractionOptions {
    pub brace_strategy: BraceStrategy,
    /// Strip a fence marker at the very start and end of the text before the brace search
    pub strip_outer_fences: bool,
}

impl ExtractionOptions {
    pub fn new(brace_strategy: BraceStrategy) -> Self {
        Self {
            brace_strategy,
            strip_outer_fences: false,
        }
    }

    pub fn strip_outer_fences(mut self) -> Self {
        self.strip_outer_fences = true;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("no JSON object found in model response")]
    NotFound,

    /// The candidate is kept for logging only and must not reach clients
    #[error("Failed to parse model JSON: {message}")]
    Parse { message: String, candidate: String },

    /// The serde detail quotes model values, so it is logged and not displayed
    #[error("Model JSON does not match the expected shape")]
    Schema { detail: String },
}

impl ExtractionError {
    /// Raw candidate text, for diagnostics
    pub fn candidate(&self) -> Option<&str> {
        match self {
            ExtractionError::Parse { candidate, .. } => Some(candidate),
            _ => None,
        }
    }

    /// Deserializer message for a shape mismatch, for diagnostics
    pub fn schema_detail(&self) -> Option<&str> {
        match self {
            ExtractionError::Schema { detail } => Some(detail),
            _ => None,
        }
    }
}

/// Extract and deserialize the JSON object in `text`
pub fn extract<T: DeserializeOwned>(
    text: &str,
    options: ExtractionOptions,
) -> Result<T, ExtractionError> {
    let value = extract_json(text, options)?;
    serde_json::from_value(value).map_err(|e| ExtractionError::Schema {
        detail: e.to_string(),
    })
}

/// Read a number that the model may have written as a number or a numeric
/// string. Anything else becomes `None` instead of failing the whole object.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite()))
}

/// Extract the JSON value in `text`
pub fn extract_json(text: &str, options: ExtractionOptions) -> Result<Value, ExtractionError> {
    let candidates = find_candidates(text, options);
    let Some(first) = candidates.first() else {
        return Err(ExtractionError::NotFound);
    };

    let mut first_error = None;
    for candidate in &candidates {
        match serde_json::from_str::<Value>(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    Err(ExtractionError::Parse {
        message: first_error.map(|e| e.to_string()).unwrap_or_default(),
        candidate: first.to_string(),
    })
}

/// Candidate JSON substrings of `text`, most likely first
pub fn find_candidates(text: &str, options: ExtractionOptions) -> Vec<&str> {
    if let Some(fenced) = FENCED_JSON.captures(text).and_then(|c| c.get(1)) {
        return vec![fenced.as_str()];
    }

    let body = if options.strip_outer_fences {
        strip_outer_fences(text)
    } else {
        text
    };

    match options.brace_strategy {
        BraceStrategy::Greedy => greedy_span(body).into_iter().collect(),
        BraceStrategy::Balanced => balanced_spans(body),
    }
}

/// Remove a fence marker opening and closing the (trimmed) text
fn strip_outer_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let start = LEADING_FENCE.find(trimmed).map_or(0, |m| m.end());
    let rest = &trimmed[start..];
    let end = TRAILING_FENCE.find(rest).map_or(rest.len(), |m| m.start());
    &rest[..end]
}

fn greedy_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn balanced_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if depth == 0 {
            if c == '{' {
                depth = 1;
                start = i;
            }
            continue;
        }

        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    spans.push(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    spans
}
