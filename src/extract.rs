//! Recovery of the structured analysis from a free-form model reply.
//!
//! Even with a JSON response type requested, models wrap the object in prose
//! or Markdown fences. Extraction is two explicit steps: locate the JSON
//! object span by brace scanning, then parse that span with `serde_json`.

use tracing::warn;

use crate::types::AnalysisResult;

/// Characters of the raw reply included in parse-failure logs.
const LOG_PREVIEW_CHARS: usize = 200;

/// Failure to recover an [`AnalysisResult`] from a reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The reply contains no `{ ... }` region at all.
    #[error("no structured data could be recovered from the model response")]
    NoJson,
    /// A region was found but did not parse.
    #[error("model response is not valid JSON: {0}")]
    Malformed(String),
}

/// Locate the JSON object embedded in `text`.
///
/// Scanning starts at the leftmost `{` and tracks brace depth, skipping
/// braces inside string literals. The span ends where depth returns to zero.
/// If the object never closes (typically truncated output) the greedy span
/// from the leftmost `{` to the rightmost `}` is returned instead.
pub fn locate_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let tail = text.get(start..)?;
    let end = match balanced_object_end(tail) {
        Some(end) => end,
        None => tail.rfind('}')?,
    };
    tail.get(..=end)
}

/// Byte offset of the `}` closing the object that opens at `text[0]`.
fn balanced_object_end(text: &str) -> Option<usize> {
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth = depth.checked_add(1)?,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Extract and parse the analysis from a raw model reply.
///
/// Missing fields fall back to empty values (see [`AnalysisResult`]).
///
/// # Errors
///
/// Returns [`ParseError::NoJson`] when no object span exists and
/// [`ParseError::Malformed`] with the parser message when the span is invalid.
pub fn extract_analysis(text: &str) -> Result<AnalysisResult, ParseError> {
    let Some(span) = locate_json_span(text) else {
        warn!(
            text_preview = %preview(text),
            "no JSON object in model response"
        );
        return Err(ParseError::NoJson);
    };

    serde_json::from_str::<AnalysisResult>(span).map_err(|e| {
        warn!(
            error = %e,
            text_preview = %preview(text),
            "failed to parse analysis JSON"
        );
        ParseError::Malformed(e.to_string())
    })
}

fn preview(text: &str) -> String {
    text.chars().take(LOG_PREVIEW_CHARS).collect()
}
