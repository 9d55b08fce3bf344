//! Request dispatch to the external text-generation endpoint.
//!
//! Defines the [`TextGenerator`] trait, the [`DispatchError`] taxonomy and the
//! HTTP helpers shared by generator implementations.
//!
//! One generator is implemented:
//! - [`gemini::GeminiClient`]: Google Gemini `generateContent` API

use async_trait::async_trait;
use regex::Regex;

pub mod gemini;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Classified failures of a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// No response was obtained (connection failure, timeout, unreadable body).
    #[error("transport error: {0}")]
    Transport(String),
    /// The endpoint answered with a non-success status.
    #[error("API Error: {status}{}", format_error_body(.body))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized, truncated response body.
        body: String,
    },
    /// Success status, but the response envelope did not have the expected shape.
    #[error("unexpected response envelope: {0}")]
    Envelope(String),
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the credential as a query parameter.
        let err = err.without_url();
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

fn format_error_body(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" ({body})")
    }
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Check HTTP response status and return body text or a classified error.
///
/// # Errors
///
/// Returns `DispatchError::Transport` if the body cannot be read and
/// `DispatchError::Api` on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, DispatchError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(DispatchError::Api {
            status: status.as_u16(),
            body: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

fn sanitize_http_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [
        r"AIza[A-Za-z0-9_\-]{20,}",
        r"sk-[A-Za-z0-9]{32,}",
        r"ya29\.[A-Za-z0-9_\-]{20,}",
    ] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A text-generation endpoint that turns one prompt into one raw reply.
///
/// Implementations must be `Send + Sync` so a session can be shared across
/// tasks.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send `prompt` with `credential` and return the first candidate's text.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] on transport, status, or envelope failure.
    async fn generate(&self, prompt: &str, credential: &str) -> Result<String, DispatchError>;

    /// The model identifier this generator targets.
    fn model_id(&self) -> &str;
}
