//! Gemini provider implementation using the `generateContent` API.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{check_http_response, DispatchError, TextGenerator};

/// Default Gemini API base URL.
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model identifier.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

/// MIME type requested for the model's reply.
const JSON_MIME_TYPE: &str = "application/json";

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// `generateContent` request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// Conversation contents; always a single user turn.
    pub contents: Vec<GeminiContent>,
    /// Output constraints.
    pub generation_config: GenerationConfig,
}

/// One content block of a request.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct GeminiContent {
    /// Text parts.
    pub parts: Vec<GeminiPart>,
}

/// A text part, shared by request and response.
#[doc(hidden)]
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    /// Text payload. Absent on non-text parts in responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Generation configuration.
#[doc(hidden)]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Requested output MIME type.
    pub response_mime_type: String,
}

/// `generateContent` response envelope.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    /// Generated candidates.
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    /// Present when the prompt itself was blocked.
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// One generated candidate.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    /// Candidate content; missing when generation was cut off by safety filters.
    #[serde(default)]
    pub content: Option<GeminiCandidateContent>,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Content of a candidate.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct GeminiCandidateContent {
    /// Content parts.
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// Feedback about the prompt.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Block reason, if the prompt was rejected.
    #[serde(default)]
    pub block_reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    model: String,
    base_url: String,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client for `model` against `base_url`.
    pub fn new(model: String, base_url: String) -> Self {
        Self {
            model,
            base_url,
            timeout: None,
            client: reqwest::Client::new(),
        }
    }

    /// Abort requests that take longer than `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Full `generateContent` URL, without the credential.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build a request carrying `prompt` as the single user part.
#[doc(hidden)]
pub fn build_request(prompt: &str) -> GeminiRequest {
    GeminiRequest {
        contents: vec![GeminiContent {
            parts: vec![GeminiPart {
                text: Some(prompt.to_owned()),
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: JSON_MIME_TYPE.to_owned(),
        },
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a response body.
///
/// # Errors
///
/// Returns `DispatchError::Envelope` naming the first missing element, or the
/// prompt block reason when the endpoint refused the prompt.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<String, DispatchError> {
    let resp: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| DispatchError::Envelope(format!("response is not valid JSON: {e}")))?;

    let blocked = resp
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason);

    let Some(candidate) = resp.candidates.into_iter().next() else {
        return Err(DispatchError::Envelope(match blocked {
            Some(reason) => format!("prompt blocked: {reason}"),
            None => "missing candidates[0]".to_owned(),
        }));
    };

    let finish_reason = candidate.finish_reason;
    let content = candidate.content.ok_or_else(|| {
        DispatchError::Envelope(match finish_reason.as_deref() {
            Some(reason) => format!("missing candidates[0].content (finish reason {reason})"),
            None => "missing candidates[0].content".to_owned(),
        })
    })?;

    content
        .parts
        .into_iter()
        .next()
        .ok_or_else(|| {
            DispatchError::Envelope("missing candidates[0].content.parts[0]".to_owned())
        })?
        .text
        .ok_or_else(|| {
            DispatchError::Envelope("missing candidates[0].content.parts[0].text".to_owned())
        })
}

// ---------------------------------------------------------------------------
// Trait impl
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, credential: &str) -> Result<String, DispatchError> {
        let api_request = build_request(prompt);

        debug!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            "dispatching generateContent"
        );

        let mut request = self
            .client
            .post(self.endpoint())
            .query(&[("key", credential)])
            .header("content-type", "application/json")
            .json(&api_request);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        debug!(status = response.status().as_u16(), "generateContent responded");

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
