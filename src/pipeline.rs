//! The ingestion pipeline: validate, build prompt, dispatch, extract.
//!
//! Every failure along the way is folded into [`AnalysisError`], which knows
//! how to present itself to the user.

use tracing::{debug, info};

use crate::extract::{extract_analysis, ParseError};
use crate::prompt::{build_prompt, system_prompt};
use crate::providers::{DispatchError, TextGenerator};
use crate::types::AnalysisResult;

/// Lead-in shown before the diagnostic detail of any non-validation failure.
pub const FAILURE_LEAD_IN: &str =
    "Analysis failed or the response could not be decoded. Try again.";

/// Local input problems detected before any I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The text to analyze is blank.
    #[error("enter text to analyze")]
    EmptyText,
    /// The API key is blank.
    #[error("enter an API key")]
    EmptyCredential,
}

/// Any failure of one analysis round trip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// Input rejected locally; no request was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The dispatch failed (transport, API status, or envelope).
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    /// The reply did not contain a usable analysis.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl AnalysisError {
    /// Single user-visible message, with diagnostic detail appended.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            other => format!("{FAILURE_LEAD_IN} {other}"),
        }
    }

    /// HTTP status code for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Dispatch(DispatchError::Api { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

/// One validated analysis request. Built per user action.
#[derive(Clone)]
pub struct AnalysisRequest {
    raw_text: String,
    credential: String,
}

impl std::fmt::Debug for AnalysisRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisRequest")
            .field("raw_text", &self.raw_text)
            .field("credential", &"__REDACTED__")
            .finish()
    }
}

impl AnalysisRequest {
    /// Validate inputs. The text is kept verbatim; the credential is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the text or the credential is blank.
    /// The text is checked first.
    pub fn new(raw_text: &str, credential: &str) -> Result<Self, ValidationError> {
        if raw_text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(ValidationError::EmptyCredential);
        }
        Ok(Self {
            raw_text: raw_text.to_owned(),
            credential: credential.to_owned(),
        })
    }

    /// The user's text.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The API credential.
    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// The process-wide instruction template.
    pub fn prompt_template(&self) -> &'static str {
        system_prompt()
    }

    /// The composed outbound message.
    pub fn prompt(&self) -> String {
        build_prompt(&self.raw_text)
    }
}

/// Run one validated request through dispatch and extraction.
///
/// # Errors
///
/// Returns [`AnalysisError::Dispatch`] or [`AnalysisError::Parse`].
pub async fn analyze(
    generator: &dyn TextGenerator,
    request: AnalysisRequest,
) -> Result<AnalysisResult, AnalysisError> {
    let prompt = request.prompt();
    info!(
        model = %generator.model_id(),
        text_chars = request.raw_text().chars().count(),
        "analysis started"
    );

    let reply = generator.generate(&prompt, request.credential()).await?;
    debug!(reply_chars = reply.chars().count(), "model reply received");

    let result = extract_analysis(&reply)?;
    info!(
        score = result.populism_score,
        tactics = result.tactics.len(),
        "analysis complete"
    );
    Ok(result)
}

/// Validate raw inputs, then [`analyze`]. Validation failures never touch
/// the generator.
///
/// # Errors
///
/// Returns any [`AnalysisError`].
pub async fn analyze_text(
    generator: &dyn TextGenerator,
    raw_text: &str,
    credential: &str,
) -> Result<AnalysisResult, AnalysisError> {
    let request = AnalysisRequest::new(raw_text, credential)?;
    analyze(generator, request).await
}
