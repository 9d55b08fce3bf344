//! Session state container.
//!
//! Holds the single current state read by the renderer. Only [`Session::submit`]
//! writes it.
//!
//! Concurrent submissions are not coordinated: each one overwrites the state
//! when it completes, so the last completion wins regardless of submission
//! order. In-flight requests are never cancelled.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::pipeline::{self, AnalysisRequest};
use crate::providers::TextGenerator;
use crate::types::AnalysisResult;

/// What the user currently sees.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// Waiting for input. Initial state.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The last completed analysis.
    Result(AnalysisResult),
    /// The last failure, as a user-visible message.
    Error(String),
}

impl SessionState {
    /// Whether this state is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// One interactive session against a generator.
pub struct Session {
    generator: Arc<dyn TextGenerator>,
    state: RwLock<SessionState>,
}

impl Session {
    /// Start a session in [`SessionState::Idle`].
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            state: RwLock::new(SessionState::Idle),
        }
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Submit text for analysis and return the state it settled in.
    ///
    /// Invalid input moves straight to [`SessionState::Error`] without a
    /// request. Otherwise the state passes through [`SessionState::Loading`]
    /// and ends in `Result` or `Error`. The previous result is replaced, never
    /// merged.
    pub async fn submit(&self, raw_text: &str, credential: &str) -> SessionState {
        let next = match AnalysisRequest::new(raw_text, credential) {
            Ok(request) => {
                self.set(SessionState::Loading).await;
                match pipeline::analyze(self.generator.as_ref(), request).await {
                    Ok(result) => SessionState::Result(result),
                    Err(e) => {
                        warn!(error = %e, status = ?e.status(), "analysis failed");
                        SessionState::Error(e.user_message())
                    }
                }
            }
            Err(e) => SessionState::Error(e.to_string()),
        };

        self.set(next.clone()).await;
        next
    }

    async fn set(&self, state: SessionState) {
        *self.state.write().await = state;
    }
}
