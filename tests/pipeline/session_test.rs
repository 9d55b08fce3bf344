//! Session state machine tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rhetoric_analyzer::pipeline::FAILURE_LEAD_IN;
use rhetoric_analyzer::providers::{DispatchError, TextGenerator};
use rhetoric_analyzer::session::{Session, SessionState};

use crate::{ScriptedGenerator, WHATABOUTISM_REPLY};

fn result_score(state: &SessionState) -> f64 {
    match state {
        SessionState::Result(result) => result.populism_score,
        other => panic!("expected result state, got {other:?}"),
    }
}

#[tokio::test]
async fn session_starts_idle() {
    let session = Session::new(Arc::new(ScriptedGenerator::replying(WHATABOUTISM_REPLY)));
    assert_eq!(session.state().await, SessionState::Idle);
}

#[tokio::test]
async fn successful_submit_ends_in_result() {
    let session = Session::new(Arc::new(ScriptedGenerator::replying(WHATABOUTISM_REPLY)));

    let state = session.submit("X is corrupt, Y is worse", "key").await;
    assert!((result_score(&state) - 75.0).abs() < f64::EPSILON);
    assert_eq!(session.state().await, state);
}

#[tokio::test]
async fn invalid_submit_goes_to_error_without_request() {
    let generator = Arc::new(ScriptedGenerator::replying(WHATABOUTISM_REPLY));
    let session = Session::new(generator.clone());

    let state = session.submit("text", "").await;
    assert_eq!(state, SessionState::Error("enter an API key".to_owned()));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn failed_submit_stores_user_message() {
    let session = Session::new(Arc::new(ScriptedGenerator::failing(DispatchError::Api {
        status: 500,
        body: "internal".to_owned(),
    })));

    match session.submit("text", "key").await {
        SessionState::Error(message) => {
            assert!(message.starts_with(FAILURE_LEAD_IN));
            assert!(message.contains("500"));
        }
        other => panic!("expected error state, got {other:?}"),
    }
}

#[tokio::test]
async fn error_state_is_re_enterable() {
    let session = Session::new(Arc::new(ScriptedGenerator::replying(WHATABOUTISM_REPLY)));

    assert!(session.submit("", "key").await.is_error());
    let state = session.submit("text", "key").await;
    assert!(!state.is_error());
    assert!((result_score(&state) - 75.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn new_result_replaces_previous_one() {
    let session = Session::new(Arc::new(RoutedGenerator::new(vec![
        ("first", Duration::ZERO, WHATABOUTISM_REPLY),
        ("second", Duration::ZERO, r#"{"populism_score": 5, "summary": "calm"}"#),
    ])));

    session.submit("first", "key").await;
    session.submit("second", "key").await;

    match session.state().await {
        SessionState::Result(result) => {
            assert!(result.tactics.is_empty());
            assert!(result.tone_analysis.is_empty());
            assert_eq!(result.summary, "calm");
        }
        other => panic!("expected result state, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn state_is_loading_while_request_in_flight() {
    let generator =
        ScriptedGenerator::replying(WHATABOUTISM_REPLY).after(Duration::from_secs(30));
    let session = Arc::new(Session::new(Arc::new(generator)));

    let in_flight = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit("text", "key").await })
    };

    let observed = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if session.state().await == SessionState::Loading {
                return true;
            }
            tokio::task::yield_now().await;
        }
    })
    .await;
    assert_eq!(observed, Ok(true));

    let finished = match in_flight.await {
        Ok(state) => state,
        Err(err) => panic!("submit task should finish: {err}"),
    };
    assert!(matches!(finished, SessionState::Result(_)));
    assert_eq!(session.state().await, finished);
}

/// Two overlapping submissions: whichever finishes last decides the state,
/// even if it was submitted first.
#[tokio::test(start_paused = true)]
async fn last_completion_wins() {
    let session = Arc::new(Session::new(Arc::new(RoutedGenerator::new(vec![
        ("slow", Duration::from_millis(200), r#"{"populism_score": 10}"#),
        ("fast", Duration::from_millis(20), r#"{"populism_score": 90}"#),
    ]))));

    let slow_task = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit("slow", "key").await })
    };
    tokio::time::sleep(Duration::from_millis(1)).await;

    let fast_state = session.submit("fast", "key").await;
    assert!((result_score(&fast_state) - 90.0).abs() < f64::EPSILON);
    assert!((result_score(&session.state().await) - 90.0).abs() < f64::EPSILON);

    let slow_state = match slow_task.await {
        Ok(state) => state,
        Err(err) => panic!("slow task should finish: {err}"),
    };
    assert!((result_score(&slow_state) - 10.0).abs() < f64::EPSILON);
    assert!((result_score(&session.state().await) - 10.0).abs() < f64::EPSILON);
}

/// Picks a reply and delay by the suffix of the prompt (the submitted text).
struct RoutedGenerator {
    routes: Vec<(&'static str, Duration, &'static str)>,
}

impl RoutedGenerator {
    fn new(routes: Vec<(&'static str, Duration, &'static str)>) -> Self {
        Self { routes }
    }
}

#[async_trait]
impl TextGenerator for RoutedGenerator {
    async fn generate(&self, prompt: &str, _credential: &str) -> Result<String, DispatchError> {
        let Some((_, delay, reply)) = self
            .routes
            .iter()
            .find(|(suffix, _, _)| prompt.ends_with(suffix))
        else {
            return Err(DispatchError::Envelope("no route".to_owned()));
        };
        tokio::time::sleep(*delay).await;
        Ok((*reply).to_owned())
    }

    fn model_id(&self) -> &str {
        "routed"
    }
}
