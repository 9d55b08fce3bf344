//! Validation gate, error taxonomy and user messages.

use rhetoric_analyzer::extract::ParseError;
use rhetoric_analyzer::pipeline::{
    analyze, analyze_text, AnalysisError, AnalysisRequest, ValidationError, FAILURE_LEAD_IN,
};
use rhetoric_analyzer::prompt::system_prompt;
use rhetoric_analyzer::providers::DispatchError;

use crate::{ScriptedGenerator, WHATABOUTISM_REPLY};

#[test]
fn request_rejects_blank_text_before_credential() {
    assert_eq!(
        AnalysisRequest::new("   \n\t", "").map(|_| ()),
        Err(ValidationError::EmptyText)
    );
    assert_eq!(
        AnalysisRequest::new("text", "  ").map(|_| ()),
        Err(ValidationError::EmptyCredential)
    );
}

#[test]
fn request_keeps_text_verbatim_and_trims_credential() {
    let request = AnalysisRequest::new("  spaced text \n", " key-1 \n").expect("valid request");
    assert_eq!(request.raw_text(), "  spaced text \n");
    assert_eq!(request.credential(), "key-1");
    assert_eq!(request.prompt_template(), system_prompt());
    assert!(request.prompt().ends_with("  spaced text \n"));
}

#[test]
fn request_debug_redacts_credential() {
    let request = AnalysisRequest::new("text", "super-secret").expect("valid request");
    let debug = format!("{request:?}");
    assert!(!debug.contains("super-secret"));
    assert!(debug.contains("__REDACTED__"));
}

#[tokio::test]
async fn empty_text_never_reaches_the_generator() {
    let generator = ScriptedGenerator::replying(WHATABOUTISM_REPLY);

    let err = analyze_text(&generator, "", "key")
        .await
        .expect_err("empty text must fail");
    assert_eq!(err, AnalysisError::Validation(ValidationError::EmptyText));
    assert_eq!(err.user_message(), "enter text to analyze");
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn empty_credential_never_reaches_the_generator() {
    let generator = ScriptedGenerator::replying(WHATABOUTISM_REPLY);

    let err = analyze_text(&generator, "some text", "")
        .await
        .expect_err("empty key must fail");
    assert_eq!(err.user_message(), "enter an API key");
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn analyze_sends_composed_prompt() {
    let generator = ScriptedGenerator::replying(WHATABOUTISM_REPLY);
    let request = AnalysisRequest::new("X is corrupt, Y is worse", "key").expect("valid");
    let expected_prompt = request.prompt();

    let result = analyze(&generator, request).await.expect("should succeed");
    assert_eq!(result.tactics.len(), 1);
    assert_eq!(generator.calls(), 1);
    assert_eq!(generator.last_prompt(), Some(expected_prompt));
}

#[tokio::test]
async fn api_status_propagates_into_user_message() {
    let generator = ScriptedGenerator::failing(DispatchError::Api {
        status: 429,
        body: String::new(),
    });

    let err = analyze_text(&generator, "text", "key")
        .await
        .expect_err("429 must fail");
    assert_eq!(err.status(), Some(429));
    let message = err.user_message();
    assert!(message.starts_with(FAILURE_LEAD_IN));
    assert!(message.contains("429"));
}

#[tokio::test]
async fn parse_failure_message_includes_parser_detail() {
    let generator = ScriptedGenerator::replying("I cannot help with that.");

    let err = analyze_text(&generator, "text", "key")
        .await
        .expect_err("prose must fail");
    assert_eq!(err, AnalysisError::Parse(ParseError::NoJson));
    assert_eq!(err.status(), None);
    assert!(err.user_message().contains("no structured data"));
}

#[tokio::test]
async fn envelope_and_transport_errors_are_distinct() {
    let envelope = analyze_text(
        &ScriptedGenerator::failing(DispatchError::Envelope("missing candidates[0]".to_owned())),
        "text",
        "key",
    )
    .await
    .expect_err("envelope error");
    let transport = analyze_text(
        &ScriptedGenerator::failing(DispatchError::Transport("connection refused".to_owned())),
        "text",
        "key",
    )
    .await
    .expect_err("transport error");

    assert!(matches!(envelope, AnalysisError::Dispatch(DispatchError::Envelope(_))));
    assert!(matches!(transport, AnalysisError::Dispatch(DispatchError::Transport(_))));
    assert!(envelope.user_message().contains("missing candidates[0]"));
    assert!(transport.user_message().contains("connection refused"));
}
