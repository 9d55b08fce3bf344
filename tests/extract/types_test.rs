//! Data model leniency and tier mapping.

use rhetoric_analyzer::types::{AnalysisResult, ScoreTier, SeverityLevel, Tactic};

#[test]
fn empty_object_deserializes_to_defaults() {
    let result: AnalysisResult = serde_json::from_str("{}").expect("empty object should parse");
    assert_eq!(result, AnalysisResult::default());
}

#[test]
fn null_fields_are_treated_as_missing() {
    let result: AnalysisResult = serde_json::from_str(
        r#"{"populism_score": 33, "summary": null, "tone_analysis": null, "tactics": null}"#,
    )
    .expect("nulls should be tolerated");
    assert!(result.summary.is_empty());
    assert!(result.tone_analysis.is_empty());
    assert!(result.tactics.is_empty());
}

#[test]
fn null_tactic_fields_are_treated_as_missing() {
    let result: AnalysisResult = serde_json::from_str(
        r#"{"populism_score": 50, "tactics": [{"name": "Strawman", "severity": null, "quote": null, "explanation": null}, {"name": null}]}"#,
    )
    .expect("null tactic fields should be tolerated");
    assert_eq!(result.tactics.len(), 2);
    assert_eq!(result.tactics[0].name, "Strawman");
    assert!(result.tactics[0].severity.is_empty());
    assert!(result.tactics[0].quote.is_empty());
    assert!(result.tactics[0].explanation.is_empty());
    assert_eq!(result.tactics[0].severity_level(), SeverityLevel::Low);
    assert_eq!(result.tactics[1], Tactic::default());
}

#[test]
fn null_score_defaults_to_zero() {
    let result: AnalysisResult =
        serde_json::from_str(r#"{"populism_score": null, "summary": "s"}"#)
            .expect("null score should be tolerated");
    assert!(result.populism_score.abs() < f64::EPSILON);
    assert_eq!(result.summary, "s");
    assert_eq!(result.score_tier(), ScoreTier::Low);
}

#[test]
fn unknown_fields_are_ignored() {
    let result: AnalysisResult =
        serde_json::from_str(r#"{"populism_score": 5, "confidence": "high"}"#)
            .expect("extra fields should be ignored");
    assert!((result.populism_score - 5.0).abs() < f64::EPSILON);
}

#[test]
fn score_is_not_clamped() {
    let result: AnalysisResult =
        serde_json::from_str(r#"{"populism_score": 140}"#).expect("should parse");
    assert!((result.populism_score - 140.0).abs() < f64::EPSILON);
    assert_eq!(result.score_tier(), ScoreTier::High);
}

#[test]
fn score_tier_boundaries() {
    assert_eq!(ScoreTier::from_score(0.0), ScoreTier::Low);
    assert_eq!(ScoreTier::from_score(29.9), ScoreTier::Low);
    assert_eq!(ScoreTier::from_score(30.0), ScoreTier::Medium);
    assert_eq!(ScoreTier::from_score(59.0), ScoreTier::Medium);
    assert_eq!(ScoreTier::from_score(60.0), ScoreTier::High);
    assert_eq!(ScoreTier::from_score(-5.0), ScoreTier::Low);
}

#[test]
fn severity_accepts_any_string() {
    let tactic: Tactic = serde_json::from_str(
        r#"{"name": "Gaslighting", "severity": "Critical", "quote": "q", "explanation": "e"}"#,
    )
    .expect("unknown severity should parse");
    assert_eq!(tactic.severity, "Critical");
    assert_eq!(tactic.severity_level(), SeverityLevel::Low);
    assert_eq!(SeverityLevel::classify("High"), SeverityLevel::High);
    assert_eq!(SeverityLevel::classify("Medium"), SeverityLevel::Medium);
    assert_eq!(SeverityLevel::classify("Low"), SeverityLevel::Low);
}
