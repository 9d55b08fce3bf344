//! Core data model: the structured analysis returned by the model.
//!
//! Deserialization is deliberately lenient. The model is asked for a fixed
//! schema but frequently omits fields, so every field falls back to an empty
//! value instead of failing the whole parse.

use serde::{Deserialize, Deserializer, Serialize};

/// One detected rhetorical pattern instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tactic {
    /// Tactic name, normally one of the rubric entries (e.g. "Whataboutism").
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Severity as emitted by the model. Expected `High`/`Medium`/`Low`,
    /// but any string is accepted.
    #[serde(deserialize_with = "null_as_default")]
    pub severity: String,
    /// Verbatim excerpt from the analyzed text.
    #[serde(deserialize_with = "null_as_default")]
    pub quote: String,
    /// Why the excerpt fits the tactic.
    #[serde(deserialize_with = "null_as_default")]
    pub explanation: String,
}

impl Tactic {
    /// Styling level for this tactic's severity.
    pub fn severity_level(&self) -> SeverityLevel {
        SeverityLevel::classify(&self.severity)
    }
}

/// Full analysis of one text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    /// 0-100 manipulation/populism rating. Neither clamped nor validated.
    #[serde(deserialize_with = "null_as_default")]
    pub populism_score: f64,
    /// Short summary of the analysis.
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,
    /// Detected tone (e.g. "aggressive", "condescending").
    #[serde(deserialize_with = "null_as_default")]
    pub tone_analysis: String,
    /// Detected tactics in the order the model listed them.
    #[serde(deserialize_with = "null_as_default")]
    pub tactics: Vec<Tactic>,
}

impl AnalysisResult {
    /// Colour tier of the populism score.
    pub fn score_tier(&self) -> ScoreTier {
        ScoreTier::from_score(self.populism_score)
    }
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Severity bucket used only for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeverityLevel {
    /// Exactly `High`.
    High,
    /// Exactly `Medium`.
    Medium,
    /// `Low` and anything unrecognised.
    Low,
}

impl SeverityLevel {
    /// Classify a raw severity string. Unknown values style as [`Self::Low`].
    pub fn classify(raw: &str) -> Self {
        match raw {
            "High" => Self::High,
            "Medium" => Self::Medium,
            _ => Self::Low,
        }
    }
}

/// Three-tier mapping of the populism score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreTier {
    /// Score below 30: matter-of-fact discourse.
    Low,
    /// Score below 60: moderate populism.
    Medium,
    /// Everything else: extreme demagoguery.
    High,
}

impl ScoreTier {
    /// Lowest score in [`ScoreTier::Medium`].
    pub const MEDIUM_FROM: f64 = 30.0;
    /// Lowest score in [`ScoreTier::High`].
    pub const HIGH_FROM: f64 = 60.0;

    /// Map a score to its tier. NaN lands in [`ScoreTier::High`].
    pub fn from_score(score: f64) -> Self {
        if score < Self::MEDIUM_FROM {
            Self::Low
        } else if score < Self::HIGH_FROM {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Label shown under the score bar.
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "matter-of-fact discourse",
            Self::Medium => "moderate populism",
            Self::High => "extreme demagoguery",
        }
    }
}
