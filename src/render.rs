//! Terminal rendering of the session state.
//!
//! Pure string builders. The caller decides whether colour is wanted; with
//! colour off the output is plain text suitable for pipes and tests.

use colored::{ColoredString, Colorize};

use crate::session::SessionState;
use crate::types::{AnalysisResult, ScoreTier, SeverityLevel};

/// Number of cells in the score bar.
const BAR_CELLS: u8 = 20;

/// Score covered by one bar cell.
const POINTS_PER_CELL: f64 = 5.0;

/// Line that ends one pasted text in interactive mode. Blank lines do not,
/// so a post and its comments can be separated by empty lines.
pub const END_OF_TEXT_MARKER: &str = ".";

/// Shown when the model reported no tactics.
pub const NO_TACTICS_MESSAGE: &str = "No clear rhetorical fallacies were found in this text.";

/// Rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Emit ANSI colour codes.
    pub color: bool,
}

impl RenderOptions {
    /// Plain text, no colour.
    pub fn plain() -> Self {
        Self { color: false }
    }

    fn paint(self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_owned()
        }
    }
}

/// Render whichever view matches `state`.
pub fn render(state: &SessionState, opts: RenderOptions) -> String {
    match state {
        SessionState::Idle => render_idle(opts),
        SessionState::Loading => opts.paint("Analyzing...", |s| s.dimmed()),
        SessionState::Result(result) => render_report(result, opts),
        SessionState::Error(message) => render_error(message, opts),
    }
}

fn render_idle(opts: RenderOptions) -> String {
    format!(
        "{}\nPaste the post and its comments, then finish with a line \
         containing only \"{END_OF_TEXT_MARKER}\":",
        opts.paint("Political rhetoric analyzer", |s| s.bold())
    )
}

/// Error banner.
pub fn render_error(message: &str, opts: RenderOptions) -> String {
    format!("{} {message}", opts.paint("Error:", |s| s.red().bold()))
}

/// Full report for one analysis.
pub fn render_report(result: &AnalysisResult, opts: RenderOptions) -> String {
    let tier = result.score_tier();
    let mut out = String::with_capacity(1024);

    out.push_str(&format!(
        "{}  {}\n",
        opts.paint("Manipulation & polarization score", |s| s.bold()),
        opts.paint(&format!("{}/100", result.populism_score), |s| {
            tier_color(s, tier).bold()
        }),
    ));
    out.push_str(&format!(
        "[{}] {}\n\n",
        opts.paint(&score_bar(result.populism_score), |s| tier_color(s, tier)),
        tier.label()
    ));

    out.push_str(&format!("{}\n", opts.paint("Summary:", |s| s.bold())));
    out.push_str(&format!("  {}\n", result.summary));
    out.push_str(&format!(
        "{} {}\n\n",
        opts.paint("Detected tone:", |s| s.dimmed()),
        result.tone_analysis
    ));

    out.push_str(&format!(
        "{}\n",
        opts.paint(
            &format!("Detected tactics ({}):", result.tactics.len()),
            |s| s.bold()
        )
    ));

    if result.tactics.is_empty() {
        out.push_str(&format!("  {}\n", opts.paint(NO_TACTICS_MESSAGE, |s| s.green())));
        return out;
    }

    for (idx, tactic) in result.tactics.iter().enumerate() {
        let level = tactic.severity_level();
        out.push_str(&format!(
            "{:>3}. {} [{}]\n",
            idx.saturating_add(1),
            opts.paint(&tactic.name, |s| s.bold()),
            opts.paint(&tactic.severity.to_uppercase(), |s| severity_color(s, level)),
        ));
        out.push_str(&format!(
            "     {}\n",
            opts.paint(&format!("\"{}\"", tactic.quote), |s| s.italic())
        ));
        out.push_str(&format!(
            "     {} {}\n",
            opts.paint("Analysis:", |s| s.bold()),
            tactic.explanation
        ));
    }

    out
}

/// Machine-readable output for `--json`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(result: &AnalysisResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

/// Fixed-width bar, one `#` per five points. Out-of-range scores saturate.
pub fn score_bar(score: f64) -> String {
    (0..BAR_CELLS)
        .map(|cell| {
            if f64::from(cell) * POINTS_PER_CELL < score {
                '#'
            } else {
                '.'
            }
        })
        .collect()
}

fn tier_color(text: &str, tier: ScoreTier) -> ColoredString {
    match tier {
        ScoreTier::Low => text.green(),
        ScoreTier::Medium => text.yellow(),
        ScoreTier::High => text.red(),
    }
}

fn severity_color(text: &str, level: SeverityLevel) -> ColoredString {
    match level {
        SeverityLevel::High => text.red(),
        SeverityLevel::Medium => text.bright_yellow(),
        SeverityLevel::Low => text.yellow(),
    }
}
