//! Styling for terminal output

use std::sync::LazyLock;

use coursework::DiagnosticKind;
use owo_colors::{OwoColorize, Style};

/// Below this many columns, listings drop their unit headers.
const NARROW_COLUMNS: u16 = 60;

static COLOR: LazyLock<bool> =
    LazyLock::new(|| supports_color::on(supports_color::Stream::Stdout).is_some());

/// How a line of output should read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Valid courses and headings.
    Good,
    /// Course or unit level problems.
    Problem,
    /// Topic level problems and manifests that could not be loaded.
    Broken,
    /// Secondary detail.
    Muted,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Good => Style::new().green(),
            Self::Problem => Style::new().yellow(),
            Self::Broken => Style::new().red(),
            Self::Muted => Style::new().dimmed(),
        }
    }
}

impl From<DiagnosticKind> for Tone {
    fn from(kind: DiagnosticKind) -> Self {
        match kind {
            DiagnosticKind::EmptyUnits
            | DiagnosticKind::EmptyTopics
            | DiagnosticKind::DuplicateUnitName => Self::Problem,
            DiagnosticKind::MalformedPath | DiagnosticKind::UnresolvedTopic => Self::Broken,
        }
    }
}

/// Renders `text` in `tone`, or plainly if stdout has no color support.
pub fn paint(text: &str, tone: impl Into<Tone>) -> String {
    let tone: Tone = tone.into();
    if *COLOR {
        text.style(tone.style()).to_string()
    } else {
        text.to_string()
    }
}

/// Whether the terminal is too narrow for grouped listings.
pub fn is_narrow() -> bool {
    terminal_size::terminal_size().is_some_and(|(width, _)| width.0 < NARROW_COLUMNS)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(DiagnosticKind::EmptyUnits, Tone::Problem)]
    #[test_case(DiagnosticKind::DuplicateUnitName, Tone::Problem)]
    #[test_case(DiagnosticKind::MalformedPath, Tone::Broken)]
    #[test_case(DiagnosticKind::UnresolvedTopic, Tone::Broken)]
    fn diagnostic_tones(kind: DiagnosticKind, tone: Tone) {
        assert_eq!(Tone::from(kind), tone);
    }

    #[test]
    fn painting_keeps_the_text() {
        let painted = paint("unit 2", DiagnosticKind::EmptyTopics);
        assert!(painted.contains("unit 2"));
    }
}
