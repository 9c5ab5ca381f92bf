//! Colours and text styles for the prediction page.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::Verdict;

/// Teal-on-slate palette shared by the selector, form and verdict panel.
pub struct MedicalTheme;

impl MedicalTheme {
    pub const TEAL: Color = Color::Rgb(13, 148, 136);
    pub const TEAL_BRIGHT: Color = Color::Rgb(45, 212, 191);
    pub const SLATE: Color = Color::Rgb(148, 163, 184);
    pub const SLATE_DIM: Color = Color::Rgb(100, 116, 139);
    pub const INK: Color = Color::Rgb(15, 23, 42);
    pub const WHITE: Color = Color::Rgb(248, 250, 252);

    /// Condition absent
    pub const EMERALD: Color = Color::Rgb(16, 185, 129);
    /// Condition present, failures
    pub const ROSE: Color = Color::Rgb(244, 63, 94);

    #[must_use]
    pub fn title() -> Style {
        Self::text().add_modifier(Modifier::BOLD)
    }

    /// Panel titles and the submit action.
    #[must_use]
    pub fn subtitle() -> Style {
        Self::focused()
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::WHITE)
    }

    /// Field labels and unfocused list rows.
    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::SLATE)
    }

    /// Placeholder values and hints.
    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::SLATE_DIM)
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::ROSE)
    }

    /// Highlighted row in the focused selector.
    #[must_use]
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::INK)
            .bg(Self::TEAL)
            .add_modifier(Modifier::BOLD)
    }

    /// The field or marker under the cursor.
    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::TEAL_BRIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::SLATE)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::TEAL)
    }

    /// Bracketed key in the footer hints.
    #[must_use]
    pub fn key_hint() -> Style {
        Self::focused()
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Self::text_secondary()
    }

    /// Rose when the condition is present, emerald when absent.
    #[must_use]
    pub fn verdict(verdict: Verdict) -> Style {
        match verdict {
            Verdict::Has => Self::danger(),
            Verdict::DoesNotHave => Style::default().fg(Self::EMERALD),
        }
    }
}

/// Product name shown in the selector title.
pub const LOGO_SMALL: &str = "Prognos";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_colours_differ() {
        assert_eq!(MedicalTheme::verdict(Verdict::Has).fg, Some(MedicalTheme::ROSE));
        assert_eq!(
            MedicalTheme::verdict(Verdict::DoesNotHave).fg,
            Some(MedicalTheme::EMERALD)
        );
    }
}
