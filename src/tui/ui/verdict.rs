//! Verdict panel: outcome of the last submit.

use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::application::FormPhase;
use crate::tui::styles::MedicalTheme;

pub fn render_verdict(f: &mut Frame, area: Rect, phase: &FormPhase) {
    let (lines, border_style) = match phase {
        FormPhase::AwaitingInput => (
            vec![Line::from(Span::styled(
                "Press Enter to run the prediction",
                MedicalTheme::text_muted(),
            ))],
            MedicalTheme::border(),
        ),
        FormPhase::Predicted(result) => {
            let style = MedicalTheme::verdict(result.verdict);
            (
                vec![
                    Line::from(Span::styled(
                        result.message(),
                        style.add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        format!("at {}", result.predicted_at.format("%H:%M:%S UTC")),
                        MedicalTheme::text_muted(),
                    )),
                ],
                style,
            )
        }
        FormPhase::Failed(message) => (
            vec![
                Line::from(Span::styled("! Prediction failed", MedicalTheme::danger())),
                Line::from(Span::styled(message.as_str(), MedicalTheme::text())),
            ],
            MedicalTheme::danger(),
        ),
    };

    let panel = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(Span::styled(" Result ", MedicalTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(border_style),
        );

    f.render_widget(panel, area);
}
