//! Prediction input form for the selected category.

use std::ops::Range;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::application::{FieldInput, PredictionForm, PROMPT};
use crate::tui::styles::MedicalTheme;

/// Columns kept for the value and cursor on every field row.
const VALUE_WIDTH: usize = 12;

/// Inner width from which fields are laid out in two columns.
const TWO_COLUMN_MIN_WIDTH: u16 = 72;

/// Render the form: title, field grid and key hints.
pub fn render_form(f: &mut Frame, area: Rect, form: &PredictionForm, focused: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Fields
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_form_header(f, chunks[0], form);
    render_form_fields(f, chunks[1], form, focused);
    render_form_footer(f, chunks[2], form, focused);
}

fn render_form_header(f: &mut Frame, area: Rect, form: &PredictionForm) {
    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(" ", MedicalTheme::text()),
            Span::styled(form.title(), MedicalTheme::title()),
        ]),
        Line::from(Span::styled(
            format!(" {PROMPT}"),
            MedicalTheme::text_secondary(),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

/// Slice of `len` fields to show in `capacity` rows so that `selected` stays
/// on screen.
fn visible_window(len: usize, selected: usize, capacity: usize) -> Range<usize> {
    if capacity == 0 {
        return 0..0;
    }
    if len <= capacity {
        return 0..len;
    }
    let start = (selected + 1).saturating_sub(capacity).min(len - capacity);
    start..start + capacity
}

fn render_form_fields(f: &mut Frame, area: Rect, form: &PredictionForm, focused: bool) {
    let fields = form.fields();
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(if focused {
            MedicalTheme::border_focused()
        } else {
            MedicalTheme::border()
        });

    let inner = block.inner(area);
    let column_count: usize = if inner.width >= TWO_COLUMN_MIN_WIDTH { 2 } else { 1 };
    let window = visible_window(
        fields.len(),
        form.selected(),
        usize::from(inner.height) * column_count,
    );

    if window.len() < fields.len() {
        block = block.title(Span::styled(
            format!(" {}-{} of {} ", window.start + 1, window.end, fields.len()),
            MedicalTheme::text_muted(),
        ));
    }
    f.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, column_count as u32); column_count])
        .horizontal_margin(1)
        .split(inner);

    let selected = focused.then_some(form.selected());
    let per_column = window.len().div_ceil(column_count);
    let mut start = window.start;
    for column in columns.iter() {
        let end = (start + per_column).min(window.end);
        render_field_column(f, *column, &fields[start..end], start, selected);
        start = end;
    }
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FieldInput],
    offset: usize,
    selected: Option<usize>,
) {
    // marker (2) + gap (1) + value
    let label_width = usize::from(area.width).saturating_sub(3 + VALUE_WIDTH);

    let lines: Vec<Line> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let is_selected = selected == Some(offset + i);
            let label_style = if is_selected {
                MedicalTheme::focused()
            } else {
                MedicalTheme::text_secondary()
            };

            let value = if field.buffer().is_empty() {
                Span::styled("0", MedicalTheme::text_muted())
            } else {
                Span::styled(field.buffer(), MedicalTheme::text())
            };

            Line::from(vec![
                Span::styled(if is_selected { "▸ " } else { "  " }, label_style),
                Span::styled(
                    format!("{:<width$.width$} ", field.label(), width = label_width),
                    label_style,
                ),
                value,
                if is_selected {
                    Span::styled("▌", MedicalTheme::focused())
                } else {
                    Span::raw("")
                },
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), area);
}

fn render_form_footer(f: &mut Frame, area: Rect, form: &PredictionForm, focused: bool) {
    let content = if focused {
        vec![
            Line::from(vec![
                Span::styled("[Enter] ", MedicalTheme::key_hint()),
                Span::styled(form.submit_label(), MedicalTheme::subtitle()),
                Span::styled("  [S] ", MedicalTheme::key_hint()),
                Span::styled("Sample ", MedicalTheme::key_desc()),
                Span::styled("[Tab] ", MedicalTheme::key_hint()),
                Span::styled("Disease", MedicalTheme::key_desc()),
            ]),
            Line::from(vec![
                Span::styled("[↑↓] ", MedicalTheme::key_hint()),
                Span::styled("Field ", MedicalTheme::key_desc()),
                Span::styled("[←→] ", MedicalTheme::key_hint()),
                Span::styled("±1 ", MedicalTheme::key_desc()),
                Span::styled("[Del] ", MedicalTheme::key_hint()),
                Span::styled("Clear", MedicalTheme::key_desc()),
            ]),
        ]
    } else {
        vec![
            Line::from(vec![
                Span::styled("[↑↓] ", MedicalTheme::key_hint()),
                Span::styled("Choose ", MedicalTheme::key_desc()),
                Span::styled("[Enter] ", MedicalTheme::key_hint()),
                Span::styled("Select ", MedicalTheme::key_desc()),
                Span::styled("[Tab] ", MedicalTheme::key_hint()),
                Span::styled("Form", MedicalTheme::key_desc()),
            ]),
            Line::from(vec![
                Span::styled("[Q] ", MedicalTheme::key_hint()),
                Span::styled("Quit", MedicalTheme::key_desc()),
            ]),
        ]
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_fits_everything() {
        assert_eq!(visible_window(8, 7, 8), 0..8);
        assert_eq!(visible_window(8, 0, 20), 0..8);
    }

    #[test]
    fn test_window_follows_selection() {
        assert_eq!(visible_window(22, 0, 16), 0..16);
        assert_eq!(visible_window(22, 15, 16), 0..16);
        assert_eq!(visible_window(22, 16, 16), 1..17);
        assert_eq!(visible_window(22, 21, 16), 6..22);
    }

    #[test]
    fn test_window_without_room() {
        assert_eq!(visible_window(22, 5, 0), 0..0);
    }
}
