//! Disease category selector sidebar.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::domain::DiseaseCategory;
use crate::tui::styles::{MedicalTheme, LOGO_SMALL};

/// Render the category list. `highlighted` is the cursor row, `current` the
/// category whose form is shown.
pub fn render_selector(
    f: &mut Frame,
    area: Rect,
    current: DiseaseCategory,
    highlighted: usize,
    focused: bool,
) {
    let items: Vec<ListItem> = DiseaseCategory::ALL
        .iter()
        .map(|category| {
            let marker = if *category == current { "● " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(marker, MedicalTheme::focused()),
                Span::styled(category.name(), MedicalTheme::text()),
            ]))
        })
        .collect();

    let border_style = if focused {
        MedicalTheme::border_focused()
    } else {
        MedicalTheme::border()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" {LOGO_SMALL} │ Disease "),
                    MedicalTheme::subtitle(),
                ))
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(if focused {
            MedicalTheme::selected()
        } else {
            MedicalTheme::text_secondary()
        });

    let mut state = ListState::default();
    state.select(Some(highlighted));
    f.render_stateful_widget(list, area, &mut state);
}
