use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let items = app.landing_items();
    let area = centered_rect_fixed(44, items.len() as u16 + 8, area);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("   Keep every photo, song and story", styles::highlight_style())),
        Line::from(Span::styled("   in one private place.", styles::highlight_style())),
        Line::from(""),
    ];

    for (i, item) in items.iter().enumerate() {
        let selected = i == app.landing_selection;
        let marker = if selected { " ▶ " } else { "   " };
        let style = if selected {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        lines.push(Line::from(vec![
            Span::raw("     "),
            Span::styled(format!("{}{:<28}", marker, item.label()), style),
        ]));
    }

    let block = Block::default()
        .title(" Memory Vault ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
