use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use memvault_core::upload::{format_size, MAX_UPLOAD_BYTES};
use memvault_core::utils::truncate_string;

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_file_list(frame, app, chunks[0]);
    render_file_info(frame, app, chunks[1]);
}

fn render_file_list(frame: &mut Frame, app: &App, area: Rect) {
    let gallery = &app.gallery;
    let name_width = (area.width as usize).saturating_sub(24).max(10);

    let items: Vec<ListItem> = gallery
        .files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let style = if i == gallery.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let line = Line::from(vec![
                Span::styled(format!("{:<6} ", file.kind.label()), styles::kind_style(file.kind)),
                Span::raw(format!(
                    "{:<width$} ",
                    truncate_string(&file.original_name, name_width),
                    width = name_width
                )),
                Span::styled(file.created_date(), styles::muted_style()),
            ]);
            ListItem::new(line).style(style)
        })
        .collect();

    let title = if gallery.loading {
        " Your memories (loading...) ".to_string()
    } else {
        format!(" Your memories ({}) ", gallery.files.len())
    };
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if gallery.files.is_empty() && !gallery.loading {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("  Nothing here yet.", styles::muted_style())),
            Line::from(Span::styled("  Press [u] to upload your first memory.", styles::muted_style())),
        ])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let list = List::new(items).block(block);
    let mut state = ListState::default();
    state.select(Some(gallery.selection));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_file_info(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];

    if let Some(file) = app.gallery.selected() {
        lines.push(Line::from(Span::styled(file.original_name.clone(), styles::title_style())));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Type:     ", styles::highlight_style()),
            Span::styled(file.kind.label(), styles::kind_style(file.kind)),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Uploaded: ", styles::highlight_style()),
            Span::raw(file.created_date()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Media:    ", styles::highlight_style()),
            Span::raw(app.api.media_url(&file.filename)),
        ]));
        lines.push(Line::from(""));
        let action = if file.kind.is_playable() {
            "Enter: open, write a story and add timed notes"
        } else {
            "Enter: open and write a story"
        };
        lines.push(Line::from(Span::styled(action, styles::muted_style())));
    }

    lines.push(Line::from(""));
    if app.gallery.uploading {
        lines.push(Line::from(Span::styled("Uploading...", styles::highlight_style())));
    } else {
        lines.push(Line::from(Span::styled(
            format!("Uploads up to {} (photo, audio, video)", format_size(MAX_UPLOAD_BYTES)),
            styles::muted_style(),
        )));
    }

    let block = Block::default()
        .title(" Details ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(ratatui::widgets::Wrap { trim: true }),
        area,
    );
}
