use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use memvault_core::models::Mood;
use memvault_core::utils::format_time;

use crate::app::{App, DetailFocus, DetailView};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref view) = app.detail else {
        return;
    };

    let Some(ref file) = view.file else {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "  Loading memory...",
            styles::muted_style(),
        )));
        frame.render_widget(paragraph, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(8)])
        .split(area);

    let header = vec![
        Line::from(vec![
            Span::styled(format!("{}  ", file.original_name), styles::title_style()),
            Span::styled(file.kind.label(), styles::kind_style(file.kind)),
        ]),
        Line::from(Span::styled(
            app.media_url().unwrap_or_default(),
            styles::muted_style(),
        )),
    ];
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(header).block(block), rows[0]);

    if view.is_playable() {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[1]);
        render_player(frame, view, columns[0]);
        render_diary(frame, view, columns[1]);
    } else {
        render_diary(frame, view, rows[1]);
    }
}

fn render_player(frame: &mut Frame, view: &DetailView, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Playback
            Constraint::Min(4),    // Notes
            Constraint::Length(3), // New note
        ])
        .split(area);

    let playback = &view.playback;
    let state = if playback.is_playing() { "▶" } else { "⏸" };
    let mut spans = vec![Span::styled(
        format!(" {} {}", state, format_time(playback.position())),
        styles::highlight_style(),
    )];
    let upcoming = view
        .timeline
        .notes()
        .iter()
        .find(|n| n.timestamp > playback.position());
    if let Some(note) = upcoming {
        spans.push(Span::styled(
            format!("   next note at {}", format_time(note.timestamp)),
            styles::muted_style(),
        ));
    }
    let clock = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(view.focus == DetailFocus::Notes)),
    );
    frame.render_widget(clock, chunks[0]);

    let active = view.timeline.active_index(playback.position());
    let items: Vec<ListItem> = view
        .timeline
        .notes()
        .iter()
        .enumerate()
        .map(|(i, note)| {
            let mut style = if Some(i) == active {
                styles::active_note_style()
            } else {
                styles::list_item_style()
            };
            if i == view.note_selection && view.focus == DetailFocus::Notes {
                style = style.patch(styles::selected_style());
            }
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>6}  ", format_time(note.timestamp)), styles::muted_style()),
                Span::raw(note.content.clone()),
            ]))
            .style(style)
        })
        .collect();

    let block = Block::default()
        .title(format!(" Notes ({}) ", view.timeline.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(view.focus == DetailFocus::Notes));

    if items.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            " No notes yet. Pause where you want one and type it below.",
            styles::muted_style(),
        )))
        .wrap(Wrap { trim: true })
        .block(block);
        frame.render_widget(empty, chunks[1]);
    } else {
        let mut state = ListState::default();
        state.select(Some(view.note_selection));
        frame.render_stateful_widget(List::new(items).block(block), chunks[1], &mut state);
    }

    let focused = view.focus == DetailFocus::NoteInput;
    let cursor = if focused { "▌" } else { "" };
    let input = Paragraph::new(Line::from(vec![
        Span::raw(view.note_input.clone()),
        Span::raw(cursor),
    ]))
    .block(
        Block::default()
            .title(format!(" Note at {} ", format_time(playback.position())))
            .borders(Borders::ALL)
            .border_style(styles::border_style(focused)),
    );
    frame.render_widget(input, chunks[2]);
}

fn render_diary(frame: &mut Frame, view: &DetailView, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4)])
        .split(area);

    let mood_focused = view.focus == DetailFocus::Mood;
    let mut spans = vec![Span::styled(" Mood: ", styles::muted_style())];
    for mood in Mood::CHOICES {
        let text = format!(" {} ", mood.label());
        if mood == view.mood {
            spans.push(Span::styled(text, styles::mood_style(&mood).patch(styles::selected_style())));
        } else {
            spans.push(Span::styled(text, styles::muted_style()));
        }
    }
    if let Mood::Other(ref raw) = view.mood {
        spans.push(Span::styled(
            format!(" {} ", raw),
            styles::mood_style(&view.mood).patch(styles::selected_style()),
        ));
    }
    let mood_line = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(mood_focused)),
    );
    frame.render_widget(mood_line, chunks[0]);

    let diary_focused = view.focus == DetailFocus::Diary;
    let mut lines: Vec<Line> = view.diary.split('\n').map(|l| Line::from(l.to_string())).collect();
    if diary_focused {
        if let Some(last) = lines.last_mut() {
            last.spans.push(Span::raw("▌"));
        }
    }
    let title = if view.saving {
        " Your story (saving...) "
    } else {
        " Your story "
    };
    let diary = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(title)
                .title_style(styles::title_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(diary_focused)),
        );
    frame.render_widget(diary, chunks[1]);
}
