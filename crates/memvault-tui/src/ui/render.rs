use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use memvault_core::guard::{GuardDecision, Screen};

use crate::app::{App, AppState};

use super::styles;
use super::views::{detail, forms, gallery, landing};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Overlays
    if let Some(ref form) = app.gallery.upload_form {
        forms::render_dialog(frame, form);
    }

    if app.detail.as_ref().is_some_and(|d| d.confirm_delete.is_some()) {
        render_confirm_overlay(frame, "Delete this note?", "delete");
    }

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_confirm_overlay(frame, "Are you sure you want to quit?", "quit");
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("  Memory Vault  ·  {}", app.screen.title());
    let user = app
        .store
        .get()
        .map(|s| format!("{}  ", s.display_name))
        .unwrap_or_default();
    let help_hint = "[?] Help";

    let used = title.chars().count() + user.chars().count() + help_hint.len() + 4;
    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(user, styles::highlight_style()),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    // Protected screens never draw their content before the guard allows it
    match app.guard_decision() {
        GuardDecision::Render(_) => {}
        GuardDecision::Suspend => {
            render_placeholder(frame, area, "Checking your session...");
            return;
        }
        GuardDecision::Redirect(_) => {
            render_placeholder(frame, area, "");
            return;
        }
    }

    match app.screen {
        Screen::Landing => landing::render(frame, app, area),
        Screen::Login
        | Screen::Register
        | Screen::ForgotPassword
        | Screen::ResetPassword { .. } => forms::render(frame, app, area),
        Screen::Gallery => gallery::render(frame, app, area),
        Screen::Detail { .. } => detail::render(frame, app, area),
    }
}

fn render_placeholder(frame: &mut Frame, area: Rect, text: &str) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        format!("  {}", text),
        styles::muted_style(),
    )));
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.screen {
        Screen::Landing => "[Enter] select | [q]uit",
        Screen::Gallery => "[Enter] open | [u]pload | [r]efresh | [L]ogout | [q]uit",
        Screen::Detail { .. } => "[Tab] focus | [Ctrl+S] save story | [Esc] back",
        _ => "[Tab] next field | [Enter] submit | [Esc] back",
    };

    let left_text = match app.status() {
        Some(msg) => format!(" {} ", msg),
        None => String::new(),
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::highlight_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 26, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  Memory Vault", styles::title_style())),
        Line::from(Span::styled(format!("  version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("↑/↓", "Move selection / field"),
        help_line("Tab", "Next field or panel"),
        help_line("Enter", "Select / submit"),
        help_line("Esc", "Go back"),
        Line::from(""),
        Line::from(Span::styled(" Gallery", styles::highlight_style())),
        help_line("u", "Upload a file (max 10MB)"),
        help_line("r", "Refresh"),
        help_line("L", "Sign out"),
        Line::from(""),
        Line::from(Span::styled(" Detail", styles::highlight_style())),
        help_line("Space", "Play / pause"),
        help_line("←/→", "Seek 5 seconds"),
        help_line("Enter", "Jump to note / send note"),
        help_line("d", "Delete the selected note"),
        help_line("Ctrl+S", "Save the story"),
        Line::from(""),
        help_line("Ctrl+C", "Quit immediately"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_confirm_overlay(frame: &mut Frame, question: &str, action: &str) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("   {}", question), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(format!(" to {}, ", action), styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
