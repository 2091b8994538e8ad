//! Account forms (sign in, register, password reset) and the upload dialog.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use memvault_core::guard::Screen;

use crate::app::{App, Form, LoginMode};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

/// Visible width of an input box
const FIELD_WIDTH: usize = 28;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = form_lines(&app.form);

    let hint = match (&app.screen, app.login_mode) {
        (Screen::Login, LoginMode::Password) => Some("Ctrl+G: sign in with Google instead"),
        (Screen::Login, LoginMode::Google) => Some("Ctrl+G: sign in with a password instead"),
        (Screen::ForgotPassword, _) => Some("We will email you a reset link"),
        _ => None,
    };
    if let Some(hint) = hint {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", hint), styles::muted_style())));
    }

    let area = centered_rect_fixed(50, lines.len() as u16 + 2, area);
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(form_block(&app.form)), area);
}

/// Draw `form` as a dialog over the current screen
pub fn render_dialog(frame: &mut Frame, form: &Form) {
    let lines = form_lines(form);
    let area = centered_rect_fixed(50, lines.len() as u16 + 2, frame.area());
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(form_block(form)), area);
}

fn form_block(form: &Form) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", form.title))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default())
}

fn form_lines(form: &Form) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("")];

    for (i, field) in form.fields.iter().enumerate() {
        let focused = form.focus == i && !form.busy;
        let style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        let label = if field.optional {
            format!("  {} (optional)", field.label)
        } else {
            format!("  {}", field.label)
        };
        lines.push(Line::from(Span::styled(label, styles::muted_style())));

        // Keep the tail of long values visible
        let shown = field.display();
        let count = shown.chars().count();
        let visible: String = shown.chars().skip(count.saturating_sub(FIELD_WIDTH)).collect();
        let cursor = if focused { "▌" } else { " " };
        lines.push(Line::from(vec![
            Span::styled("  [", styles::muted_style()),
            Span::styled(format!("{:<width$}{}", visible, cursor, width = FIELD_WIDTH), style),
            Span::styled("]", styles::muted_style()),
        ]));
    }

    lines.push(Line::from(""));
    let label = if form.busy {
        "Please wait...".to_string()
    } else {
        form.submit_label.to_string()
    };
    let button = if form.on_button() && !form.busy {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    let button_style = if form.on_button() {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(vec![
        Span::raw("        ["),
        Span::styled(button, button_style),
        Span::raw("]"),
    ]));

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    }
    if let Some(ref info) = form.info {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", info), styles::success_style())));
    }

    lines
}
