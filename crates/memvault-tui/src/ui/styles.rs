use ratatui::style::{Color, Modifier, Style};

use memvault_core::models::{FileKind, Mood};

// Color palette
pub const PRIMARY: Color = Color::Rgb(176, 112, 160);
pub const SECONDARY: Color = Color::Rgb(96, 160, 96);
pub const ACCENT: Color = Color::Rgb(208, 168, 80);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(56, 44, 60);

pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 28, 36)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

/// Note currently under the playhead
pub fn active_note_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn mood_style(mood: &Mood) -> Style {
    let color = match mood {
        Mood::Happy => Color::Rgb(232, 200, 80),
        Mood::Nostalgia => Color::Rgb(200, 150, 110),
        Mood::Sad => Color::Rgb(100, 140, 208),
        Mood::Excited => Color::Rgb(224, 96, 128),
        Mood::Other(_) => MUTED,
    };
    Style::default().fg(color)
}

pub fn kind_style(kind: FileKind) -> Style {
    match kind {
        FileKind::Photo => Style::default().fg(SECONDARY),
        FileKind::Audio => Style::default().fg(ACCENT),
        FileKind::Video => Style::default().fg(PRIMARY),
        FileKind::Other => muted_style(),
    }
}
