//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use memvault_core::guard::Screen;

use crate::app::{
    can_add_diary_char, can_add_note_char, App, AppState, DetailFocus, LandingItem, LoginMode,
    PAGE_SCROLL_SIZE, SEEK_STEP_SECS,
};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    match app.screen {
        Screen::Landing => handle_landing_input(app, key),
        Screen::Login
        | Screen::Register
        | Screen::ForgotPassword
        | Screen::ResetPassword { .. } => {
            handle_form_input(app, key);
            Ok(false)
        }
        Screen::Gallery => {
            handle_gallery_input(app, key);
            Ok(false)
        }
        Screen::Detail { .. } => {
            handle_detail_input(app, key);
            Ok(false)
        }
    }
}

/// Keys shared by screens without text input
fn handle_global_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            true
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            true
        }
        _ => false,
    }
}

fn handle_landing_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if handle_global_key(app, key) {
        return Ok(false);
    }

    let items = app.landing_items();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.landing_selection = app.landing_selection.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.landing_selection + 1 < items.len() {
                app.landing_selection += 1;
            }
        }
        KeyCode::Enter => match items.get(app.landing_selection) {
            Some(LandingItem::OpenGallery) => app.navigate(Screen::Gallery),
            Some(LandingItem::SignIn) => app.open_login(LoginMode::Password),
            Some(LandingItem::SignInGoogle) => app.open_login(LoginMode::Google),
            Some(LandingItem::Register) => app.navigate(Screen::Register),
            Some(LandingItem::ForgotPassword) => app.navigate(Screen::ForgotPassword),
            Some(LandingItem::ResetPassword) => app.navigate(Screen::ResetPassword {
                token: String::new(),
            }),
            Some(LandingItem::Quit) => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            None => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('g') && app.screen == Screen::Login && !app.form.busy {
            let mode = match app.login_mode {
                LoginMode::Password => LoginMode::Google,
                LoginMode::Google => LoginMode::Password,
            };
            app.open_login(mode);
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.navigate(Screen::Landing),
        KeyCode::Down | KeyCode::Tab => app.form.focus_next(),
        KeyCode::Up | KeyCode::BackTab => app.form.focus_prev(),
        KeyCode::Enter => {
            if app.form.on_button() {
                app.submit_form();
            } else {
                app.form.focus_next();
            }
        }
        KeyCode::Backspace if !app.form.busy => {
            if let Some(field) = app.form.focused_field() {
                field.value.pop();
            }
        }
        KeyCode::Char(c) if !app.form.busy => {
            if let Some(field) = app.form.focused_field() {
                field.push(c);
            }
        }
        _ => {}
    }
}

fn handle_gallery_input(app: &mut App, key: KeyEvent) {
    // Upload path dialog
    if let Some(ref mut form) = app.gallery.upload_form {
        match key.code {
            KeyCode::Esc => app.gallery.upload_form = None,
            KeyCode::Enter => app.submit_upload(),
            KeyCode::Backspace => {
                if let Some(field) = form.focused_field() {
                    field.value.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(field) = form.focused_field() {
                    field.push(c);
                }
            }
            _ => {}
        }
        return;
    }

    if handle_global_key(app, key) {
        return;
    }

    let len = app.gallery.files.len();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.gallery.selection = app.gallery.selection.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.gallery.selection + 1 < len {
                app.gallery.selection += 1;
            }
        }
        KeyCode::PageUp => {
            app.gallery.selection = app.gallery.selection.saturating_sub(PAGE_SCROLL_SIZE);
        }
        KeyCode::PageDown => {
            app.gallery.selection = (app.gallery.selection + PAGE_SCROLL_SIZE).min(len.saturating_sub(1));
        }
        KeyCode::Home => app.gallery.selection = 0,
        KeyCode::End => app.gallery.selection = len.saturating_sub(1),
        KeyCode::Enter => app.open_selected_file(),
        KeyCode::Char('u') => app.start_upload(),
        KeyCode::Char('r') => app.refresh_gallery(),
        KeyCode::Char('L') => app.sign_out(),
        KeyCode::Esc => app.navigate(Screen::Landing),
        _ => {}
    }
}

fn handle_detail_input(app: &mut App, key: KeyEvent) {
    let Some(ref mut view) = app.detail else {
        return;
    };

    // Delete confirmation
    if view.confirm_delete.is_some() {
        let confirmed = matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter);
        app.confirm_delete_note(confirmed);
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('s') {
            app.save_diary();
        }
        return;
    }

    if view.file.is_none() {
        if key.code == KeyCode::Esc {
            app.navigate(Screen::Gallery);
        }
        return;
    }

    let playable = view.is_playable();
    match key.code {
        KeyCode::Esc => {
            app.navigate(Screen::Gallery);
            return;
        }
        KeyCode::Tab => {
            view.focus = view.focus.next(playable);
            return;
        }
        KeyCode::BackTab => {
            view.focus = view.focus.prev(playable);
            return;
        }
        _ => {}
    }

    let focus = view.focus;
    match focus {
        DetailFocus::Notes => match key.code {
            KeyCode::Char(' ') => view.playback.toggle(),
            KeyCode::Left => view.playback.seek_by(-SEEK_STEP_SECS),
            KeyCode::Right => view.playback.seek_by(SEEK_STEP_SECS),
            KeyCode::Up | KeyCode::Char('k') => {
                view.note_selection = view.note_selection.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if view.note_selection + 1 < view.timeline.len() {
                    view.note_selection += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(note) = view.timeline.get(view.note_selection) {
                    let note = note.clone();
                    view.playback.jump_to(&note);
                }
            }
            KeyCode::Char('d') => app.request_delete_note(),
            KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
            KeyCode::Char('?') => app.state = AppState::ShowingHelp,
            _ => {}
        },
        DetailFocus::NoteInput => match key.code {
            KeyCode::Enter => app.send_note(),
            KeyCode::Backspace => {
                view.note_input.pop();
            }
            KeyCode::Char(c) => {
                if can_add_note_char(view.note_input.chars().count(), c) {
                    // Typing pauses the track so the note lands where it was heard
                    view.playback.pause();
                    view.note_input.push(c);
                }
            }
            _ => {}
        },
        DetailFocus::Diary => match key.code {
            KeyCode::Enter => {
                if can_add_diary_char(view.diary.chars().count(), '\n') {
                    view.diary.push('\n');
                }
            }
            KeyCode::Backspace => {
                view.diary.pop();
            }
            KeyCode::Char(c) => {
                if can_add_diary_char(view.diary.chars().count(), c) {
                    view.diary.push(c);
                }
            }
            _ => {}
        },
        DetailFocus::Mood => match key.code {
            KeyCode::Left | KeyCode::Up => view.mood = view.mood.prev(),
            KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') => view.mood = view.mood.next(),
            KeyCode::Enter => app.save_diary(),
            _ => {}
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memvault_core::auth::{Session, SessionStore};
    use memvault_core::config::Config;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        let config = Config {
            api_base_url: Some("http://127.0.0.1:9".into()),
            last_username: None,
        };
        App::new(config, SessionStore::in_memory()).unwrap()
    }

    #[tokio::test]
    async fn test_landing_navigation() {
        let mut app = test_app();
        app.navigate(Screen::Landing);
        handle_input(&mut app, key(KeyCode::Down)).unwrap();
        handle_input(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(app.screen, Screen::Login);
        assert_eq!(app.login_mode, LoginMode::Google);
        assert_eq!(app.form.fields.len(), 3);
    }

    #[tokio::test]
    async fn test_form_typing_and_escape() {
        let mut app = test_app();
        app.navigate(Screen::Register);
        for c in "budi".chars() {
            handle_input(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        handle_input(&mut app, key(KeyCode::Backspace)).unwrap();
        assert_eq!(app.form.value(0), "bud");

        handle_input(&mut app, key(KeyCode::Esc)).unwrap();
        assert_eq!(app.screen, Screen::Landing);
    }

    #[tokio::test]
    async fn test_submit_with_missing_field_shows_error() {
        let mut app = test_app();
        app.navigate(Screen::ForgotPassword);
        handle_input(&mut app, key(KeyCode::Tab)).unwrap();
        handle_input(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(app.form.error.as_deref(), Some("Email is required"));
        assert!(!app.form.busy);
    }

    #[tokio::test]
    async fn test_ctrl_g_switches_login_mode() {
        let mut app = test_app();
        app.open_login(LoginMode::Password);
        let event = KeyEvent::new(KeyCode::Char('g'), KeyModifiers::CONTROL);
        handle_input(&mut app, event).unwrap();
        assert_eq!(app.login_mode, LoginMode::Google);
    }

    #[tokio::test]
    async fn test_quit_confirmation() {
        let mut app = test_app();
        app.navigate(Screen::Landing);
        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))).unwrap());
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))).unwrap());
    }

    #[tokio::test]
    async fn test_upload_dialog_collects_path() {
        let mut app = test_app();
        app.store
            .set(Session::new("u".into(), "rina".into(), "tok".into()))
            .unwrap();
        app.navigate(Screen::Gallery);
        handle_input(&mut app, key(KeyCode::Char('u'))).unwrap();
        assert!(app.gallery.upload_form.is_some());
        handle_input(&mut app, key(KeyCode::Char('a'))).unwrap();
        assert_eq!(app.gallery.upload_form.as_ref().unwrap().value(0), "a");
        handle_input(&mut app, key(KeyCode::Esc)).unwrap();
        assert!(app.gallery.upload_form.is_none());
        assert_eq!(app.screen, Screen::Gallery);
    }
}
