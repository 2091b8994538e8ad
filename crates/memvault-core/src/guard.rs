//! Navigation guard: decides whether a screen may render for the current
//! session state.
//!
//! Every protected screen asks the guard before drawing anything, so the
//! redirect rule lives in one place instead of in each view.

use crate::auth::{Session, SessionState};

/// Screens of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Login,
    Register,
    ForgotPassword,
    /// Reset form opened from a mailed link carrying `token`
    ResetPassword { token: String },
    Gallery,
    Detail { file_id: String },
}

impl Screen {
    pub fn is_protected(&self) -> bool {
        matches!(self, Screen::Gallery | Screen::Detail { .. })
    }

    /// Where an unauthenticated visitor is sent
    pub fn entry() -> Self {
        Screen::Landing
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Landing => "Welcome",
            Screen::Login => "Sign in",
            Screen::Register => "Create account",
            Screen::ForgotPassword => "Forgot password",
            Screen::ResetPassword { .. } => "Reset password",
            Screen::Gallery => "Gallery",
            Screen::Detail { .. } => "Memory",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    /// Draw the screen; carries the session for protected screens
    Render(Option<Session>),
    /// Session store still loading; show a spinner, do not redirect yet
    Suspend,
    /// Leave immediately and draw nothing of the requested screen
    Redirect(Screen),
}

/// Check `screen` against the session state.
pub fn guard(screen: &Screen, state: &SessionState) -> GuardDecision {
    if !screen.is_protected() {
        return GuardDecision::Render(state.session().cloned());
    }
    match state {
        SessionState::Loading => GuardDecision::Suspend,
        SessionState::Authenticated(session) if session.has_token() => {
            GuardDecision::Render(Some(session.clone()))
        }
        SessionState::Authenticated(_) | SessionState::Unauthenticated => {
            GuardDecision::Redirect(Screen::entry())
        }
    }
}
