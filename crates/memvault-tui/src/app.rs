//! Application state management for the memvault TUI.
//!
//! This module contains the core `App` struct that manages all application
//! state: the current screen, form state, gallery and detail data, the session
//! store and background task coordination.

use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use memvault_core::api::{ApiClient, ApiError, ApiResult, Gateway, Vault};
use memvault_core::auth::{self, Credential, Session, SessionStore};
use memvault_core::config::Config;
use memvault_core::guard::{guard, GuardDecision, Screen};
use memvault_core::models::{FileDetail, FileItem, Mood};
use memvault_core::notes::{NoteTimeline, Playback};
use memvault_core::upload::UploadFile;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for single-line text input (usernames, emails, paths).
const MAX_FIELD_LENGTH: usize = 254;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length of a note typed under the player.
const MAX_NOTE_LENGTH: usize = 500;

/// Maximum length of a diary entry.
const MAX_DIARY_LENGTH: usize = 10_000;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Seek step for the player, in seconds.
pub const SEEK_STEP_SECS: f64 = 5.0;

/// How long a status message stays on screen.
const STATUS_TTL: Duration = Duration::from_secs(5);

// ============================================================================
// UI State Types
// ============================================================================

/// Overlay state on top of the current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Which credential the login screen collects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    Password,
    Google,
}

/// Entries of the landing menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingItem {
    OpenGallery,
    SignIn,
    SignInGoogle,
    Register,
    ForgotPassword,
    ResetPassword,
    Quit,
}

impl LandingItem {
    pub fn label(&self) -> &'static str {
        match self {
            LandingItem::OpenGallery => "Open my vault",
            LandingItem::SignIn => "Sign in",
            LandingItem::SignInGoogle => "Sign in with Google",
            LandingItem::Register => "Create an account",
            LandingItem::ForgotPassword => "Forgot password",
            LandingItem::ResetPassword => "I have a reset link",
            LandingItem::Quit => "Quit",
        }
    }
}

/// Focus inside the detail screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailFocus {
    Notes,
    NoteInput,
    Diary,
    Mood,
}

impl DetailFocus {
    /// Next focus area; audio-less files skip the player parts
    pub fn next(&self, playable: bool) -> Self {
        match (self, playable) {
            (DetailFocus::Notes, _) => DetailFocus::NoteInput,
            (DetailFocus::NoteInput, _) => DetailFocus::Diary,
            (DetailFocus::Diary, _) => DetailFocus::Mood,
            (DetailFocus::Mood, true) => DetailFocus::Notes,
            (DetailFocus::Mood, false) => DetailFocus::Diary,
        }
    }

    pub fn prev(&self, playable: bool) -> Self {
        match (self, playable) {
            (DetailFocus::Notes, _) => DetailFocus::Mood,
            (DetailFocus::NoteInput, _) => DetailFocus::Notes,
            (DetailFocus::Diary, true) => DetailFocus::NoteInput,
            (DetailFocus::Diary, false) => DetailFocus::Mood,
            (DetailFocus::Mood, _) => DetailFocus::Diary,
        }
    }
}

/// One text input of a form
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    pub secret: bool,
    pub optional: bool,
    max_len: usize,
}

impl FormField {
    pub fn text(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            secret: false,
            optional: false,
            max_len: MAX_FIELD_LENGTH,
        }
    }

    pub fn secret(label: &'static str) -> Self {
        Self {
            secret: true,
            max_len: MAX_PASSWORD_LENGTH,
            ..Self::text(label)
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn push(&mut self, c: char) {
        if can_add_char(self.value.chars().count(), self.max_len, c) {
            self.value.push(c);
        }
    }

    /// Value as shown on screen
    pub fn display(&self) -> String {
        if self.secret {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

/// A vertical form: fields followed by a submit button.
#[derive(Debug, Clone)]
pub struct Form {
    pub title: &'static str,
    pub submit_label: &'static str,
    pub fields: Vec<FormField>,
    /// `fields.len()` means the submit button
    pub focus: usize,
    pub error: Option<String>,
    pub info: Option<String>,
    pub busy: bool,
}

impl Form {
    pub fn new(title: &'static str, submit_label: &'static str, fields: Vec<FormField>) -> Self {
        Self {
            title,
            submit_label,
            fields,
            focus: 0,
            error: None,
            info: None,
            busy: false,
        }
    }

    pub fn login(username: &str) -> Self {
        let mut form = Self::new(
            "Sign in",
            "Sign in",
            vec![
                FormField::text("Username or email").with_value(username),
                FormField::secret("Password"),
            ],
        );
        if !username.is_empty() {
            form.focus = 1;
        }
        form
    }

    pub fn google() -> Self {
        Self::new(
            "Sign in with Google",
            "Continue",
            vec![
                FormField::text("Google email"),
                FormField::text("Display name").optional(),
                FormField::text("Avatar URL").optional(),
            ],
        )
    }

    pub fn register() -> Self {
        Self::new(
            "Create account",
            "Create account",
            vec![
                FormField::text("Username"),
                FormField::text("Email").optional(),
                FormField::secret("Password"),
            ],
        )
    }

    pub fn forgot_password() -> Self {
        Self::new("Forgot password", "Send reset link", vec![FormField::text("Email")])
    }

    pub fn reset_password(token: &str) -> Self {
        let mut form = Self::new(
            "Reset password",
            "Set new password",
            vec![
                FormField::text("Reset token").with_value(token),
                FormField::secret("New password"),
            ],
        );
        if !token.is_empty() {
            form.focus = 1;
        }
        form
    }

    pub fn upload() -> Self {
        Self::new("Upload a file", "Upload", vec![FormField::text("Path")])
    }

    pub fn on_button(&self) -> bool {
        self.focus >= self.fields.len()
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % (self.fields.len() + 1);
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.fields.len()) % (self.fields.len() + 1);
    }

    pub fn focused_field(&mut self) -> Option<&mut FormField> {
        self.fields.get_mut(self.focus)
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.as_str()).unwrap_or("")
    }

    /// First required field left blank
    pub fn missing_field(&self) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|f| !f.optional && f.value.trim().is_empty())
            .map(|f| f.label)
    }

    /// Wipe secret fields (after a submit, successful or not)
    pub fn clear_secrets(&mut self) {
        for f in self.fields.iter_mut().filter(|f| f.secret) {
            f.value.clear();
        }
    }
}

/// Gallery screen state
#[derive(Debug, Default)]
pub struct GalleryView {
    pub files: Vec<FileItem>,
    pub selection: usize,
    pub loading: bool,
    pub uploading: bool,
    pub upload_form: Option<Form>,
}

impl GalleryView {
    pub fn selected(&self) -> Option<&FileItem> {
        self.files.get(self.selection)
    }
}

/// Detail screen state: file, diary form and the audio note timeline
#[derive(Debug)]
pub struct DetailView {
    pub file_id: String,
    pub file: Option<FileDetail>,
    pub loading: bool,
    pub focus: DetailFocus,
    pub timeline: NoteTimeline,
    pub playback: Playback,
    pub note_selection: usize,
    pub note_input: String,
    pub diary: String,
    pub mood: Mood,
    pub saving: bool,
    pub confirm_delete: Option<String>,
}

impl DetailView {
    pub fn new(file_id: String) -> Self {
        Self {
            file_id,
            file: None,
            loading: true,
            focus: DetailFocus::Diary,
            timeline: NoteTimeline::default(),
            playback: Playback::new(None),
            note_selection: 0,
            note_input: String::new(),
            diary: String::new(),
            mood: Mood::Happy,
            saving: false,
            confirm_delete: None,
        }
    }

    pub fn is_playable(&self) -> bool {
        self.file.as_ref().map(|f| f.kind.is_playable()).unwrap_or(false)
    }

    /// Load a fetched detail; the diary form is only overwritten on first load
    fn apply(&mut self, detail: FileDetail) {
        let first_load = self.file.is_none();
        if first_load {
            if let Some(ref memory) = detail.memory {
                self.diary = memory.content.clone();
                self.mood = memory.mood.clone();
            }
            if detail.kind.is_playable() {
                self.focus = DetailFocus::Notes;
            }
        }
        self.timeline.replace(detail.notes.clone());
        self.note_selection = self
            .note_selection
            .min(self.timeline.len().saturating_sub(1));
        self.file = Some(detail);
        self.loading = false;
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned API tasks.
#[derive(Debug)]
enum ApiEvent {
    SignedIn {
        result: ApiResult<Session>,
        after_register: bool,
    },
    RegisterFailed(ApiError),
    ResetLinkSent(ApiResult<()>),
    PasswordReset(ApiResult<()>),
    Files(ApiResult<Vec<FileItem>>),
    Uploaded(ApiResult<()>),
    Detail(ApiResult<FileDetail>),
    DiarySaved(ApiResult<()>),
    NoteAdded(ApiResult<()>),
    NoteDeleted(ApiResult<()>),
}

/// An event tagged with the view it was requested from.
#[derive(Debug)]
struct Tagged {
    epoch: u64,
    event: ApiEvent,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub store: SessionStore,
    pub api: ApiClient,
    pub vault: Vault,

    // Navigation
    pub state: AppState,
    pub screen: Screen,
    /// Bumped on every navigation; results for older epochs are dropped
    view_epoch: u64,
    /// Whether the current screen's data load has been started
    entered: bool,

    // Screens
    pub landing_selection: usize,
    pub login_mode: LoginMode,
    pub form: Form,
    pub gallery: GalleryView,
    pub detail: Option<DetailView>,

    // Background tasks
    event_rx: mpsc::Receiver<Tagged>,
    event_tx: mpsc::Sender<Tagged>,

    // Status line
    status_message: Option<(String, Instant)>,
    last_tick: Instant,
}

impl App {
    /// Create a new application instance.
    ///
    /// The session store starts in the loading state; call `start_hydration`
    /// to read the persisted session in the background.
    pub fn new(config: Config, store: SessionStore) -> Result<Self> {
        let api = ApiClient::new(&config.api_base_url())?;
        debug!(base_url = %api.base_url(), "API client configured");
        let vault = Vault::new(Gateway::new(api.clone()), store.clone());

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let username = config.prefill_username();

        Ok(Self {
            config,
            store,
            api,
            vault,

            state: AppState::Normal,
            screen: Screen::Gallery,
            view_epoch: 0,
            entered: false,

            landing_selection: 0,
            login_mode: LoginMode::Password,
            form: Form::login(&username),
            gallery: GalleryView::default(),
            detail: None,

            event_rx: rx,
            event_tx: tx,

            status_message: None,
            last_tick: Instant::now(),
        })
    }

    /// Load the persisted session off the UI thread.
    pub fn start_hydration(&self) {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = store.hydrate() {
                warn!(error = %e, "Failed to hydrate session store");
            }
        });
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Switch screens. Pending results of the previous screen will be dropped.
    pub fn navigate(&mut self, screen: Screen) {
        debug!(from = ?self.screen, to = ?screen, "Navigate");
        self.view_epoch += 1;
        self.entered = false;
        self.state = AppState::Normal;

        let username = self.config.prefill_username();
        match &screen {
            Screen::Login => {
                self.form = match self.login_mode {
                    LoginMode::Password => Form::login(&username),
                    LoginMode::Google => Form::google(),
                }
            }
            Screen::Register => self.form = Form::register(),
            Screen::ForgotPassword => self.form = Form::forgot_password(),
            Screen::ResetPassword { token } => self.form = Form::reset_password(token),
            Screen::Gallery => {
                self.gallery.upload_form = None;
                self.gallery.uploading = false;
                self.detail = None;
            }
            Screen::Detail { file_id } => self.detail = Some(DetailView::new(file_id.clone())),
            Screen::Landing => self.landing_selection = 0,
        }
        self.screen = screen;
    }

    pub fn open_login(&mut self, mode: LoginMode) {
        self.login_mode = mode;
        self.navigate(Screen::Login);
    }

    /// Items offered on the landing screen for the current session state
    pub fn landing_items(&self) -> Vec<LandingItem> {
        let mut items = Vec::new();
        if self.store.get().is_some() {
            items.push(LandingItem::OpenGallery);
        }
        items.extend([
            LandingItem::SignIn,
            LandingItem::SignInGoogle,
            LandingItem::Register,
            LandingItem::ForgotPassword,
            LandingItem::ResetPassword,
            LandingItem::Quit,
        ]);
        items
    }

    /// Decision of the navigation guard for the current screen
    pub fn guard_decision(&self) -> GuardDecision {
        guard(&self.screen, &self.store.state())
    }

    /// Apply the guard: redirect signed-out visitors and start the screen's
    /// data load once it may render.
    pub fn enforce_guard(&mut self) {
        match self.guard_decision() {
            GuardDecision::Redirect(target) => {
                info!(from = ?self.screen, "Not signed in, redirecting");
                self.navigate(target);
            }
            GuardDecision::Suspend => {}
            GuardDecision::Render(_) => {
                if !self.entered {
                    self.entered = true;
                    self.on_enter();
                }
            }
        }
    }

    fn on_enter(&mut self) {
        match self.screen {
            Screen::Gallery => self.refresh_gallery(),
            Screen::Detail { .. } => self.refresh_detail(),
            _ => {}
        }
    }

    // =========================================================================
    // Status line
    // =========================================================================

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    pub fn status(&self) -> Option<&str> {
        self.status_message
            .as_ref()
            .filter(|(_, at)| at.elapsed() < STATUS_TTL)
            .map(|(m, _)| m.as_str())
    }

    /// Report a failed call. A rejected or missing token ends the session.
    fn report_error(&mut self, err: &ApiError) {
        if err.is_unauthenticated() {
            if let Err(e) = auth::sign_out(&self.store) {
                error!(error = %e, "Failed to clear session");
            }
            self.set_status(err.user_message());
            self.navigate(Screen::entry());
        } else {
            warn!(error = %err, "Request failed");
            self.set_status(err.user_message());
        }
    }

    // =========================================================================
    // Background tasks
    // =========================================================================

    fn spawn<F>(&self, fut: F)
    where
        F: std::future::Future<Output = ApiEvent> + Send + 'static,
    {
        let tx = self.event_tx.clone();
        let epoch = self.view_epoch;
        tokio::spawn(async move {
            let event = fut.await;
            if let Err(e) = tx.send(Tagged { epoch, event }).await {
                error!(error = %e, "Failed to send task result - channel closed");
            }
        });
    }

    /// Drain finished tasks and advance the playback clock.
    pub fn tick(&mut self) {
        let elapsed = self.last_tick.elapsed();
        self.last_tick = Instant::now();
        if let Some(ref mut detail) = self.detail {
            detail.playback.advance(elapsed);
        }

        let mut results = Vec::new();
        while let Ok(tagged) = self.event_rx.try_recv() {
            results.push(tagged);
        }
        for tagged in results {
            if tagged.epoch != self.view_epoch {
                debug!(epoch = tagged.epoch, current = self.view_epoch, "Dropping result for a view that was left");
                continue;
            }
            self.process_event(tagged.event);
        }
    }

    fn process_event(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::SignedIn { result, after_register } => {
                self.form.busy = false;
                self.form.clear_secrets();
                match result {
                    Ok(session) => {
                        let name = session.display_name.clone();
                        let saved = self.store.set(session);
                        self.remember_username();
                        match saved {
                            Ok(()) => self.set_status(format!("Welcome, {}!", name)),
                            Err(e) => {
                                warn!(error = %e, "Signed in without saving the session");
                                self.set_status(format!(
                                    "Welcome, {}! (session not saved, sign in again next time)",
                                    name
                                ));
                            }
                        }
                        self.navigate(Screen::Gallery);
                    }
                    Err(e) if after_register => {
                        warn!(error = %e, "Auto sign-in after registration failed");
                        self.open_login(LoginMode::Password);
                        self.form.info = Some("Account created - please sign in".into());
                    }
                    Err(e) => {
                        self.form.error = Some(e.user_message());
                    }
                }
            }
            ApiEvent::RegisterFailed(e) => {
                self.form.busy = false;
                self.form.clear_secrets();
                self.form.error = Some(e.user_message());
            }
            ApiEvent::ResetLinkSent(result) => {
                self.form.busy = false;
                match result {
                    Ok(()) => self.form.info = Some("Check your email for the reset link".into()),
                    Err(e) => self.form.error = Some(e.user_message()),
                }
            }
            ApiEvent::PasswordReset(result) => {
                self.form.busy = false;
                self.form.clear_secrets();
                match result {
                    Ok(()) => {
                        self.open_login(LoginMode::Password);
                        self.form.info = Some("Password changed - sign in now".into());
                    }
                    Err(e) => self.form.error = Some(e.user_message()),
                }
            }
            ApiEvent::Files(result) => {
                self.gallery.loading = false;
                match result {
                    Ok(files) => {
                        self.gallery.selection = self.gallery.selection.min(files.len().saturating_sub(1));
                        self.gallery.files = files;
                    }
                    Err(e) => self.report_error(&e),
                }
            }
            ApiEvent::Uploaded(result) => {
                self.gallery.uploading = false;
                match result {
                    Ok(()) => {
                        self.set_status("File uploaded");
                        self.refresh_gallery();
                    }
                    Err(e) => self.report_error(&e),
                }
            }
            ApiEvent::Detail(result) => match result {
                Ok(detail) => {
                    if let Some(ref mut view) = self.detail {
                        view.apply(detail);
                    }
                }
                Err(e) if e.is_unauthenticated() => self.report_error(&e),
                Err(e) => {
                    warn!(error = %e, "Failed to load file detail");
                    self.navigate(Screen::Gallery);
                    self.set_status(e.user_message());
                }
            },
            ApiEvent::DiarySaved(result) => {
                if let Some(ref mut view) = self.detail {
                    view.saving = false;
                }
                match result {
                    Ok(()) => {
                        self.set_status("Story saved");
                        self.refresh_detail();
                    }
                    Err(e) => self.report_error(&e),
                }
            }
            ApiEvent::NoteAdded(result) | ApiEvent::NoteDeleted(result) => match result {
                Ok(()) => self.refresh_detail(),
                Err(e) => self.report_error(&e),
            },
        }
    }

    fn remember_username(&mut self) {
        if self.login_mode != LoginMode::Password {
            return;
        }
        let username = self.form.value(0).trim().to_string();
        if username.is_empty() {
            return;
        }
        self.config.last_username = Some(username);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    // =========================================================================
    // Account actions
    // =========================================================================

    /// Submit the current form of an account screen
    pub fn submit_form(&mut self) {
        if self.form.busy {
            return;
        }
        if let Some(label) = self.form.missing_field() {
            self.form.error = Some(format!("{} is required", label));
            return;
        }
        self.form.error = None;
        self.form.info = None;
        self.form.busy = true;

        let api = self.api.clone();
        match (&self.screen, self.login_mode) {
            (Screen::Login, LoginMode::Password) => {
                let credential = Credential::password(self.form.value(0).trim(), self.form.value(1));
                self.spawn(async move {
                    ApiEvent::SignedIn {
                        result: auth::exchange(&api, credential).await,
                        after_register: false,
                    }
                });
            }
            (Screen::Login, LoginMode::Google) => {
                let email = self.form.value(0).trim().to_string();
                let name = match self.form.value(1).trim() {
                    "" => email.split('@').next().unwrap_or_default().to_string(),
                    n => n.to_string(),
                };
                let avatar = Some(self.form.value(2).trim().to_string()).filter(|a| !a.is_empty());
                let credential = Credential::external(email, name, avatar);
                self.spawn(async move {
                    ApiEvent::SignedIn {
                        result: auth::exchange(&api, credential).await,
                        after_register: false,
                    }
                });
            }
            (Screen::Register, _) => {
                let username = self.form.value(0).trim().to_string();
                let email = self.form.value(1).trim().to_string();
                let password = self.form.value(2).to_string();
                self.spawn(async move {
                    let email = Some(email.as_str()).filter(|e| !e.is_empty());
                    if let Err(e) = api.register(&username, email, &password).await {
                        return ApiEvent::RegisterFailed(e);
                    }
                    info!(username = %username, "Account created, signing in");
                    ApiEvent::SignedIn {
                        result: auth::exchange(&api, Credential::password(username, password)).await,
                        after_register: true,
                    }
                });
            }
            (Screen::ForgotPassword, _) => {
                let email = self.form.value(0).trim().to_string();
                self.spawn(async move { ApiEvent::ResetLinkSent(api.forgot_password(&email).await) });
            }
            (Screen::ResetPassword { .. }, _) => {
                let token = self.form.value(0).trim().to_string();
                let password = self.form.value(1).to_string();
                self.spawn(async move {
                    ApiEvent::PasswordReset(api.reset_password(&token, &password).await)
                });
            }
            _ => self.form.busy = false,
        }
    }

    pub fn sign_out(&mut self) {
        if let Err(e) = auth::sign_out(&self.store) {
            error!(error = %e, "Failed to clear session");
        }
        self.gallery = GalleryView::default();
        self.set_status("Signed out");
        self.navigate(Screen::Landing);
    }

    // =========================================================================
    // Gallery actions
    // =========================================================================

    pub fn refresh_gallery(&mut self) {
        self.gallery.loading = true;
        let vault = self.vault.clone();
        self.spawn(async move { ApiEvent::Files(vault.list_files().await) });
    }

    pub fn open_selected_file(&mut self) {
        if let Some(file) = self.gallery.selected() {
            let file_id = file.id.clone();
            self.navigate(Screen::Detail { file_id });
        }
    }

    pub fn start_upload(&mut self) {
        if !self.gallery.uploading {
            self.gallery.upload_form = Some(Form::upload());
        }
    }

    /// Validate the chosen path and upload it in the background
    pub fn submit_upload(&mut self) {
        let Some(form) = self.gallery.upload_form.take() else {
            return;
        };
        let raw = form.value(0).trim().to_string();
        if raw.is_empty() {
            let mut form = form;
            form.error = Some("Path is required".into());
            self.gallery.upload_form = Some(form);
            return;
        }
        let path = expand_home(&raw);

        self.gallery.uploading = true;
        self.set_status(format!("Uploading {}...", path.display()));
        let vault = self.vault.clone();
        self.spawn(async move {
            let result = match UploadFile::from_path(&path).await {
                Ok(file) => vault.upload_file(file).await,
                Err(e) => Err(e),
            };
            ApiEvent::Uploaded(result)
        });
    }

    // =========================================================================
    // Detail actions
    // =========================================================================

    pub fn refresh_detail(&mut self) {
        let Some(ref view) = self.detail else {
            return;
        };
        let file_id = view.file_id.clone();
        let vault = self.vault.clone();
        self.spawn(async move { ApiEvent::Detail(vault.fetch_file(&file_id).await) });
    }

    pub fn media_url(&self) -> Option<String> {
        self.detail
            .as_ref()
            .and_then(|d| d.file.as_ref())
            .map(|f| self.api.media_url(&f.filename))
    }

    pub fn save_diary(&mut self) {
        let Some(ref mut view) = self.detail else {
            return;
        };
        // Nothing to save over until the stored entry has been loaded
        if view.saving || view.loading || view.file.is_none() {
            return;
        }
        view.saving = true;
        let file_id = view.file_id.clone();
        let content = view.diary.clone();
        let mood = view.mood.clone();
        let vault = self.vault.clone();
        self.spawn(async move { ApiEvent::DiarySaved(vault.save_diary(&file_id, &content, mood).await) });
    }

    /// Send the typed note pinned to the current playback position
    pub fn send_note(&mut self) {
        let Some(ref mut view) = self.detail else {
            return;
        };
        if view.note_input.trim().is_empty() {
            return;
        }
        let content = std::mem::take(&mut view.note_input);
        let position = view.playback.position();
        let file_id = view.file_id.clone();
        let vault = self.vault.clone();
        self.spawn(async move { ApiEvent::NoteAdded(vault.add_note(&file_id, position, &content).await) });
    }

    /// Ask to delete the selected note
    pub fn request_delete_note(&mut self) {
        if let Some(ref mut view) = self.detail {
            if let Some(note) = view.timeline.get(view.note_selection) {
                view.confirm_delete = Some(note.id.clone());
            }
        }
    }

    pub fn confirm_delete_note(&mut self, confirmed: bool) {
        let Some(ref mut view) = self.detail else {
            return;
        };
        let Some(note_id) = view.confirm_delete.take() else {
            return;
        };
        if !confirmed {
            return;
        }
        let vault = self.vault.clone();
        self.spawn(async move { ApiEvent::NoteDeleted(vault.delete_note(&note_id).await) });
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(raw: &str) -> std::path::PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => std::env::var_os("HOME")
            .map(|home| std::path::PathBuf::from(home).join(rest))
            .unwrap_or_else(|| std::path::PathBuf::from(raw)),
        None => std::path::PathBuf::from(raw),
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a character may be appended to an input of `current_len` chars
pub fn can_add_char(current_len: usize, max_len: usize, c: char) -> bool {
    current_len < max_len && is_valid_input_char(c)
}

pub fn can_add_note_char(current_len: usize, c: char) -> bool {
    can_add_char(current_len, MAX_NOTE_LENGTH, c)
}

/// Diary text also accepts newlines
pub fn can_add_diary_char(current_len: usize, c: char) -> bool {
    current_len < MAX_DIARY_LENGTH && (c == '\n' || is_valid_input_char(c))
}

// ============================================================================
// Tests
// ============================================================================
