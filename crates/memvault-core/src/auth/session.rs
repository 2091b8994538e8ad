use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// What the client knows about the token's validity.
///
/// There is no client-side expiry clock: a token only becomes known-bad when
/// the backend rejects it, at which point the session is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExpiryState {
    /// Issued by the exchange, not yet presented to a protected endpoint
    #[default]
    Unverified,
    /// Accepted by the backend at least once
    Verified,
}

/// The authenticated identity for this client.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expiry: ExpiryState,
}

impl Session {
    pub fn new(user_id: String, display_name: String, token: String) -> Self {
        Self {
            user_id,
            display_name,
            token,
            created_at: Utc::now(),
            expiry: ExpiryState::Unverified,
        }
    }

    /// A session is only usable with a non-empty bearer token.
    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

// Keep the bearer token out of logs and panic messages
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("display_name", &self.display_name)
            .field("token", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("expiry", &self.expiry)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Store not hydrated yet; views must wait instead of redirecting
    Loading,
    Authenticated(Session),
    Unauthenticated,
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(s) => Some(s),
            _ => None,
        }
    }
}

/// Holds at most one session and hands it out to every consumer.
///
/// Clone is cheap: all clones share the same state. Writes go through
/// `set`/`clear`; readers use `get`/`state` or `subscribe` for change
/// notifications.
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<SessionState>>,
    dir: Option<PathBuf>,
}

impl SessionStore {
    /// Store that lives only as long as the process; starts unauthenticated.
    pub fn in_memory() -> Self {
        let (tx, _rx) = watch::channel(SessionState::Unauthenticated);
        Self {
            tx: Arc::new(tx),
            dir: None,
        }
    }

    /// Store backed by `session.json` under `dir`; starts `Loading` until `hydrate`.
    pub fn persistent(dir: PathBuf) -> Self {
        let (tx, _rx) = watch::channel(SessionState::Loading);
        Self {
            tx: Arc::new(tx),
            dir: Some(dir),
        }
    }

    /// Load the persisted session, if any, and leave the `Loading` state.
    ///
    /// An unreadable session file is discarded and the user is treated as
    /// signed out.
    pub fn hydrate(&self) -> Result<bool> {
        let loaded = match self.session_path() {
            Some(path) => match Self::read_session(&path) {
                Ok(session) => session,
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable session file");
                    if let Err(e) = std::fs::remove_file(&path) {
                        warn!(error = %e, path = %path.display(), "Failed to remove session file");
                    }
                    None
                }
            },
            None => None,
        };

        let found = loaded.is_some();
        debug!(found, "Session store hydrated");
        self.tx.send_replace(match loaded {
            Some(s) => SessionState::Authenticated(s),
            None => SessionState::Unauthenticated,
        });
        Ok(found)
    }

    fn read_session(path: &Path) -> Result<Option<Session>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).context("Failed to read session file")?;
        let data: Session = serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(data.has_token().then_some(data))
    }

    /// Replace the current session.
    ///
    /// The new session is always held in memory. An error only means it
    /// could not be written to disk and will not survive a restart.
    pub fn set(&self, session: Session) -> Result<()> {
        debug!(user_id = %session.user_id, "Session set");
        let persisted = self.persist(&session);
        self.tx.send_replace(SessionState::Authenticated(session));
        if let Err(ref e) = persisted {
            warn!(error = %e, "Session kept in memory only");
        }
        persisted
    }

    fn persist(&self, session: &Session) -> Result<()> {
        let Some(path) = self.session_path() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create session directory")?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(&path, contents).context("Failed to write session file")?;
        Ok(())
    }

    /// The current session; `None` means signed out (or not hydrated yet).
    pub fn get(&self) -> Option<Session> {
        self.tx.borrow().session().cloned()
    }

    pub fn state(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Drop the session. Safe to call any number of times.
    pub fn clear(&self) -> Result<()> {
        let was_signed_in = self.tx.borrow().session().is_some();
        self.tx.send_replace(SessionState::Unauthenticated);
        if let Some(path) = self.session_path() {
            if path.exists() {
                std::fs::remove_file(&path).context("Failed to remove session file")?;
            }
        }
        if was_signed_in {
            debug!("Session cleared");
        }
        Ok(())
    }

    /// Record that the backend accepted the current token.
    pub fn mark_verified(&self) {
        self.tx.send_if_modified(|state| match state {
            SessionState::Authenticated(s) if s.expiry != ExpiryState::Verified => {
                s.expiry = ExpiryState::Verified;
                true
            }
            _ => false,
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    fn session_path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(SESSION_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Session {
        Session::new("u-1".into(), "rina".into(), "tok-abc".into())
    }

    #[test]
    fn test_set_then_get() {
        let store = SessionStore::in_memory();
        assert!(store.get().is_none());
        store.set(sample()).unwrap();
        let s = store.get().unwrap();
        assert_eq!(s.token, "tok-abc");
        assert_eq!(s.user_id, "u-1");
    }

    #[test]
    fn test_set_replaces_previous_session() {
        let store = SessionStore::in_memory();
        store.set(sample()).unwrap();
        store
            .set(Session::new("u-2".into(), "budi".into(), "tok-xyz".into()))
            .unwrap();
        assert_eq!(store.get().unwrap().user_id, "u-2");
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = SessionStore::in_memory();
        store.set(sample()).unwrap();
        store.clear().unwrap();
        assert!(store.get().is_none());
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.get().is_none());
        assert_eq!(store.state(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_loading_is_not_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::persistent(dir.path().to_path_buf());
        assert_eq!(store.state(), SessionState::Loading);
        assert!(store.get().is_none());
        assert!(!store.hydrate().unwrap());
        assert_eq!(store.state(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_persisted_session_survives_new_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::persistent(dir.path().to_path_buf());
        store.hydrate().unwrap();
        store.set(sample()).unwrap();

        let reopened = SessionStore::persistent(dir.path().to_path_buf());
        assert!(reopened.hydrate().unwrap());
        assert_eq!(reopened.get().unwrap().token, "tok-abc");

        reopened.clear().unwrap();
        assert!(!dir.path().join(SESSION_FILE).exists());
        let third = SessionStore::persistent(dir.path().to_path_buf());
        assert!(!third.hydrate().unwrap());
    }

    #[test]
    fn test_corrupt_session_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();
        let store = SessionStore::persistent(dir.path().to_path_buf());
        assert!(!store.hydrate().unwrap());
        assert!(store.get().is_none());
        assert!(!dir.path().join(SESSION_FILE).exists());
    }

    #[test]
    fn test_mark_verified() {
        let store = SessionStore::in_memory();
        store.set(sample()).unwrap();
        assert_eq!(store.get().unwrap().expiry, ExpiryState::Unverified);
        store.mark_verified();
        assert_eq!(store.get().unwrap().expiry, ExpiryState::Verified);

        // no-op when signed out
        store.clear().unwrap();
        store.mark_verified();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::in_memory();
        let reader = store.clone();
        let rx = store.subscribe();
        store.set(sample()).unwrap();
        assert!(reader.get().is_some());
        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", sample());
        assert!(!rendered.contains("tok-abc"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_undeletable_session_file_still_signs_out() {
        let dir = tempfile::tempdir().unwrap();
        let stuck = dir.path().join(SESSION_FILE);
        std::fs::create_dir(&stuck).unwrap();

        let store = SessionStore::persistent(dir.path().to_path_buf());
        assert!(!store.hydrate().unwrap());
        assert_eq!(store.state(), SessionState::Unauthenticated);
        assert!(stuck.exists());
    }

    #[test]
    fn test_set_keeps_session_when_disk_write_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let store = SessionStore::persistent(blocker.join("memvault"));
        store.hydrate().unwrap();
        assert!(store.set(sample()).is_err());

        let held = store.get().unwrap();
        assert_eq!(held.token, "tok-abc");
        assert_eq!(store.state(), SessionState::Authenticated(held));
    }
}
