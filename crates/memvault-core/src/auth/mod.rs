//! Authentication module: credential exchange and the session store.
//!
//! This module provides:
//! - `Credential` and `exchange`: username/password or external identity in,
//!   `Session` out, with one backend call
//! - `SessionStore`: the single current session, optionally persisted to disk
//!
//! Sessions have no client-side expiry; a token is known to be dead only when
//! the backend rejects it.

pub mod credentials;
pub mod session;

pub use credentials::{exchange, sign_in, sign_out, Credential};
pub use session::{ExpiryState, Session, SessionState, SessionStore};
