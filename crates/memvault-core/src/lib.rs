//! Core library for memvault.
//!
//! Everything a vault client needs besides its presentation layer:
//!
//! - `auth`: credential exchange and the single-session store
//! - `api`: backend client, the bearer-token gateway and vault operations
//! - `guard`: per-screen redirect rule for protected views
//! - `notes`: audio note timeline and playback clock
//! - `upload`: client-side upload validation
//! - `models`: backend data types
//! - `config`: user configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod guard;
pub mod models;
pub mod notes;
pub mod upload;
pub mod utils;

pub use api::{ApiClient, ApiError, ApiResult, Gateway, Vault};
pub use auth::{Credential, Session, SessionState, SessionStore};
pub use config::Config;
pub use guard::{guard, GuardDecision, Screen};
