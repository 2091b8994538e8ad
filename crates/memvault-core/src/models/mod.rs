//! Data models for vault entities.
//!
//! This module contains the data structures exchanged with the backend:
//!
//! - `FileItem`, `FileDetail`, `FileKind`: uploaded photos/audio and their detail view
//! - `Memory`, `Mood`: the diary entry attached to a file
//! - `Note`: a timestamped comment on an audio track
//! - `User`, `AuthResponse`: identity returned by the credential exchange

pub mod file;
pub mod memory;
pub mod user;

pub use file::{DataEnvelope, FileDetail, FileItem, FileKind};
pub use memory::{DiaryEntry, Memory, Mood, NewNote, Note};
pub use user::{AuthResponse, User};
