//! REST API client module for the vault backend.
//!
//! This module provides:
//! - `ApiClient`: connection pool, endpoint building and the unauthenticated
//!   calls (login, external identity, register, password reset)
//! - `Gateway`: attaches the bearer token to protected calls
//! - `Vault`: typed gallery, diary and note operations on top of the gateway
//!
//! The backend issues an opaque bearer token from `/api/auth/*`; protected
//! endpoints expect it as `Authorization: Bearer <token>`.

pub mod client;
pub mod error;
pub mod gateway;
pub mod vault;

pub use client::{ApiClient, DEFAULT_API_BASE_URL};
pub use error::{ApiError, ApiResult};
pub use gateway::{AuthenticatedRequest, Gateway, RequestBody};
pub use vault::Vault;
