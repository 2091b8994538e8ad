use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Not signed in - token missing, expired or rejected")]
    Unauthenticated,

    #[error("Network error: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("{0}")]
    ValidationFailure(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body shape used by the backend: `{ "msg": "..." }`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    /// Pull the human-readable message out of an error body, falling back to the raw text.
    pub fn message_from_body(body: &str) -> String {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody { msg: Some(m), .. }) | Ok(ErrorBody { message: Some(m), .. }) => m,
            _ => Self::truncate_body(body.trim()),
        }
    }

    /// Map a non-2xx response on a protected endpoint.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 | 403 => ApiError::Unauthenticated,
            code => ApiError::ServerError {
                status: code,
                message: Self::message_from_body(body),
            },
        }
    }

    /// Map a non-2xx response from the credential exchange endpoints.
    pub fn from_auth_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            400 | 401 | 403 => ApiError::InvalidCredentials,
            code => ApiError::ServerError {
                status: code,
                message: Self::message_from_body(body),
            },
        }
    }

    /// Whether this error means the session must be dropped and the user sent to sign in.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ApiError::Unauthenticated)
    }

    /// Short text suitable for a transient status line.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::InvalidCredentials => "Login failed - check your username/email or password".to_string(),
            ApiError::Unauthenticated => "Your session has ended, please sign in again".to_string(),
            ApiError::NetworkFailure(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::NetworkFailure(_) => {
                "Unable to reach the server. Check your connection.".to_string()
            }
            ApiError::ServerError { message, .. } if !message.is_empty() => message.clone(),
            ApiError::ServerError { status, .. } => format!("Server error ({})", status),
            ApiError::ValidationFailure(msg) => msg.clone(),
            ApiError::InvalidResponse(_) => "Unexpected response from server".to_string(),
        }
    }
}
