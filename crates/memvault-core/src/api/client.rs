//! HTTP client for the vault backend.
//!
//! `ApiClient` owns the connection pool and the backend base URL. It issues
//! the unauthenticated calls (credential exchange, registration, password
//! reset) directly; everything that needs a bearer token goes through the
//! [`Gateway`](super::Gateway).

use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, Response, Url};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::models::AuthResponse;

use super::error::{ApiError, ApiResult};

// ============================================================================
// Constants
// ============================================================================

/// Backend used when neither config nor environment name one
pub const DEFAULT_API_BASE_URL: &str = "https://diary-backend-production-e2fc.up.railway.app";

/// HTTP request timeout in seconds.
/// Uploads of up to 10 MB need headroom on slow links.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the vault backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client for the backend at `base_url`
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid backend URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Backend URL cannot be used as a base: {}", base_url);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Build an endpoint URL from path segments; each segment is percent-encoded.
    pub fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidResponse("backend URL cannot be a base".into()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment.as_ref());
            }
        }
        Ok(url)
    }

    /// Public URL where the backend serves an uploaded file
    pub fn media_url(&self, filename: &str) -> String {
        self.endpoint(&["uploads", filename])
            .map(|u| u.to_string())
            .unwrap_or_default()
    }

    /// Check if response is successful, mapping failures with the exchange taxonomy.
    async fn check_auth_response(response: Response) -> ApiResult<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_auth_status(status, &body))
        }
    }

    /// Check if response is successful, returning a server error with the body's message if not.
    async fn check_public_response(response: Response) -> ApiResult<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::ServerError {
                status: status.as_u16(),
                message: ApiError::message_from_body(&body),
            })
        }
    }

    async fn post_public<B: Serialize>(&self, segments: &[&str], body: &B) -> ApiResult<Response> {
        let url = self.endpoint(segments)?;
        debug!(url = %url, "POST (unauthenticated)");
        let response = self.client.post(url).json(body).send().await?;
        Ok(response)
    }

    async fn exchange(&self, segments: &[&str], body: serde_json::Value) -> ApiResult<AuthResponse> {
        let response = self.post_public(segments, &body).await?;
        let response = Self::check_auth_response(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, "Failed to parse auth response");
            ApiError::InvalidResponse(format!("auth response: {}", e))
        })
    }

    // ===== Credential exchange =====

    /// `POST /api/auth/login`
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<AuthResponse> {
        self.exchange(
            &["api", "auth", "login"],
            json!({ "username": username, "password": password }),
        )
        .await
    }

    /// `POST /api/auth/google`; the backend creates or links the account by email.
    pub async fn login_external(
        &self,
        email: &str,
        display_name: &str,
        avatar_url: Option<&str>,
    ) -> ApiResult<AuthResponse> {
        self.exchange(
            &["api", "auth", "google"],
            json!({ "email": email, "username": display_name, "avatar": avatar_url }),
        )
        .await
    }

    // ===== Account maintenance =====

    /// `POST /api/auth/register`. An empty email is omitted from the body.
    pub async fn register(&self, username: &str, email: Option<&str>, password: &str) -> ApiResult<()> {
        let mut body = json!({ "username": username, "password": password });
        if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
            body["email"] = json!(email.trim());
        }
        let response = self.post_public(&["api", "auth", "register"], &body).await?;
        Self::check_public_response(response).await?;
        Ok(())
    }

    /// `POST /api/auth/forgot-password`; the backend mails a reset link.
    pub async fn forgot_password(&self, email: &str) -> ApiResult<()> {
        let response = self
            .post_public(&["api", "auth", "forgot-password"], &json!({ "email": email }))
            .await?;
        Self::check_public_response(response).await?;
        Ok(())
    }

    /// `POST /api/auth/reset-password/{token}` with the token from the mailed link.
    pub async fn reset_password(&self, reset_token: &str, new_password: &str) -> ApiResult<()> {
        if reset_token.trim().is_empty() {
            return Err(ApiError::ValidationFailure("Reset link is missing its token".into()));
        }
        let response = self
            .post_public(
                &["api", "auth", "reset-password", reset_token.trim()],
                &json!({ "newPassword": new_password }),
            )
            .await?;
        Self::check_public_response(response).await?;
        Ok(())
    }
}
