use anyhow::Context;
use tracing::{error, info};

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::models::AuthResponse;

use super::session::{Session, SessionStore};

/// A sign-in attempt. Lives only until it is exchanged; never written to disk.
pub enum Credential {
    Password {
        username: String,
        password: String,
    },
    /// Identity asserted by an external provider (Google)
    ExternalIdentity {
        email: String,
        display_name: String,
        avatar_url: Option<String>,
    },
}

impl Credential {
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credential::Password {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn external(
        email: impl Into<String>,
        display_name: impl Into<String>,
        avatar_url: Option<String>,
    ) -> Self {
        Credential::ExternalIdentity {
            email: email.into(),
            display_name: display_name.into(),
            avatar_url,
        }
    }

    /// The name shown if the backend does not send one back
    fn fallback_name(&self) -> &str {
        match self {
            Credential::Password { username, .. } => username.as_str(),
            Credential::ExternalIdentity { display_name, email, .. } => {
                if display_name.trim().is_empty() {
                    email.as_str()
                } else {
                    display_name.as_str()
                }
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Credential::Password { .. } => "password",
            Credential::ExternalIdentity { .. } => "external",
        }
    }

    fn check_filled(&self) -> ApiResult<()> {
        let missing = match self {
            Credential::Password { username, password } => {
                username.trim().is_empty() || password.is_empty()
            }
            Credential::ExternalIdentity { email, .. } => email.trim().is_empty(),
        };
        if missing {
            let msg = match self {
                Credential::Password { .. } => "Username and password required",
                Credential::ExternalIdentity { .. } => "Email required",
            };
            return Err(ApiError::ValidationFailure(msg.into()));
        }
        Ok(())
    }
}

// Passwords must never show up in logs
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credential::ExternalIdentity { email, display_name, avatar_url } => f
                .debug_struct("ExternalIdentity")
                .field("email", email)
                .field("display_name", display_name)
                .field("avatar_url", avatar_url)
                .finish(),
        }
    }
}

/// Turn a credential into a session with exactly one backend call. No retries.
///
/// External identities are provisioned or linked by the backend, keyed on the
/// email, so repeating the exchange yields the same user id.
pub async fn exchange(api: &ApiClient, credential: Credential) -> ApiResult<Session> {
    credential.check_filled()?;

    let response = match &credential {
        Credential::Password { username, password } => api.login(username.trim(), password).await,
        Credential::ExternalIdentity { email, display_name, avatar_url } => {
            api.login_external(email.trim(), display_name, avatar_url.as_deref())
                .await
        }
    };

    match response {
        Ok(auth) => {
            let session = session_from_response(auth, credential.fallback_name())?;
            info!(user_id = %session.user_id, kind = credential.kind(), "Credential exchange succeeded");
            Ok(session)
        }
        Err(e) => {
            error!(error = %e, kind = credential.kind(), "Credential exchange failed");
            Err(e)
        }
    }
}

fn session_from_response(auth: AuthResponse, fallback_name: &str) -> ApiResult<Session> {
    let token = auth
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or(ApiError::InvalidCredentials)?;
    let user = auth
        .user
        .ok_or_else(|| ApiError::InvalidResponse("auth response has no user".into()))?;
    let display_name = user
        .username
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| fallback_name.to_string());
    Ok(Session::new(user.id, display_name, token))
}

/// Exchange and store the resulting session, replacing any previous one.
pub async fn sign_in(api: &ApiClient, store: &SessionStore, credential: Credential) -> anyhow::Result<Session> {
    let session = exchange(api, credential).await?;
    store
        .set(session.clone())
        .context("Failed to save session")?;
    Ok(session)
}

/// Drop the current session. Idempotent.
pub fn sign_out(store: &SessionStore) -> anyhow::Result<()> {
    store.clear()?;
    info!("Signed out");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn user(id: &str, name: Option<&str>) -> User {
        User {
            id: id.into(),
            username: name.map(String::from),
            email: None,
            avatar: None,
        }
    }

    #[test]
    fn test_session_from_response() {
        let auth = AuthResponse {
            token: Some("tok".into()),
            user: Some(user("u-9", Some("rina"))),
        };
        let s = session_from_response(auth, "ignored").unwrap();
        assert_eq!(s.token, "tok");
        assert_eq!(s.user_id, "u-9");
        assert_eq!(s.display_name, "rina");
    }

    #[test]
    fn test_missing_token_is_invalid_credentials() {
        let auth = AuthResponse {
            token: None,
            user: Some(user("u-9", None)),
        };
        assert!(matches!(
            session_from_response(auth, "x"),
            Err(ApiError::InvalidCredentials)
        ));

        let auth = AuthResponse {
            token: Some("".into()),
            user: Some(user("u-9", None)),
        };
        assert!(matches!(
            session_from_response(auth, "x"),
            Err(ApiError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_display_name_falls_back() {
        let auth = AuthResponse {
            token: Some("tok".into()),
            user: Some(user("u-9", None)),
        };
        let s = session_from_response(auth, "fallback").unwrap();
        assert_eq!(s.display_name, "fallback");

        let cred = Credential::external("a@b.c", "", None);
        assert_eq!(cred.fallback_name(), "a@b.c");
    }

    #[tokio::test]
    async fn test_blank_credentials_rejected_before_network() {
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        assert!(matches!(
            exchange(&api, Credential::password("", "secret")).await,
            Err(ApiError::ValidationFailure(_))
        ));
        assert!(matches!(
            exchange(&api, Credential::external("  ", "Rina", None)).await,
            Err(ApiError::ValidationFailure(_))
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", Credential::password("rina", "hunter2"));
        assert!(rendered.contains("rina"));
        assert!(!rendered.contains("hunter2"));
    }
}
