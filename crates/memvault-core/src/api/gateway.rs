//! Bearer-token gateway for protected backend calls.
//!
//! Every call that needs authentication is described by an
//! [`AuthenticatedRequest`] and sent through [`Gateway::call`], which refuses
//! to touch the network without a usable session. A rejected token comes back
//! as [`ApiError::Unauthenticated`]; clearing the session and redirecting is
//! up to the caller. Tokens are never refreshed here: the backend offers no
//! refresh endpoint, so an expired token means signing in again.

use reqwest::{header, multipart, Method, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::Session;
use crate::models::DataEnvelope;
use crate::upload::{UploadFile, UPLOAD_FIELD_NAME};

use super::client::ApiClient;
use super::error::{ApiError, ApiResult};

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    File(UploadFile),
}

/// One protected backend call. Built per call; holds no token.
#[derive(Debug, Clone)]
pub struct AuthenticatedRequest {
    pub method: Method,
    pub segments: Vec<String>,
    pub body: RequestBody,
}

impl AuthenticatedRequest {
    fn new(method: Method, segments: &[&str], body: RequestBody) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            body,
        }
    }

    pub fn get(segments: &[&str]) -> Self {
        Self::new(Method::GET, segments, RequestBody::Empty)
    }

    pub fn delete(segments: &[&str]) -> Self {
        Self::new(Method::DELETE, segments, RequestBody::Empty)
    }

    pub fn post_json(segments: &[&str], body: serde_json::Value) -> Self {
        Self::new(Method::POST, segments, RequestBody::Json(body))
    }

    pub fn upload(segments: &[&str], file: UploadFile) -> Self {
        Self::new(Method::POST, segments, RequestBody::File(file))
    }

    /// `/api/files`-style path for log lines
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Clone is cheap - shares the underlying connection pool.
#[derive(Clone, Debug)]
pub struct Gateway {
    api: ApiClient,
}

impl Gateway {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Send `request` with the session's bearer token.
    ///
    /// Without a session (or with an empty token) this fails with
    /// `Unauthenticated` before any network activity.
    pub async fn call(&self, request: AuthenticatedRequest, session: Option<&Session>) -> ApiResult<Response> {
        let session = match session {
            Some(s) if s.has_token() => s,
            _ => {
                debug!(path = %request.path(), "No session, refusing protected call");
                return Err(ApiError::Unauthenticated);
            }
        };

        let url = self.api.endpoint(&request.segments)?;
        let path = request.path();
        let method = request.method.clone();

        let builder = self
            .api
            .http()
            .request(request.method, url)
            .header(header::ACCEPT, "application/json")
            .bearer_auth(&session.token);

        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::File(file) => {
                file.validate()?;
                let size = file.len();
                let part = multipart::Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(file.mime)?;
                debug!(path = %path, size, "Uploading file");
                builder.multipart(multipart::Form::new().part(UPLOAD_FIELD_NAME, part))
            }
        };

        let response = builder.send().await?;
        let status = response.status();
        debug!(method = %method, path = %path, status = status.as_u16(), "Protected call");

        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status, &body);
            if err.is_unauthenticated() {
                warn!(path = %path, status = status.as_u16(), "Token rejected by backend");
            }
            Err(err)
        }
    }

    /// `call`, then decode a `{ "data": ... }` envelope.
    pub async fn call_data<T: DeserializeOwned>(
        &self,
        request: AuthenticatedRequest,
        session: Option<&Session>,
    ) -> ApiResult<T> {
        let path = request.path();
        let response = self.call(request, session).await?;
        let text = response.text().await?;
        let envelope: DataEnvelope<T> = serde_json::from_str(&text).map_err(|e| {
            warn!(path = %path, error = %e, "Failed to parse response");
            ApiError::InvalidResponse(format!("{}: {}", path, e))
        })?;
        Ok(envelope.data)
    }

    /// `call` for endpoints whose body the client ignores.
    pub async fn call_unit(&self, request: AuthenticatedRequest, session: Option<&Session>) -> ApiResult<()> {
        self.call(request, session).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unroutable_gateway() -> Gateway {
        // Port 9 on loopback: any attempt would fail with a network error, not Unauthenticated
        Gateway::new(ApiClient::new("http://127.0.0.1:9").unwrap())
    }

    #[tokio::test]
    async fn test_absent_session_is_unauthenticated() {
        let gw = unroutable_gateway();
        let err = gw
            .call(AuthenticatedRequest::get(&["api", "files"]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_empty_token_is_unauthenticated() {
        let gw = unroutable_gateway();
        let session = Session::new("u-1".into(), "rina".into(), "   ".into());
        let err = gw
            .call(AuthenticatedRequest::delete(&["api", "memories", "note", "n1"]), Some(&session))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[test]
    fn test_request_path() {
        let req = AuthenticatedRequest::post_json(&["api", "memories", "note"], serde_json::json!({}));
        assert_eq!(req.path(), "/api/memories/note");
        assert_eq!(req.method, Method::POST);
    }
}
