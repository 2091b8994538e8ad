//! Typed operations on the protected vault endpoints.

use tracing::{debug, info};

use crate::auth::SessionStore;
use crate::models::{DiaryEntry, FileDetail, FileItem, Mood, NewNote};
use crate::upload::UploadFile;

use super::error::{ApiError, ApiResult};
use super::gateway::{AuthenticatedRequest, Gateway};

/// Vault operations bound to a session store.
///
/// Each call reads the current session at call time. A successful call marks
/// the session verified; an `Unauthenticated` error is returned untouched so
/// the caller can clear the store and redirect.
#[derive(Clone)]
pub struct Vault {
    gateway: Gateway,
    store: SessionStore,
}

impl Vault {
    pub fn new(gateway: Gateway, store: SessionStore) -> Self {
        Self { gateway, store }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    fn accepted<T>(&self, result: ApiResult<T>) -> ApiResult<T> {
        if result.is_ok() {
            self.store.mark_verified();
        }
        result
    }

    /// `GET /api/files`, newest first as the backend returns them
    pub async fn list_files(&self) -> ApiResult<Vec<FileItem>> {
        let session = self.store.get();
        let result: ApiResult<Vec<FileItem>> = self
            .gateway
            .call_data(AuthenticatedRequest::get(&["api", "files"]), session.as_ref())
            .await;
        if let Ok(ref files) = result {
            debug!(count = files.len(), "Fetched gallery");
        }
        self.accepted(result)
    }

    /// `POST /api/files` as multipart field `file`
    pub async fn upload_file(&self, file: UploadFile) -> ApiResult<()> {
        file.validate()?;
        let session = self.store.get();
        let name = file.file_name.clone();
        let result = self
            .gateway
            .call_unit(AuthenticatedRequest::upload(&["api", "files"], file), session.as_ref())
            .await;
        if result.is_ok() {
            info!(file = %name, "File uploaded");
        }
        self.accepted(result)
    }

    /// `GET /api/memories/{file_id}`: the file with its diary entry and notes
    pub async fn fetch_file(&self, file_id: &str) -> ApiResult<FileDetail> {
        let session = self.store.get();
        let result = self
            .gateway
            .call_data(AuthenticatedRequest::get(&["api", "memories", file_id]), session.as_ref())
            .await;
        self.accepted(result)
    }

    /// `POST /api/memories`: create or overwrite the file's diary entry
    pub async fn save_diary(&self, file_id: &str, content: &str, mood: Mood) -> ApiResult<()> {
        let entry = DiaryEntry {
            file_id: file_id.to_string(),
            content: content.to_string(),
            mood,
        };
        let body = serde_json::to_value(&entry)
            .map_err(|e| ApiError::InvalidResponse(format!("diary entry: {}", e)))?;
        let session = self.store.get();
        let result = self
            .gateway
            .call_unit(AuthenticatedRequest::post_json(&["api", "memories"], body), session.as_ref())
            .await;
        self.accepted(result)
    }

    /// `POST /api/memories/note`; the position is floored to whole seconds.
    pub async fn add_note(&self, file_id: &str, position_secs: f64, content: &str) -> ApiResult<()> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ApiError::ValidationFailure("Note is empty".into()));
        }
        let note = NewNote {
            file_id: file_id.to_string(),
            timestamp: whole_seconds(position_secs),
            content: content.to_string(),
        };
        let body = serde_json::to_value(&note)
            .map_err(|e| ApiError::InvalidResponse(format!("note: {}", e)))?;
        let session = self.store.get();
        let result = self
            .gateway
            .call_unit(AuthenticatedRequest::post_json(&["api", "memories", "note"], body), session.as_ref())
            .await;
        self.accepted(result)
    }

    /// `DELETE /api/memories/note/{note_id}`
    pub async fn delete_note(&self, note_id: &str) -> ApiResult<()> {
        let session = self.store.get();
        let result = self
            .gateway
            .call_unit(AuthenticatedRequest::delete(&["api", "memories", "note", note_id]), session.as_ref())
            .await;
        self.accepted(result)
    }
}

/// Floor a playback position to whole seconds; NaN and negatives become 0.
pub fn whole_seconds(position_secs: f64) -> u64 {
    if position_secs.is_finite() && position_secs > 0.0 {
        position_secs.floor() as u64
    } else {
        0
    }
}
