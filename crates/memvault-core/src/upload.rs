//! Client-side checks for file uploads.
//!
//! The size cap here only saves the user a pointless upload; the backend
//! enforces the authoritative limit.

use std::path::Path;

use tracing::debug;

use crate::api::{ApiError, ApiResult};

/// Largest file accepted for upload (10 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Multipart field name the backend reads the file from
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Reject sizes above `MAX_UPLOAD_BYTES`; exactly the limit is allowed.
pub fn validate_upload_size(len: u64) -> ApiResult<()> {
    if len > MAX_UPLOAD_BYTES {
        return Err(ApiError::ValidationFailure(format!(
            "File too large ({}). Maximum is 10 MB.",
            format_size(len)
        )));
    }
    Ok(())
}

/// Human-readable byte count, e.g. `3.2 MB`
pub fn format_size(len: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let len_f = len as f64;
    if len_f >= MB {
        format!("{:.1} MB", len_f / MB)
    } else if len_f >= KB {
        format!("{:.1} KB", len_f / KB)
    } else {
        format!("{} B", len)
    }
}

/// Guess a content type from the file extension.
pub fn mime_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

/// A file that passed client-side validation and is ready to send.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Validate and wrap in-memory contents.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> ApiResult<Self> {
        let file_name = file_name.into();
        if file_name.trim().is_empty() {
            return Err(ApiError::ValidationFailure("File name is empty".into()));
        }
        validate_upload_size(bytes.len() as u64)?;
        let mime = mime_for(&file_name);
        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }

    /// Read a file from disk. The size is checked from metadata before any
    /// bytes are read.
    pub async fn from_path(path: &Path) -> ApiResult<Self> {
        let meta = tokio::fs::metadata(path).await.map_err(|e| {
            ApiError::ValidationFailure(format!("Cannot read {}: {}", path.display(), e))
        })?;
        if !meta.is_file() {
            return Err(ApiError::ValidationFailure(format!(
                "{} is not a file",
                path.display()
            )));
        }
        validate_upload_size(meta.len())?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ApiError::ValidationFailure("File name is not valid UTF-8".into()))?
            .to_string();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ApiError::ValidationFailure(format!("Cannot read {}: {}", path.display(), e))
        })?;
        debug!(file = %file_name, size = bytes.len(), "Upload prepared");
        Self::from_bytes(file_name, bytes)
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Re-check the size; called by the gateway right before sending.
    pub fn validate(&self) -> ApiResult<()> {
        validate_upload_size(self.len())
    }
}
