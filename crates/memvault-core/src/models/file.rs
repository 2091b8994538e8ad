//! Uploaded files as returned by `/api/files` and `/api/memories/{fileId}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::memory::{Memory, Note};

/// The backend wraps every resource payload in `{ "data": ... }`.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileKind {
    Photo,
    Audio,
    Video,
    #[serde(other)]
    Other,
}

impl FileKind {
    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Photo => "PHOTO",
            FileKind::Audio => "AUDIO",
            FileKind::Video => "VIDEO",
            FileKind::Other => "OTHER",
        }
    }

    /// Whether the detail view shows the player and note timeline.
    /// Everything except photos gets one.
    pub fn is_playable(&self) -> bool {
        !matches!(self, FileKind::Photo)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileItem {
    pub id: String,
    #[serde(rename = "originalName")]
    pub original_name: String,
    pub filename: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl FileItem {
    pub fn created_date(&self) -> String {
        self.created_at
            .map(|dt| dt.format("%b %d, %Y").to_string())
            .unwrap_or_default()
    }
}

/// A file together with its diary entry and audio notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDetail {
    pub id: String,
    #[serde(rename = "originalName")]
    pub original_name: String,
    pub filename: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(default)]
    pub memory: Option<Memory>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_files_envelope() {
        let json = r#"{"data":[
            {"id":"f1","originalName":"beach.jpg","filename":"1700-beach.jpg","path":"uploads/1700-beach.jpg","type":"PHOTO","createdAt":"2024-05-01T10:00:00.000Z"},
            {"id":"f2","originalName":"song.mp3","filename":"1701-song.mp3","path":"uploads/1701-song.mp3","type":"AUDIO","createdAt":"2024-05-02T10:00:00.000Z"},
            {"id":"f3","originalName":"doc.pdf","filename":"1702-doc.pdf","type":"DOCUMENT","createdAt":null}
        ]}"#;

        let env: DataEnvelope<Vec<FileItem>> = serde_json::from_str(json)
            .expect("Failed to parse files test JSON");
        assert_eq!(env.data.len(), 3);
        assert_eq!(env.data[0].kind, FileKind::Photo);
        assert_eq!(env.data[1].kind, FileKind::Audio);
        assert_eq!(env.data[2].kind, FileKind::Other);
        assert_eq!(env.data[0].created_date(), "May 01, 2024");
        assert_eq!(env.data[2].created_date(), "");
    }

    #[test]
    fn test_parse_detail_without_memory() {
        let json = r#"{"data":{"id":"f2","originalName":"song.mp3","filename":"1701-song.mp3","type":"AUDIO","memory":null}}"#;
        let env: DataEnvelope<FileDetail> = serde_json::from_str(json)
            .expect("Failed to parse detail test JSON");
        assert!(env.data.memory.is_none());
        assert!(env.data.notes.is_empty());
        assert!(env.data.kind.is_playable());
    }

    #[test]
    fn test_only_photos_lack_a_player() {
        assert!(!FileKind::Photo.is_playable());
        assert!(FileKind::Audio.is_playable());
        assert!(FileKind::Video.is_playable());
        assert!(FileKind::Other.is_playable());
    }
}
