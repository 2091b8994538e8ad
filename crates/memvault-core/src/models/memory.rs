//! Diary entries and timestamped audio notes.

use serde::{Deserialize, Serialize};

/// Mood attached to a diary entry.
///
/// Moods the form does not offer are kept verbatim in `Other` so saving an
/// entry never rewrites them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Mood {
    #[default]
    Happy,
    Nostalgia,
    Sad,
    Excited,
    Other(String),
}

impl Mood {
    /// Moods offered by the diary form, in display order.
    pub const CHOICES: [Mood; 4] = [Mood::Happy, Mood::Nostalgia, Mood::Sad, Mood::Excited];

    pub fn label(&self) -> &str {
        match self {
            Mood::Happy => "Happy",
            Mood::Nostalgia => "Nostalgia",
            Mood::Sad => "Sad",
            Mood::Excited => "Excited",
            Mood::Other(raw) => raw,
        }
    }

    /// Next choice in the form's selector (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Mood::Happy => Mood::Nostalgia,
            Mood::Nostalgia => Mood::Sad,
            Mood::Sad => Mood::Excited,
            Mood::Excited | Mood::Other(_) => Mood::Happy,
        }
    }

    /// Previous choice in the form's selector (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Mood::Happy | Mood::Other(_) => Mood::Excited,
            Mood::Nostalgia => Mood::Happy,
            Mood::Sad => Mood::Nostalgia,
            Mood::Excited => Mood::Sad,
        }
    }
}

impl From<String> for Mood {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Happy" => Mood::Happy,
            "Nostalgia" => Mood::Nostalgia,
            "Sad" => Mood::Sad,
            "Excited" => Mood::Excited,
            _ => Mood::Other(raw),
        }
    }
}

impl From<Mood> for String {
    fn from(mood: Mood) -> Self {
        match mood {
            Mood::Other(raw) => raw,
            known => known.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub mood: Mood,
}

/// A comment pinned to a position (in seconds) of an audio track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub timestamp: f64,
    #[serde(default)]
    pub content: String,
}

/// Request body for `POST /api/memories`.
#[derive(Debug, Clone, Serialize)]
pub struct DiaryEntry {
    #[serde(rename = "fileId")]
    pub file_id: String,
    pub content: String,
    pub mood: Mood,
}

/// Request body for `POST /api/memories/note`.
#[derive(Debug, Clone, Serialize)]
pub struct NewNote {
    #[serde(rename = "fileId")]
    pub file_id: String,
    pub timestamp: u64,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_cycle() {
        let mut mood = Mood::Happy;
        for _ in 0..Mood::CHOICES.len() {
            mood = mood.next();
        }
        assert_eq!(mood, Mood::Happy);
        assert_eq!(Mood::Happy.prev(), Mood::Excited);
        assert_eq!(Mood::Other("Angry".into()).next(), Mood::Happy);
    }

    #[test]
    fn test_unknown_mood_is_saved_back_verbatim() {
        let m: Memory = serde_json::from_str(r#"{"id":"m1","content":"hi","mood":"Angry"}"#)
            .expect("Failed to parse memory test JSON");
        assert_eq!(m.mood, Mood::Other("Angry".into()));
        assert_eq!(m.mood.label(), "Angry");

        let entry = DiaryEntry {
            file_id: "f1".into(),
            content: m.content,
            mood: m.mood,
        };
        let v = serde_json::to_value(&entry).expect("serialize diary entry");
        assert_eq!(v["mood"], "Angry");
    }

    #[test]
    fn test_missing_mood_defaults_to_happy() {
        let m: Memory = serde_json::from_str(r#"{"id":"m1"}"#).expect("parse memory");
        assert_eq!(m.mood, Mood::Happy);
    }

    #[test]
    fn test_diary_entry_wire_format() {
        let entry = DiaryEntry {
            file_id: "f1".into(),
            content: "Dulu waktu foto ini diambil".into(),
            mood: Mood::Nostalgia,
        };
        let v = serde_json::to_value(&entry).expect("serialize diary entry");
        assert_eq!(v["fileId"], "f1");
        assert_eq!(v["mood"], "Nostalgia");
    }
}
