//! Audio note timeline and the playback clock it is synced against.
//!
//! No audio is decoded here. `Playback` only tracks a position that the UI
//! advances on each tick; the timeline highlights the note closest to it.

use std::time::Duration;

use crate::models::Note;

/// A note is active while the playback position is strictly within this
/// many seconds of its timestamp.
pub const ACTIVE_WINDOW_SECS: f64 = 2.0;

/// Notes of one track, always sorted ascending by timestamp.
#[derive(Debug, Clone, Default)]
pub struct NoteTimeline {
    notes: Vec<Note>,
}

impl NoteTimeline {
    pub fn new(mut notes: Vec<Note>) -> Self {
        notes.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Self { notes }
    }

    /// Replace the notes after a refetch.
    pub fn replace(&mut self, notes: Vec<Note>) {
        *self = Self::new(notes);
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    pub fn is_active(note: &Note, position_secs: f64) -> bool {
        (position_secs - note.timestamp).abs() < ACTIVE_WINDOW_SECS
    }

    /// Indices of every note inside the active window at `position_secs`.
    pub fn active_indices(&self, position_secs: f64) -> Vec<usize> {
        self.notes
            .iter()
            .enumerate()
            .filter(|(_, n)| Self::is_active(n, position_secs))
            .map(|(i, _)| i)
            .collect()
    }

    /// The active note nearest to `position_secs`, if any.
    pub fn active_index(&self, position_secs: f64) -> Option<usize> {
        self.active_indices(position_secs).into_iter().min_by(|&a, &b| {
            let da = (position_secs - self.notes[a].timestamp).abs();
            let db = (position_secs - self.notes[b].timestamp).abs();
            da.total_cmp(&db)
        })
    }
}

/// Playback position of the track shown in the detail view.
#[derive(Debug, Clone, Default)]
pub struct Playback {
    position: f64,
    duration: Option<f64>,
    playing: bool,
}

impl Playback {
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            position: 0.0,
            duration: duration.filter(|d| d.is_finite() && *d > 0.0),
            playing: false,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn toggle(&mut self) {
        if !self.playing && self.at_end() {
            self.position = 0.0;
        }
        self.playing = !self.playing;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Move to `secs`, clamped to the track.
    pub fn seek(&mut self, secs: f64) {
        let mut pos = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
        if let Some(d) = self.duration {
            pos = pos.min(d);
        }
        self.position = pos;
    }

    pub fn seek_by(&mut self, delta_secs: f64) {
        self.seek(self.position + delta_secs);
    }

    /// Jump to a note's timestamp.
    pub fn jump_to(&mut self, note: &Note) {
        self.seek(note.timestamp);
    }

    /// Advance by wall-clock `elapsed` while playing; stops at the end.
    pub fn advance(&mut self, elapsed: Duration) {
        if !self.playing {
            return;
        }
        self.seek(self.position + elapsed.as_secs_f64());
        if self.at_end() {
            self.playing = false;
        }
    }

    fn at_end(&self) -> bool {
        self.duration.map(|d| self.position >= d).unwrap_or(false)
    }
}
