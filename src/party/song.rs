//! Song entries and their lifecycle
//!
//! Entries move queued -> current -> completed (or skipped) and are never
//! reused. Ids are small monotonic integers so the KJ can read them out
//! loud; the counter only rewinds on a full party reset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a song entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SongStatus {
    Queued,
    Current,
    Completed,
    Skipped,
}

/// One submitted song
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongEntry {
    pub id: u64,
    pub guest_id: String,
    /// Display name snapshot taken at submission; later renames do not
    /// rewrite history
    pub guest_name: String,
    pub song_title: String,
    pub video_url: String,
    pub video_id: String,
    /// Announcer persona chosen at submission; empty means the default
    #[serde(default)]
    pub voice_persona: String,
    pub status: SongStatus,
    /// Manual queue position; lower sorts earlier, -1 pins to the front.
    /// Set by the KJ or by a VIP fast-track, persists until party reset.
    pub position_override: Option<i64>,
    pub submitted_at: DateTime<Utc>,
    /// Stamped when the entry becomes current
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// All song entries plus the id counter
#[derive(Debug, Clone)]
pub struct SongBook {
    entries: Vec<SongEntry>,
    next_id: u64,
}

impl Default for SongBook {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl SongBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(entries: Vec<SongEntry>, next_id: u64) -> Self {
        Self { entries, next_id }
    }

    pub fn entries(&self) -> &[SongEntry] {
        &self.entries
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Append a new queued entry and return it
    pub fn submit(
        &mut self,
        guest_id: &str,
        guest_name: &str,
        song_title: &str,
        video_url: &str,
        video_id: &str,
        voice_persona: &str,
    ) -> &SongEntry {
        let entry = SongEntry {
            id: self.next_id,
            guest_id: guest_id.to_string(),
            guest_name: guest_name.to_string(),
            song_title: song_title.trim().to_string(),
            video_url: video_url.to_string(),
            video_id: video_id.to_string(),
            voice_persona: voice_persona.to_string(),
            status: SongStatus::Queued,
            position_override: None,
            submitted_at: Utc::now(),
            started_at: None,
            completed_at: None,
        };
        self.next_id += 1;
        self.entries.push(entry);
        self.entries.last().expect("entry just pushed")
    }

    pub fn get(&self, id: u64) -> Option<&SongEntry> {
        self.entries.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut SongEntry> {
        self.entries.iter_mut().find(|s| s.id == id)
    }

    /// The entry currently on stage, if any
    pub fn current(&self) -> Option<&SongEntry> {
        self.entries.iter().find(|s| s.status == SongStatus::Current)
    }

    /// Remove an entry only while it is still queued; returns whether
    /// anything was removed
    pub fn remove_queued(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|s| !(s.id == id && s.status == SongStatus::Queued));
        self.entries.len() != before
    }

    pub fn count_with_status(&self, status: SongStatus) -> usize {
        self.entries.iter().filter(|s| s.status == status).count()
    }

    /// All entries submitted by one guest, newest first
    pub fn by_guest(&self, guest_id: &str) -> Vec<SongEntry> {
        let mut songs: Vec<SongEntry> = self
            .entries
            .iter()
            .filter(|s| s.guest_id == guest_id)
            .cloned()
            .collect();
        songs.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(b.id.cmp(&a.id)));
        songs
    }

    /// Drop every entry and rewind the id counter
    pub fn reset(&mut self) {
        self.entries.clear();
        self.next_id = 1;
    }
}
