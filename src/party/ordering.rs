//! Queue ordering
//!
//! The displayed queue is computed, never stored. Precedence:
//!
//! 1. Position overrides (present before absent, ascending value, -1 is
//!    the absolute front)
//! 2. Fewer completed songs tonight
//! 3. Earlier submission time
//!
//! The entry id is the final tie-break so two same-instant submissions
//! from equally-thirsty guests cannot swap places between recomputations.

use super::guest::GuestRegistry;
use super::song::{SongEntry, SongStatus};
use serde::Serialize;

/// A song entry joined with the live per-guest fairness fields
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongView {
    #[serde(flatten)]
    pub song: SongEntry,
    pub songs_completed: u32,
    pub is_vip: bool,
    pub skip_used: bool,
}

/// Join one entry with its guest's current fairness fields
pub fn song_view(song: &SongEntry, guests: &GuestRegistry) -> SongView {
    let guest = guests.get(&song.guest_id);
    SongView {
        song: song.clone(),
        songs_completed: guest.map(|g| g.songs_completed).unwrap_or(0),
        is_vip: guest.map(|g| g.is_vip).unwrap_or(false),
        skip_used: guest.map(|g| g.skip_used).unwrap_or(false),
    }
}

/// The queued entries in performance order
pub fn queue_order(songs: &[SongEntry], guests: &GuestRegistry) -> Vec<SongView> {
    let mut queue: Vec<SongView> = songs
        .iter()
        .filter(|s| s.status == SongStatus::Queued)
        .map(|s| song_view(s, guests))
        .collect();

    queue.sort_by_key(|v| {
        (
            v.song.position_override.is_none(),
            v.song.position_override.unwrap_or(0),
            v.songs_completed,
            v.song.submitted_at,
            v.song.id,
        )
    });
    queue
}

/// The entry on stage, joined with its guest's fields
pub fn current_song(songs: &[SongEntry], guests: &GuestRegistry) -> Option<SongView> {
    songs
        .iter()
        .find(|s| s.status == SongStatus::Current)
        .map(|s| song_view(s, guests))
}
