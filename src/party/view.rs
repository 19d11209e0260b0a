//! Read-side projections for screens and the push channel

use super::engine::PartyStats;
use super::ordering::SongView;
use super::song::{SongBook, SongStatus};
use serde::Serialize;
use std::collections::BTreeMap;

/// Raw party stats plus the derived tallies every screen shows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    #[serde(flatten)]
    pub stats: PartyStats,
    pub total_queued: usize,
    pub total_completed: usize,
    pub drunk_o_meter: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MicHog {
    pub guest_name: String,
    pub song_count: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HallOfFame {
    pub mic_hog: Option<MicHog>,
    pub one_hit_wonder_count: usize,
}

/// Everything a screen needs to redraw, sent on every queue change
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub queue: Vec<SongView>,
    pub current: Option<SongView>,
    pub stats: StatsView,
    pub hall_of_fame: HallOfFame,
}

pub fn stats_view(stats: &PartyStats, songs: &SongBook) -> StatsView {
    let total_completed = songs.count_with_status(SongStatus::Completed);
    StatsView {
        stats: stats.clone(),
        total_queued: songs.count_with_status(SongStatus::Queued),
        total_completed,
        drunk_o_meter: drunk_o_meter(total_completed),
    }
}

/// Party intensity gauge: five points per completed song, pegged at 100
pub fn drunk_o_meter(total_completed: usize) -> u8 {
    std::cmp::min(100, total_completed * 5) as u8
}

/// Completed-song leaderboard. The mic hog is whoever has completed the
/// most songs (earliest name alphabetically on a tie); one-hit wonders
/// are guests who performed exactly once. Counted by the display-name
/// snapshot, same as the screens show it.
pub fn hall_of_fame(songs: &SongBook) -> HallOfFame {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for song in songs
        .entries()
        .iter()
        .filter(|s| s.status == SongStatus::Completed)
    {
        *counts.entry(song.guest_name.as_str()).or_default() += 1;
    }

    let mut mic_hog: Option<MicHog> = None;
    for (name, count) in &counts {
        let beats_leader = mic_hog.as_ref().map_or(true, |m| *count > m.song_count);
        if beats_leader {
            mic_hog = Some(MicHog {
                guest_name: name.to_string(),
                song_count: *count,
            });
        }
    }

    let one_hit_wonder_count = counts.values().filter(|c| **c == 1).count();
    HallOfFame {
        mic_hog,
        one_hit_wonder_count,
    }
}
