//! JSON file persistence
//!
//! The whole party serializes to one pretty-printed JSON blob so a KJ can
//! inspect or hand-edit it between sessions. Saves are fire-and-forget:
//! a background task rewrites the file after each mutation and every 30
//! seconds, and a write failure is logged without touching the party.

use crate::error::Result;
use crate::party::engine::PartyStats;
use crate::party::{Guest, GuestRegistry, Party, SongBook, SongEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

/// Seconds between periodic background saves
pub const AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// On-disk shape of the party file
///
/// Field defaults keep older or hand-trimmed files loadable; anything
/// missing starts fresh.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedParty {
    #[serde(default)]
    pub guests: HashMap<String, Guest>,
    #[serde(default)]
    pub songs: Vec<SongEntry>,
    #[serde(default = "first_song_id")]
    pub song_id_counter: u64,
    #[serde(default = "PartyStats::fresh")]
    pub stats: PartyStats,
}

fn first_song_id() -> u64 {
    1
}

impl From<&Party> for PersistedParty {
    fn from(party: &Party) -> Self {
        Self {
            guests: party.guests.as_map().clone(),
            songs: party.songs.entries().to_vec(),
            song_id_counter: party.songs.next_id(),
            stats: party.stats.clone(),
        }
    }
}

impl PersistedParty {
    pub fn into_party(self) -> Party {
        Party::from_parts(
            GuestRegistry::from_map(self.guests),
            SongBook::from_parts(self.songs, self.song_id_counter),
            self.stats,
        )
    }
}

/// Load/save interface for the party file
#[derive(Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the party file. `Ok(None)` when no file exists yet; a parse
    /// failure is an error so the caller can decide what a corrupt file
    /// means.
    pub async fn load(&self) -> Result<Option<PersistedParty>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let data: PersistedParty = serde_json::from_str(&raw)?;
        Ok(Some(data))
    }

    /// Write the party file atomically (temp file then rename)
    pub async fn save(&self, data: &PersistedParty) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Requests a background save; safe to call from any handler
#[derive(Clone)]
pub struct SaveHandle {
    tx: watch::Sender<()>,
}

impl SaveHandle {
    /// Mark the party dirty. Consecutive requests coalesce into one write.
    pub fn request_save(&self) {
        let _ = self.tx.send(());
    }
}

/// Spawn the autosave task: writes after each requested save and on a
/// fixed interval regardless
pub fn spawn_autosaver(party: Arc<Mutex<Party>>, store: JsonStore) -> SaveHandle {
    let (tx, mut rx) = watch::channel(());

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(AUTOSAVE_INTERVAL_SECS));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The interval fires immediately; skip that first tick
        interval.tick().await;

        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = interval.tick() => {}
            }

            let snapshot = PersistedParty::from(&*party.lock().await);
            match store.save(&snapshot).await {
                Ok(()) => tracing::debug!(path = %store.path().display(), "party state saved"),
                Err(e) => tracing::warn!(error = %e, "failed to save party state"),
            }
        }
    });

    SaveHandle { tx }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> JsonStore {
        JsonStore::new(dir.path().join("party.json"))
    }

    #[tokio::test]
    async fn load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_round_trips_party_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut party = Party::new();
        party.register_guest("dev-1", "Ana", false).unwrap();
        let entry = party
            .submit_song("dev-1", "Creep", "https://youtu.be/abc123XYZ_w", "")
            .unwrap();

        store.save(&PersistedParty::from(&party)).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap().into_party();

        assert!(loaded.guest_view("dev-1").0.is_some());
        assert_eq!(loaded.snapshot().queue.len(), 1);
        assert_eq!(loaded.snapshot().queue[0].song.id, entry.id);
    }

    #[tokio::test]
    async fn file_keys_are_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .save(&PersistedParty::from(&Party::new()))
            .await
            .unwrap();

        let raw = tokio::fs::read_to_string(store.path()).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(json.get("songIdCounter").is_some());
        assert!(json["stats"].get("totalSongsPlayed").is_some());
        assert!(json["stats"].get("partyStartedAt").is_some());
    }

    #[tokio::test]
    async fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        tokio::fs::write(store.path(), r#"{"songIdCounter": 7}"#)
            .await
            .unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert!(loaded.guests.is_empty());
        assert!(loaded.songs.is_empty());
        assert_eq!(loaded.song_id_counter, 7);
        assert_eq!(loaded.stats.total_songs_played, 0);
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        tokio::fs::write(store.path(), "not json {").await.unwrap();
        assert!(store.load().await.is_err());
    }

    #[tokio::test]
    async fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested").join("party.json"));

        store
            .save(&PersistedParty::from(&Party::new()))
            .await
            .unwrap();
        assert!(store.path().exists());
    }
}
