//! Turn-taking engine
//!
//! `Party` owns all mutable party state (registry, song book, stats,
//! reaction window) and exposes one method per transition. Every method
//! validates all of its preconditions before touching any state, so a
//! rejected call leaves nothing half-written. Invariant: at most one
//! entry is `current` at any time.
//!
//! KJ transitions are lenient no-ops when their subject is absent; guest
//! self-service transitions are strict and return validation or
//! permission errors.

use super::guest::{Guest, GuestRegistry};
use super::ordering::{self, SongView};
use super::reactions::{Reaction, ReactionLog};
use super::song::{SongBook, SongEntry, SongStatus};
use super::video;
use super::view::{self, QueueSnapshot};
use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Persisted party-wide counters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyStats {
    pub total_songs_played: u32,
    pub party_started_at: DateTime<Utc>,
    pub is_paused: bool,
    pub current_song_id: Option<u64>,
}

impl PartyStats {
    pub fn fresh() -> Self {
        Self {
            total_songs_played: 0,
            party_started_at: Utc::now(),
            is_paused: false,
            current_song_id: None,
        }
    }
}

/// A queue entry promoted onto the stage
#[derive(Debug, Clone)]
pub struct StartedSong {
    pub song: SongView,
    /// Crowd mood going into the song, for the announcer
    pub reaction_summary: Option<String>,
    pub drunk_o_meter: u8,
}

/// A performance that just ended
#[derive(Debug, Clone)]
pub struct FinishedSong {
    pub song: SongView,
    pub duration_secs: Option<i64>,
    pub reaction_summary: Option<String>,
}

/// Result of the KJ start operation
#[derive(Debug, Clone)]
pub enum StartOutcome {
    Started(StartedSong),
    AlreadyStarted,
    QueueEmpty,
}

/// Result of the KJ advance operation; either half may be absent
#[derive(Debug, Clone)]
pub struct AdvanceOutcome {
    pub finished: Option<FinishedSong>,
    pub started: Option<StartedSong>,
}

/// Result of the KJ skip operation
#[derive(Debug, Clone)]
pub struct SkipOutcome {
    pub skipped: Option<SongView>,
    pub started: Option<StartedSong>,
}

/// Result of a guest starting their own song
#[derive(Debug, Clone)]
pub struct SelfStartOutcome {
    pub started: StartedSong,
    /// A stalled performance that was force-skipped to free the stage
    pub took_over: Option<SongView>,
}

/// Result of a guest finishing their own song
#[derive(Debug, Clone)]
pub struct SelfDoneOutcome {
    pub finished: FinishedSong,
    /// New queue head, notified that they are up soon
    pub next_up: Option<SongView>,
}

/// All live party state
#[derive(Debug)]
pub struct Party {
    pub(crate) guests: GuestRegistry,
    pub(crate) songs: SongBook,
    pub(crate) stats: PartyStats,
    pub(crate) reactions: ReactionLog,
}

impl Default for Party {
    fn default() -> Self {
        Self::new()
    }
}

impl Party {
    pub fn new() -> Self {
        Self {
            guests: GuestRegistry::new(),
            songs: SongBook::new(),
            stats: PartyStats::fresh(),
            reactions: ReactionLog::new(),
        }
    }

    /// Rebuild a party from persisted state
    pub fn from_parts(guests: GuestRegistry, songs: SongBook, stats: PartyStats) -> Self {
        Self {
            guests,
            songs,
            stats,
            reactions: ReactionLog::new(),
        }
    }

    /// Consistent full snapshot for screens and the push channel
    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            queue: ordering::queue_order(self.songs.entries(), &self.guests),
            current: ordering::current_song(self.songs.entries(), &self.guests),
            stats: view::stats_view(&self.stats, &self.songs),
            hall_of_fame: view::hall_of_fame(&self.songs),
        }
    }

    // ---- Guests ----

    pub fn register_guest(&mut self, device_id: &str, name: &str, is_vip: bool) -> Result<Guest> {
        if device_id.trim().is_empty() || name.trim().is_empty() {
            return Err(Error::validation("Device ID and name required"));
        }
        let guest = self.guests.register(device_id, name, is_vip);
        info!(guest = %guest.name, vip = guest.is_vip, "guest registered");
        Ok(guest)
    }

    /// A guest plus their submissions, newest first. Unknown device ids
    /// are not an error; clients probe before registering.
    pub fn guest_view(&self, device_id: &str) -> (Option<Guest>, Vec<SongEntry>) {
        match self.guests.get(device_id) {
            Some(guest) => (Some(guest.clone()), self.songs.by_guest(device_id)),
            None => (None, Vec::new()),
        }
    }

    // ---- Submissions and reactions ----

    pub fn submit_song(
        &mut self,
        device_id: &str,
        song_title: &str,
        video_url: &str,
        voice_persona: &str,
    ) -> Result<SongEntry> {
        if device_id.trim().is_empty()
            || song_title.trim().is_empty()
            || video_url.trim().is_empty()
        {
            return Err(Error::validation("Missing required fields"));
        }
        let guest = self
            .guests
            .get(device_id)
            .ok_or_else(|| Error::validation("Guest not found. Please register first."))?;
        let video_id = video::extract_video_id(video_url)
            .ok_or_else(|| Error::validation("Invalid video URL"))?;

        let guest_name = guest.name.clone();
        let entry = self
            .songs
            .submit(device_id, &guest_name, song_title, video_url, &video_id, voice_persona)
            .clone();
        info!(id = entry.id, song = %entry.song_title, guest = %entry.guest_name, "song queued");
        Ok(entry)
    }

    pub fn react(&mut self, emoji: &str, guest_name: Option<&str>) -> Result<Reaction> {
        if emoji.trim().is_empty() {
            return Err(Error::validation("Emoji required"));
        }
        let name = guest_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Anonymous");
        Ok(self.reactions.push(emoji, name))
    }

    // ---- KJ transitions (lenient) ----

    /// Put the first song on stage. A no-op success when a performance is
    /// already running or nothing is queued.
    pub fn start_party(&mut self) -> StartOutcome {
        if self.songs.current().is_some() {
            return StartOutcome::AlreadyStarted;
        }
        match self.promote_head() {
            Some(started) => StartOutcome::Started(started),
            None => StartOutcome::QueueEmpty,
        }
    }

    /// Complete the current performance (crediting the performer) and put
    /// the next one on stage.
    pub fn advance(&mut self) -> AdvanceOutcome {
        let finished = self.retire_current(SongStatus::Completed, true);
        let started = self.promote_head();
        AdvanceOutcome { finished, started }
    }

    /// Throw the current performance out without credit and put the next
    /// one on stage.
    pub fn skip(&mut self) -> SkipOutcome {
        let skipped = self.retire_current(SongStatus::Skipped, false);
        let started = self.promote_head();
        SkipOutcome {
            skipped: skipped.map(|f| f.song),
            started,
        }
    }

    pub fn move_song(&mut self, song_id: u64, position: i64) -> Result<()> {
        let entry = self
            .songs
            .get_mut(song_id)
            .ok_or_else(|| Error::validation("Song not found"))?;
        entry.position_override = Some(position);
        debug!(song_id, position, "queue position overridden");
        Ok(())
    }

    /// Remove a queued entry; false when it was absent or already on stage
    pub fn remove_song(&mut self, song_id: u64) -> bool {
        let removed = self.songs.remove_queued(song_id);
        if removed {
            info!(song_id, "song removed from queue");
        }
        removed
    }

    /// Advisory pause flag for the screens; never blocks transitions
    pub fn toggle_pause(&mut self) -> bool {
        self.stats.is_paused = !self.stats.is_paused;
        info!(paused = self.stats.is_paused, "pause toggled");
        self.stats.is_paused
    }

    /// Fresh party: songs gone, id counter rewound, guest counters zeroed,
    /// registrations kept
    pub fn reset(&mut self) {
        self.songs.reset();
        self.guests.reset_counters();
        self.stats = PartyStats::fresh();
        self.reactions.clear();
        info!("party reset");
    }

    // ---- Guest self-service (strict) ----

    /// Head-of-queue guest puts their own song on stage. While a fresh
    /// performance is running the stage is blocked, but one that has sat
    /// longer than `takeover_grace` is force-skipped so the next guest is
    /// not held hostage by a walk-off.
    pub fn self_start(
        &mut self,
        device_id: &str,
        song_id: Option<u64>,
        takeover_grace: Duration,
    ) -> Result<SelfStartOutcome> {
        if device_id.trim().is_empty() {
            return Err(Error::validation("Device ID required"));
        }
        if self.guests.get(device_id).is_none() {
            return Err(Error::validation("Guest not found"));
        }

        let mut stale_current = None;
        if let Some(current) = self.songs.current() {
            match current.started_at {
                Some(started) if Utc::now() - started >= takeover_grace => {
                    stale_current = Some(current.id);
                }
                _ => return Err(Error::validation("Someone is already performing!")),
            }
        }

        let queue = ordering::queue_order(self.songs.entries(), &self.guests);
        let head = queue
            .first()
            .ok_or_else(|| Error::validation("Queue is empty"))?;
        if head.song.guest_id != device_id {
            return Err(Error::permission("It's not your turn yet!"));
        }
        if let Some(requested) = song_id {
            if head.song.id != requested {
                return Err(Error::validation("This is not your next song"));
            }
        }
        let head_id = head.song.id;

        let took_over = if stale_current.is_some() {
            info!(stalled = ?stale_current, "stalled performance taken over");
            self.retire_current(SongStatus::Skipped, false).map(|f| f.song)
        } else {
            None
        };

        let started = self
            .promote(head_id)
            .ok_or_else(|| Error::Internal("queue head vanished during start".to_string()))?;
        Ok(SelfStartOutcome { started, took_over })
    }

    /// Performer marks their own song done. Credits the performance and
    /// clears the stage without auto-starting the next song.
    pub fn self_done(&mut self, device_id: &str) -> Result<SelfDoneOutcome> {
        if device_id.trim().is_empty() {
            return Err(Error::validation("Device ID required"));
        }
        let current = self
            .songs
            .current()
            .ok_or_else(|| Error::validation("No song is currently playing"))?;
        if current.guest_id != device_id {
            return Err(Error::permission("This isn't your song!"));
        }

        let finished = self
            .retire_current(SongStatus::Completed, true)
            .ok_or_else(|| Error::Internal("current entry vanished".to_string()))?;
        let next_up = ordering::queue_order(self.songs.entries(), &self.guests)
            .into_iter()
            .next();
        Ok(SelfDoneOutcome { finished, next_up })
    }

    /// VIP fast-track: pin one of the caller's queued songs to the front.
    /// Single use per party; a rejected call does not consume the power.
    pub fn vip_skip(&mut self, device_id: &str, song_id: u64) -> Result<Guest> {
        let Some(guest) = self.guests.get(device_id) else {
            return Err(Error::permission("VIP only!"));
        };
        if !guest.is_vip {
            return Err(Error::permission("VIP only!"));
        }
        if guest.skip_used {
            return Err(Error::validation("You already used your skip power!"));
        }
        let Some(song) = self.songs.get(song_id) else {
            return Err(Error::validation("Song not found"));
        };
        if song.guest_id != device_id {
            return Err(Error::validation("You can only fast-track your own song"));
        }
        if song.status != SongStatus::Queued {
            return Err(Error::validation("That song is not in the queue"));
        }

        // Past this point both writes happen together
        if let Some(song) = self.songs.get_mut(song_id) {
            song.position_override = Some(-1);
        }
        let guest = self
            .guests
            .get_mut(device_id)
            .ok_or_else(|| Error::Internal("guest vanished during skip".to_string()))?;
        guest.skip_used = true;
        info!(guest = %guest.name, song_id, "vip fast-track used");
        Ok(guest.clone())
    }

    // ---- Internals ----

    /// Take the current entry off the stage. `credit` controls whether the
    /// performance counts toward the guest and party tallies.
    fn retire_current(&mut self, status: SongStatus, credit: bool) -> Option<FinishedSong> {
        let (id, guest_id, started_at) = {
            let current = self.songs.current()?;
            (current.id, current.guest_id.clone(), current.started_at)
        };

        let now = Utc::now();
        if let Some(entry) = self.songs.get_mut(id) {
            entry.status = status;
            entry.completed_at = Some(now);
        }
        if credit {
            if let Some(guest) = self.guests.get_mut(&guest_id) {
                guest.songs_completed += 1;
            }
            self.stats.total_songs_played += 1;
        }
        self.stats.current_song_id = None;

        let song = ordering::song_view(self.songs.get(id)?, &self.guests);
        let duration_secs = started_at.map(|t| (now - t).num_seconds());
        let reaction_summary = self.reactions.summary();
        info!(song = %song.song.song_title, guest = %song.song.guest_name, ?status, "performance ended");
        Some(FinishedSong {
            song,
            duration_secs,
            reaction_summary,
        })
    }

    fn promote_head(&mut self) -> Option<StartedSong> {
        let head_id = ordering::queue_order(self.songs.entries(), &self.guests)
            .first()
            .map(|v| v.song.id)?;
        self.promote(head_id)
    }

    /// Put one queued entry on stage. Captures the crowd mood for the
    /// intro, then clears the window so reactions accrue to the new
    /// performance.
    fn promote(&mut self, id: u64) -> Option<StartedSong> {
        {
            let entry = self.songs.get_mut(id)?;
            entry.status = SongStatus::Current;
            entry.started_at = Some(Utc::now());
        }
        self.stats.current_song_id = Some(id);

        let reaction_summary = self.reactions.summary();
        self.reactions.clear();
        let song = ordering::song_view(self.songs.get(id)?, &self.guests);
        let drunk_o_meter =
            view::drunk_o_meter(self.songs.count_with_status(SongStatus::Completed));
        info!(id, song = %song.song.song_title, guest = %song.song.guest_name, "now playing");
        Some(StartedSong {
            song,
            reaction_summary,
            drunk_o_meter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grace() -> Duration {
        Duration::seconds(300)
    }

    fn register(party: &mut Party, id: &str, name: &str) {
        party.register_guest(id, name, false).unwrap();
    }

    fn register_vip(party: &mut Party, id: &str, name: &str) {
        party.register_guest(id, name, true).unwrap();
    }

    fn submit(party: &mut Party, id: &str, title: &str) -> u64 {
        party
            .submit_song(id, title, "https://youtu.be/dQw4w9WgXcQ", "")
            .unwrap()
            .id
    }

    fn current_count(party: &Party) -> usize {
        party.songs.count_with_status(SongStatus::Current)
    }

    #[test]
    fn start_party_promotes_queue_head() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        register(&mut party, "b", "Bob");
        let first = submit(&mut party, "a", "Opener");
        submit(&mut party, "b", "Second");

        let outcome = party.start_party();
        let started = match outcome {
            StartOutcome::Started(s) => s,
            other => panic!("expected start, got {:?}", other),
        };
        assert_eq!(started.song.song.id, first);
        assert_eq!(party.stats.current_song_id, Some(first));
        assert!(party.songs.get(first).unwrap().started_at.is_some());
    }

    #[test]
    fn start_party_is_idempotent() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        submit(&mut party, "a", "Opener");

        assert!(matches!(party.start_party(), StartOutcome::Started(_)));
        assert!(matches!(party.start_party(), StartOutcome::AlreadyStarted));
        assert_eq!(current_count(&party), 1);
    }

    #[test]
    fn start_party_with_empty_queue_is_a_noop() {
        let mut party = Party::new();
        assert!(matches!(party.start_party(), StartOutcome::QueueEmpty));
        assert_eq!(current_count(&party), 0);
    }

    #[test]
    fn advance_credits_performer_and_promotes_next() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        register(&mut party, "b", "Bob");
        let first = submit(&mut party, "a", "Opener");
        let second = submit(&mut party, "b", "Second");
        party.start_party();

        let outcome = party.advance();
        let finished = outcome.finished.unwrap();
        assert_eq!(finished.song.song.id, first);
        assert_eq!(finished.song.song.status, SongStatus::Completed);
        assert!(party.songs.get(first).unwrap().completed_at.is_some());
        assert_eq!(party.guests.get("a").unwrap().songs_completed, 1);
        assert_eq!(party.stats.total_songs_played, 1);

        assert_eq!(outcome.started.unwrap().song.song.id, second);
        assert_eq!(party.stats.current_song_id, Some(second));
        assert_eq!(current_count(&party), 1);
    }

    #[test]
    fn advance_on_idle_empty_party_does_nothing() {
        let mut party = Party::new();
        let outcome = party.advance();
        assert!(outcome.finished.is_none());
        assert!(outcome.started.is_none());
        assert_eq!(party.stats.total_songs_played, 0);
    }

    #[test]
    fn advance_past_last_song_clears_the_stage() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        submit(&mut party, "a", "Only");
        party.start_party();

        let outcome = party.advance();
        assert!(outcome.finished.is_some());
        assert!(outcome.started.is_none());
        assert_eq!(party.stats.current_song_id, None);
        assert_eq!(current_count(&party), 0);
    }

    #[test]
    fn skip_credits_nothing() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        let id = submit(&mut party, "a", "Opener");
        party.start_party();

        let outcome = party.skip();
        assert_eq!(outcome.skipped.unwrap().song.id, id);
        assert_eq!(party.songs.get(id).unwrap().status, SongStatus::Skipped);
        assert!(party.songs.get(id).unwrap().completed_at.is_some());
        assert_eq!(party.guests.get("a").unwrap().songs_completed, 0);
        assert_eq!(party.stats.total_songs_played, 0);
    }

    #[test]
    fn at_most_one_current_through_any_sequence() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        register(&mut party, "b", "Bob");
        submit(&mut party, "a", "One");
        submit(&mut party, "b", "Two");
        submit(&mut party, "a", "Three");

        party.start_party();
        assert_eq!(current_count(&party), 1);
        party.advance();
        assert_eq!(current_count(&party), 1);
        party.skip();
        assert_eq!(current_count(&party), 1);
        party.advance();
        assert_eq!(current_count(&party), 0);
        party.advance();
        assert_eq!(current_count(&party), 0);
    }

    #[test]
    fn self_start_requires_registration_and_turn() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        register(&mut party, "b", "Bob");
        submit(&mut party, "a", "Opener");
        submit(&mut party, "b", "Second");

        let err = party.self_start("ghost", None, grace()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(err.to_string(), "Guest not found");

        let err = party.self_start("b", None, grace()).unwrap_err();
        assert!(matches!(err, Error::Permission(_)));
        assert_eq!(err.to_string(), "It's not your turn yet!");

        assert!(party.self_start("a", None, grace()).is_ok());
        assert_eq!(current_count(&party), 1);
    }

    #[test]
    fn self_start_rejects_mismatched_song_id() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        let first = submit(&mut party, "a", "Opener");
        let second = submit(&mut party, "a", "Second");

        let err = party.self_start("a", Some(second), grace()).unwrap_err();
        assert_eq!(err.to_string(), "This is not your next song");

        let outcome = party.self_start("a", Some(first), grace()).unwrap();
        assert_eq!(outcome.started.song.song.id, first);
    }

    #[test]
    fn self_start_blocked_by_fresh_performance() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        register(&mut party, "b", "Bob");
        submit(&mut party, "a", "Opener");
        submit(&mut party, "b", "Second");
        party.start_party();

        let err = party.self_start("b", None, grace()).unwrap_err();
        assert_eq!(err.to_string(), "Someone is already performing!");
        assert_eq!(current_count(&party), 1);
    }

    #[test]
    fn self_start_takes_over_stale_performance() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        register(&mut party, "b", "Bob");
        let first = submit(&mut party, "a", "Opener");
        let second = submit(&mut party, "b", "Second");
        party.start_party();

        // Performance has sat for exactly the grace period
        party.songs.get_mut(first).unwrap().started_at =
            Some(Utc::now() - Duration::seconds(300));

        let outcome = party.self_start("b", None, grace()).unwrap();
        let stalled = outcome.took_over.unwrap();
        assert_eq!(stalled.song.id, first);
        assert_eq!(party.songs.get(first).unwrap().status, SongStatus::Skipped);
        // A walk-off earns no credit
        assert_eq!(party.guests.get("a").unwrap().songs_completed, 0);

        assert_eq!(outcome.started.song.song.id, second);
        assert_eq!(party.stats.current_song_id, Some(second));
        assert_eq!(current_count(&party), 1);
    }

    #[test]
    fn takeover_ignores_current_without_start_time() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        register(&mut party, "b", "Bob");
        let first = submit(&mut party, "a", "Opener");
        submit(&mut party, "b", "Second");
        party.start_party();
        // Entries restored from files written before start times existed
        party.songs.get_mut(first).unwrap().started_at = None;

        let err = party.self_start("b", None, grace()).unwrap_err();
        assert_eq!(err.to_string(), "Someone is already performing!");
    }

    #[test]
    fn self_done_requires_ownership() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        register(&mut party, "b", "Bob");
        submit(&mut party, "a", "Opener");
        party.start_party();

        let err = party.self_done("b").unwrap_err();
        assert!(matches!(err, Error::Permission(_)));
        assert_eq!(err.to_string(), "This isn't your song!");
    }

    #[test]
    fn self_done_credits_and_reports_next_without_autostart() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        register(&mut party, "b", "Bob");
        submit(&mut party, "a", "Opener");
        let second = submit(&mut party, "b", "Second");
        party.start_party();

        let outcome = party.self_done("a").unwrap();
        assert!(outcome.finished.duration_secs.is_some());
        assert_eq!(outcome.next_up.unwrap().song.id, second);
        assert_eq!(party.guests.get("a").unwrap().songs_completed, 1);
        assert_eq!(party.stats.current_song_id, None);
        assert_eq!(current_count(&party), 0);
    }

    #[test]
    fn self_done_without_current_song_is_rejected() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        let err = party.self_done("a").unwrap_err();
        assert_eq!(err.to_string(), "No song is currently playing");
    }

    #[test]
    fn vip_skip_is_single_use() {
        let mut party = Party::new();
        register_vip(&mut party, "v", "Kristin");
        register(&mut party, "a", "Alice");
        submit(&mut party, "a", "First");
        let vip_song = submit(&mut party, "v", "Mine");
        let vip_song_2 = submit(&mut party, "v", "Mine Again");

        party.vip_skip("v", vip_song).unwrap();
        assert_eq!(
            party.songs.get(vip_song).unwrap().position_override,
            Some(-1)
        );
        let queue = ordering::queue_order(party.songs.entries(), &party.guests);
        assert_eq!(queue[0].song.id, vip_song);

        let err = party.vip_skip("v", vip_song_2).unwrap_err();
        assert_eq!(err.to_string(), "You already used your skip power!");
    }

    #[test]
    fn vip_skip_denied_for_commoners() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        let id = submit(&mut party, "a", "First");

        let err = party.vip_skip("a", id).unwrap_err();
        assert!(matches!(err, Error::Permission(_)));
        assert_eq!(err.to_string(), "VIP only!");
        let err = party.vip_skip("ghost", id).unwrap_err();
        assert_eq!(err.to_string(), "VIP only!");
    }

    #[test]
    fn rejected_vip_skip_does_not_consume_the_power() {
        let mut party = Party::new();
        register_vip(&mut party, "v", "Kristin");
        register(&mut party, "a", "Alice");
        let foreign = submit(&mut party, "a", "Not Yours");
        let own = submit(&mut party, "v", "Mine");

        assert!(party.vip_skip("v", 999).is_err());
        assert!(party.vip_skip("v", foreign).is_err());
        assert!(!party.guests.get("v").unwrap().skip_used);

        party.songs.get_mut(own).unwrap().status = SongStatus::Completed;
        let err = party.vip_skip("v", own).unwrap_err();
        assert_eq!(err.to_string(), "That song is not in the queue");
        assert!(!party.guests.get("v").unwrap().skip_used);
    }

    #[test]
    fn move_song_sets_override_and_rejects_unknown_ids() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        let id = submit(&mut party, "a", "First");

        party.move_song(id, -1).unwrap();
        assert_eq!(party.songs.get(id).unwrap().position_override, Some(-1));
        assert!(party.move_song(999, 0).is_err());
    }

    #[test]
    fn remove_song_only_touches_queued_entries() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        let first = submit(&mut party, "a", "First");
        let second = submit(&mut party, "a", "Second");
        party.start_party();

        assert!(!party.remove_song(first)); // on stage
        assert!(party.remove_song(second));
        assert!(!party.remove_song(second)); // already gone
    }

    #[test]
    fn reset_keeps_guests_but_zeroes_the_party() {
        let mut party = Party::new();
        register_vip(&mut party, "v", "Kristin");
        register(&mut party, "a", "Alice");
        let vip_song = submit(&mut party, "v", "Mine");
        submit(&mut party, "a", "Other");
        party.vip_skip("v", vip_song).unwrap();
        party.start_party();
        party.advance();

        party.reset();
        assert!(party.songs.entries().is_empty());
        assert_eq!(party.stats.total_songs_played, 0);
        assert_eq!(party.stats.current_song_id, None);
        assert_eq!(party.guests.len(), 2);
        assert_eq!(party.guests.get("v").unwrap().songs_completed, 0);
        assert!(!party.guests.get("v").unwrap().skip_used);

        // Id counter rewinds with the fresh party
        let id = submit(&mut party, "a", "New Round");
        assert_eq!(id, 1);
    }

    #[test]
    fn registration_and_submission_validation() {
        let mut party = Party::new();
        assert!(party.register_guest("", "Alice", false).is_err());
        assert!(party.register_guest("a", "   ", false).is_err());

        register(&mut party, "a", "Alice");
        let err = party
            .submit_song("ghost", "Song", "https://youtu.be/x", "")
            .unwrap_err();
        assert_eq!(err.to_string(), "Guest not found. Please register first.");
        let err = party
            .submit_song("a", "Song", "https://example.com/clip", "")
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid video URL");
        assert!(party.submit_song("a", "  ", "https://youtu.be/x", "").is_err());
    }

    #[test]
    fn reactions_validate_and_default_the_name() {
        let mut party = Party::new();
        assert!(party.react("  ", Some("Alice")).is_err());
        let reaction = party.react("🔥", None).unwrap();
        assert_eq!(reaction.guest_name, "Anonymous");
        let reaction = party.react("🔥", Some("  ")).unwrap();
        assert_eq!(reaction.guest_name, "Anonymous");
    }

    #[test]
    fn guest_view_lists_songs_newest_first() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        let first = submit(&mut party, "a", "First");
        let second = submit(&mut party, "a", "Second");
        assert!(party
            .submit_song("b-unregistered", "ignored", "https://youtu.be/x", "")
            .is_err());

        let (guest, songs) = party.guest_view("a");
        assert_eq!(guest.unwrap().name, "Alice");
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].id, second);
        assert_eq!(songs[1].id, first);

        let (missing, songs) = party.guest_view("nobody");
        assert!(missing.is_none());
        assert!(songs.is_empty());
    }

    #[test]
    fn snapshot_reflects_the_whole_party() {
        let mut party = Party::new();
        register(&mut party, "a", "Alice");
        register(&mut party, "b", "Bob");
        submit(&mut party, "a", "One");
        submit(&mut party, "b", "Two");
        party.start_party();
        party.advance();

        let snap = party.snapshot();
        assert_eq!(snap.queue.len(), 0);
        assert_eq!(snap.current.as_ref().unwrap().song.guest_id, "b");
        assert_eq!(snap.stats.total_completed, 1);
        assert_eq!(snap.stats.drunk_o_meter, 5);
        assert_eq!(snap.hall_of_fame.mic_hog.as_ref().unwrap().guest_name, "Alice");
    }
}
