//! Party events and the broadcast bus
//!
//! Every state change fans out to connected screens through one broadcast
//! channel. Events are serialized for SSE transmission; the serde tag
//! doubles as the SSE event name.

use crate::party::ordering::SongView;
use crate::party::view::QueueSnapshot;
use serde::Serialize;
use tokio::sync::broadcast;

/// Events pushed to every connected screen
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PartyEvent {
    /// Full queue snapshot, sent after every queue mutation and as the
    /// first frame of each SSE connection
    QueueUpdated(QueueSnapshot),

    /// A performance started
    ///
    /// `auto_play` is set when the performer started it from their own
    /// phone, telling the big screen to cue the video without the KJ.
    #[serde(rename_all = "camelCase")]
    NowPlaying {
        song: SongView,
        commentary_text: String,
        is_vip: bool,
        auto_play: bool,
    },

    /// A credited performance ended
    #[serde(rename_all = "camelCase")]
    SongFinished {
        song: SongView,
        commentary_text: String,
    },

    /// Advisory pause flag flipped
    #[serde(rename_all = "camelCase")]
    PauseState { is_paused: bool },

    /// The stage is free and this guest's song is next
    #[serde(rename_all = "camelCase")]
    YourTurnSoon { guest_id: String, song_id: u64 },

    /// A VIP pinned their song to the front
    #[serde(rename_all = "camelCase")]
    VipSkip { guest_name: String },

    /// The party was reset to a clean slate
    #[serde(rename_all = "camelCase")]
    PartyReset { message: String },

    /// Crowd reaction, relayed as-is
    #[serde(rename_all = "camelCase")]
    Reaction { emoji: String, guest_name: String },
}

impl PartyEvent {
    /// Event name used on the SSE `event:` line (same value as the
    /// serialized `type` tag)
    pub fn event_name(&self) -> &'static str {
        match self {
            PartyEvent::QueueUpdated(_) => "queue-updated",
            PartyEvent::NowPlaying { .. } => "now-playing",
            PartyEvent::SongFinished { .. } => "song-finished",
            PartyEvent::PauseState { .. } => "pause-state",
            PartyEvent::YourTurnSoon { .. } => "your-turn-soon",
            PartyEvent::VipSkip { .. } => "vip-skip",
            PartyEvent::PartyReset { .. } => "party-reset",
            PartyEvent::Reaction { .. } => "reaction",
        }
    }
}

/// Broadcast bus for party events
///
/// Wraps tokio::broadcast: non-blocking publish, any number of
/// subscribers, lag detection for slow ones. Delivery is best-effort;
/// screens resynchronize from the snapshot on reconnect.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PartyEvent>,
    capacity: usize,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events. Events emitted before subscription
    /// are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<PartyEvent> {
        self.tx.subscribe()
    }

    /// Emit to all subscribers; errors when none are listening
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PartyEvent,
    ) -> Result<usize, broadcast::error::SendError<PartyEvent>> {
        self.tx.send(event)
    }

    /// Emit, ignoring the no-subscriber case. The usual path: an empty
    /// room is not an error.
    pub fn emit_lossy(&self, event: PartyEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
