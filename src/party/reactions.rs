//! Crowd reactions
//!
//! Reactions are ephemeral hype: they fan out to every screen the moment
//! they arrive and feed the announcer a 30-second mood window. They are
//! never persisted.

use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, VecDeque};

/// Default width of the rolling mood window
pub const REACTION_WINDOW_SECS: i64 = 30;

/// One emoji reaction
#[derive(Debug, Clone)]
pub struct Reaction {
    pub emoji: String,
    pub guest_name: String,
    pub at: DateTime<Utc>,
}

/// Rolling window of recent reactions. Old entries are evicted by
/// timestamp on every push and read, so the log never grows past what
/// one window can hold.
#[derive(Debug, Clone)]
pub struct ReactionLog {
    window: Duration,
    entries: VecDeque<Reaction>,
}

impl Default for ReactionLog {
    fn default() -> Self {
        Self {
            window: Duration::seconds(REACTION_WINDOW_SECS),
            entries: VecDeque::new(),
        }
    }
}

impl ReactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, emoji: &str, guest_name: &str) -> Reaction {
        let reaction = Reaction {
            emoji: emoji.to_string(),
            guest_name: guest_name.to_string(),
            at: Utc::now(),
        };
        self.entries.push_back(reaction.clone());
        self.evict(reaction.at);
        reaction
    }

    /// Human-readable summary of the current window, e.g.
    /// `7 reactions: 🔥 x4, 🎤 x2, 😂 x1`. `None` when the window is empty.
    pub fn summary(&mut self) -> Option<String> {
        self.evict(Utc::now());
        if self.entries.is_empty() {
            return None;
        }

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for r in &self.entries {
            *counts.entry(r.emoji.as_str()).or_default() += 1;
        }

        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

        let top: Vec<String> = ranked
            .iter()
            .take(3)
            .map(|(emoji, count)| format!("{} x{}", emoji, count))
            .collect();

        Some(format!("{} reactions: {}", self.entries.len(), top.join(", ")))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn evict(&mut self, now: DateTime<Utc>) {
        let cutoff = now - self.window;
        while self
            .entries
            .front()
            .is_some_and(|r| r.at < cutoff)
        {
            self.entries.pop_front();
        }
    }
}
