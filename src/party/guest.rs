//! Guest registry
//!
//! Guests self-identify with a client-generated device id; there is no
//! password or session. Registering an existing device id renames the
//! guest while keeping their completed-song count and skip-power state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A registered party guest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    /// Client-generated device id; also the registry key
    pub id: String,
    pub name: String,
    pub songs_completed: u32,
    pub is_vip: bool,
    pub skip_used: bool,
    pub created_at: DateTime<Utc>,
}

/// All registered guests, keyed by device id
#[derive(Debug, Default, Clone)]
pub struct GuestRegistry {
    guests: HashMap<String, Guest>,
}

impl GuestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(guests: HashMap<String, Guest>) -> Self {
        Self { guests }
    }

    pub fn as_map(&self) -> &HashMap<String, Guest> {
        &self.guests
    }

    /// Register or re-register a device. A re-registration updates the
    /// display name only; the VIP flag is decided once at creation, and the
    /// completed-song count, skip-power state, and creation time all stay.
    pub fn register(&mut self, device_id: &str, name: &str, is_vip: bool) -> Guest {
        let name = name.trim().to_string();
        let guest = self
            .guests
            .entry(device_id.to_string())
            .and_modify(|g| {
                g.name = name.clone();
            })
            .or_insert_with(|| Guest {
                id: device_id.to_string(),
                name,
                songs_completed: 0,
                is_vip,
                skip_used: false,
                created_at: Utc::now(),
            });
        guest.clone()
    }

    pub fn get(&self, device_id: &str) -> Option<&Guest> {
        self.guests.get(device_id)
    }

    pub fn get_mut(&mut self, device_id: &str) -> Option<&mut Guest> {
        self.guests.get_mut(device_id)
    }

    pub fn len(&self) -> usize {
        self.guests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guests.is_empty()
    }

    /// Zero every guest's per-party counters, keeping registrations
    pub fn reset_counters(&mut self) {
        for guest in self.guests.values_mut() {
            guest.songs_completed = 0;
            guest.skip_used = false;
        }
    }
}
