//! # openmic
//!
//! Self-hosted karaoke party queue server.
//!
//! **Purpose:** One process runs the whole party: guests register from
//! their phones and queue songs, a fairness-aware queue decides who sings
//! next, an announcer (remote-generated or canned) introduces every
//! performance, and every connected screen follows along over SSE.
//!
//! **Architecture:** All party state lives in memory behind a single
//! `tokio::sync::Mutex`; transitions are applied atomically, broadcast in
//! order, and persisted to one JSON file in the background.

pub mod api;
pub mod commentary;
pub mod config;
pub mod error;
pub mod events;
pub mod party;
pub mod store;

pub use error::{Error, Result};
pub use events::{EventBus, PartyEvent};
pub use party::Party;
