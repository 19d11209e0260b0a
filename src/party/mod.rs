//! Party state: guests, songs, ordering, and the turn-taking engine

pub mod engine;
pub mod guest;
pub mod ordering;
pub mod reactions;
pub mod song;
pub mod video;
pub mod view;

pub use engine::{Party, PartyStats};
pub use guest::{Guest, GuestRegistry};
pub use ordering::{queue_order, SongView};
pub use song::{SongBook, SongEntry, SongStatus};
pub use view::QueueSnapshot;
