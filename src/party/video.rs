//! Video id extraction from submitted URLs
//!
//! Guests paste whole YouTube links; the queue and the big-screen player
//! only need the 11-character video id. Accepts the watch, short-link,
//! embed, and shorts URL forms.

use once_cell::sync::Lazy;
use regex::Regex;

static WATCH_FORMS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)")
        .expect("valid video URL pattern")
});

static SHORTS_FORM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"youtube\.com/shorts/([^&\n?#]+)").expect("valid shorts URL pattern"));

/// Extract the video id from a submitted URL, or `None` when the URL is
/// not a recognized video link.
pub fn extract_video_id(url: &str) -> Option<String> {
    for pattern in [&*WATCH_FORMS, &*SHORTS_FORM] {
        if let Some(caps) = pattern.captures(url) {
            return Some(caps[1].to_string());
        }
    }
    None
}
