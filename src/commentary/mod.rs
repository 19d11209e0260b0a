//! Announcer lines for performance transitions
//!
//! The turn-taking engine decides WHAT happened; this module decides what
//! the announcer SAYS about it. A pluggable provider generates lines from
//! performer context, and deterministic canned templates stand in whenever
//! the provider is missing or fails. Commentary can delay an announcement,
//! never a transition.

pub mod fallback;
pub mod personas;
pub mod remote;

use crate::config::CommentaryConfig;
use async_trait::async_trait;
use thiserror::Error;

pub use personas::{Persona, DEFAULT_PERSONA};
pub use remote::RemoteCommentary;

/// Commentary provider errors
///
/// Never surfaced to guests; the announcer logs them and substitutes a
/// fallback line.
#[derive(Debug, Error)]
pub enum CommentaryError {
    /// Network communication error
    #[error("network error: {0}")]
    Network(String),

    /// Provider returned a non-success status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to extract text from the provider response
    #[error("parse error: {0}")]
    Parse(String),
}

/// Context for a performer introduction
#[derive(Debug, Clone)]
pub struct IntroRequest {
    pub guest_name: String,
    pub song_title: String,
    pub voice_persona: String,
    /// Songs this guest completed before the one starting now
    pub songs_completed: u32,
    pub is_vip: bool,
    pub drunk_o_meter: u8,
    pub recent_reactions: Option<String>,
}

/// Context for a post-performance comment
#[derive(Debug, Clone)]
pub struct PostSongRequest {
    pub guest_name: String,
    pub song_title: String,
    pub voice_persona: String,
    pub duration_secs: Option<i64>,
    pub reaction_summary: Option<String>,
    /// Songs this guest has completed, counting the one that just ended
    pub songs_completed: u32,
}

/// Generates announcer lines from performer context
#[async_trait]
pub trait CommentaryProvider: Send + Sync {
    async fn intro(&self, req: &IntroRequest) -> Result<String, CommentaryError>;
    async fn post_song(&self, req: &PostSongRequest) -> Result<String, CommentaryError>;
}

/// The party announcer
///
/// Wraps an optional provider behind the canned-line fallback. Both
/// methods are infallible: a line always comes back, whether generated
/// or templated.
pub struct Announcer {
    provider: Option<Box<dyn CommentaryProvider>>,
}

impl Announcer {
    pub fn new(provider: Option<Box<dyn CommentaryProvider>>) -> Self {
        Self { provider }
    }

    /// Build from configuration: remote provider when an API key is
    /// present, canned lines otherwise
    pub fn from_config(config: &CommentaryConfig) -> Self {
        match config.api_key.as_deref() {
            Some(key) if !key.is_empty() => match RemoteCommentary::new(config, key) {
                Ok(provider) => {
                    tracing::info!(model = %config.model, "remote commentary enabled");
                    Self::new(Some(Box::new(provider)))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "remote commentary setup failed, using built-in lines");
                    Self::new(None)
                }
            },
            _ => {
                tracing::info!("no commentary API key configured, using built-in lines");
                Self::new(None)
            }
        }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Introduction for a performer about to start
    pub async fn intro(&self, req: &IntroRequest) -> String {
        if let Some(provider) = &self.provider {
            match provider.intro(req).await {
                Ok(text) => return text,
                Err(e) => {
                    tracing::warn!(error = %e, guest = %req.guest_name, "intro generation failed, using fallback");
                }
            }
        }
        fallback::intro_line(
            &req.guest_name,
            &req.song_title,
            req.is_vip,
            req.songs_completed,
        )
    }

    /// Comment on a performance that just ended
    pub async fn post_song(&self, req: &PostSongRequest) -> String {
        if let Some(provider) = &self.provider {
            match provider.post_song(req).await {
                Ok(text) => return text,
                Err(e) => {
                    tracing::warn!(error = %e, guest = %req.guest_name, "post-song generation failed, using fallback");
                }
            }
        }
        fallback::post_song_line(&req.guest_name, &req.song_title, req.duration_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider(Option<&'static str>);

    #[async_trait]
    impl CommentaryProvider for FixedProvider {
        async fn intro(&self, _req: &IntroRequest) -> Result<String, CommentaryError> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| CommentaryError::Network("connection refused".to_string()))
        }

        async fn post_song(&self, _req: &PostSongRequest) -> Result<String, CommentaryError> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| CommentaryError::Api(529, "overloaded".to_string()))
        }
    }

    fn intro_request() -> IntroRequest {
        IntroRequest {
            guest_name: "Dana".to_string(),
            song_title: "Twist and Shout".to_string(),
            voice_persona: DEFAULT_PERSONA.to_string(),
            songs_completed: 0,
            is_vip: false,
            drunk_o_meter: 0,
            recent_reactions: None,
        }
    }

    #[tokio::test]
    async fn announcer_without_provider_uses_canned_lines() {
        let announcer = Announcer::new(None);
        assert!(!announcer.has_provider());

        let line = announcer.intro(&intro_request()).await;
        assert!(line.contains("Dana"));
    }

    #[tokio::test]
    async fn provider_text_passes_through() {
        let announcer = Announcer::new(Some(Box::new(FixedProvider(Some("HERE COMES DANA!")))));
        let line = announcer.intro(&intro_request()).await;
        assert_eq!(line, "HERE COMES DANA!");
    }

    #[tokio::test]
    async fn provider_failure_falls_back_silently() {
        let announcer = Announcer::new(Some(Box::new(FixedProvider(None))));

        let line = announcer.intro(&intro_request()).await;
        assert!(line.contains("Dana"));

        let req = PostSongRequest {
            guest_name: "Dana".to_string(),
            song_title: "Twist and Shout".to_string(),
            voice_persona: DEFAULT_PERSONA.to_string(),
            duration_secs: Some(200),
            reaction_summary: None,
            songs_completed: 1,
        };
        let line = announcer.post_song(&req).await;
        assert!(line.contains("Dana"));
        assert!(line.ends_with("Solid effort!"));
    }

    #[tokio::test]
    async fn from_config_without_key_has_no_provider() {
        let config = CommentaryConfig {
            api_key: None,
            ..CommentaryConfig::default()
        };
        assert!(!Announcer::from_config(&config).has_provider());
    }
}
