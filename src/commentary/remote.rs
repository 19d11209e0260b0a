//! Remote commentary provider
//!
//! Calls an Anthropic-compatible Messages endpoint with a persona-flavored
//! system prompt and performer context. Every error maps to
//! [`CommentaryError`]; the caller substitutes fallback lines, so nothing
//! here ever reaches a guest as an HTTP failure.

use crate::commentary::{
    personas, CommentaryError, CommentaryProvider, IntroRequest, PostSongRequest,
};
use crate::config::CommentaryConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const INTRO_MAX_TOKENS: u32 = 200;
const POST_SONG_MAX_TOKENS: u32 = 100;

/// Shared announcer brief; the persona's style prompt is appended per call
const BASE_SYSTEM: &str = "You are the announcer for a live karaoke party. Your job is to introduce performers with DELIGHTFUL party humor - puns, wordplay, adult-friendly jokes, and real-time awareness of what's happening.\n\n\
VIBE: Fun, clever, surprisingly aware, making everyone laugh and feel hyped. You're the cool announcer who notices everything and has the perfect quip. Adult party humor is welcome - be cheeky but never crude.\n\n\
CONTEXT YOU'LL RECEIVE:\n\
- Performer's name\n\
- Song they're singing\n\
- How many songs they've sung tonight\n\
- Whether they're the VIP guest of honor\n\
- Time into the party (drunk-o-meter level)\n\
- Any recent crowd reactions\n\n\
RULES:\n\
1. Keep it SHORT - 2-4 sentences max for intros\n\
2. Be CLEVER about the song - puns on lyrics, artist references, genre jokes\n\
3. If they've sung multiple songs, make a fun observation (\"They're on a ROLL!\")\n\
4. The VIP guest of honor gets MAXIMUM celebration - it's THEIR night!\n\
5. Late night (high drunk-o-meter) = even more playful and silly\n\
6. Reference crowd reactions if you have them (\"The crowd is ALREADY loving this!\")\n\
7. Make people feel like a STAR about to crush it\n\
8. Puns are ALWAYS welcome. The more groan-worthy, the better.\n\n\
NEVER be mean or cutting - lift people UP while being hilarious.\n\n\
OUTPUT: Just the announcement text, nothing else. No quotes, no \"Announcer says:\", just the words to speak.";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Commentary provider backed by a remote Messages API
pub struct RemoteCommentary {
    http_client: reqwest::Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl RemoteCommentary {
    pub fn new(config: &CommentaryConfig, api_key: &str) -> Result<Self, CommentaryError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CommentaryError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            api_key: api_key.to_string(),
        })
    }

    async fn complete(
        &self,
        system: String,
        user_prompt: String,
        max_tokens: u32,
    ) -> Result<String, CommentaryError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            system,
            messages: vec![Message {
                role: "user",
                content: user_prompt,
            }],
        };

        tracing::debug!(model = %self.model, max_tokens, "requesting announcer line");

        let response = self
            .http_client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| CommentaryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CommentaryError::Api(status.as_u16(), body));
        }

        let reply: MessagesResponse = response
            .json()
            .await
            .map_err(|e| CommentaryError::Parse(e.to_string()))?;

        reply
            .content
            .iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| CommentaryError::Parse("no text block in response".to_string()))
    }
}

#[async_trait]
impl CommentaryProvider for RemoteCommentary {
    async fn intro(&self, req: &IntroRequest) -> Result<String, CommentaryError> {
        let persona = personas::resolve(Some(&req.voice_persona));
        let system = format!("{BASE_SYSTEM}\n\n{}", persona.style_prompt);
        self.complete(system, intro_prompt(req), INTRO_MAX_TOKENS)
            .await
    }

    async fn post_song(&self, req: &PostSongRequest) -> Result<String, CommentaryError> {
        let persona = personas::resolve(Some(&req.voice_persona));
        let system = format!("{BASE_SYSTEM}\n\n{}", persona.style_prompt);
        self.complete(system, post_song_prompt(req), POST_SONG_MAX_TOKENS)
            .await
    }
}

fn intro_prompt(req: &IntroRequest) -> String {
    let mut prompt = format!(
        "Generate an introduction for this performer:\n\n\
         PERFORMER: {}\n\
         SONG: \"{}\"\n\
         SONGS SUNG TONIGHT: {} (this will be #{})\n\
         IS VIP GUEST OF HONOR: {}\n\
         DRUNK-O-METER: {}% (0=sober start, 100=legendary party mode)\n",
        req.guest_name,
        req.song_title,
        req.songs_completed,
        req.songs_completed + 1,
        if req.is_vip {
            "YES - give them extra love!"
        } else {
            "No"
        },
        req.drunk_o_meter,
    );

    if let Some(reactions) = &req.recent_reactions {
        prompt.push_str(&format!("RECENT CROWD VIBE: {reactions}\n"));
    }

    let reminder = if req.is_vip {
        "This is the GUEST OF HONOR - maximum hype!".to_string()
    } else if req.songs_completed > 0 {
        format!(
            "They've already sung {} songs - acknowledge their dedication!",
            req.songs_completed
        )
    } else {
        "First timer - give them encouragement with a side of playful doubt!".to_string()
    };
    prompt.push_str(&format!("\nRemember: {reminder}"));
    prompt
}

fn post_song_prompt(req: &PostSongRequest) -> String {
    let mut prompt = format!(
        "Generate a SHORT post-performance comment (1-2 sentences max):\n\n\
         PERFORMER: {}\n\
         SONG: \"{}\"\n",
        req.guest_name, req.song_title,
    );

    if let Some(secs) = req.duration_secs {
        prompt.push_str(&format!(
            "PERFORMANCE DURATION: {}\n",
            duration_text(secs)
        ));
    }

    prompt.push_str(&format!(
        "CROWD REACTIONS: {}\n\
         TOTAL SONGS BY THIS PERSON: {}\n\n\
         Make a quick, punchy comment about the performance. Reference the \
         duration if it's notably long (>5 min) or short (<2 min). Mention \
         crowd reactions if notable.",
        req.reaction_summary.as_deref().unwrap_or("Mild applause"),
        req.songs_completed,
    ));
    prompt
}

fn duration_text(duration_secs: i64) -> String {
    let minutes = duration_secs / 60;
    let seconds = duration_secs % 60;
    format!(
        "{} minute{} and {} second{}",
        minutes,
        if minutes == 1 { "" } else { "s" },
        seconds,
        if seconds == 1 { "" } else { "s" },
    )
}
