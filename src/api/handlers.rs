//! HTTP request handlers
//!
//! Mutation handlers follow one shape: lock the party, apply the
//! transition, emit the queue snapshot while still holding the lock (so
//! event order matches transition order), then request a save and hand
//! any announcer work to a background task. Commentary never holds the
//! party lock and never delays a response.

use crate::api::server::AppContext;
use crate::commentary::{personas, IntroRequest, Persona, PostSongRequest};
use crate::error::Result;
use crate::events::{EventBus, PartyEvent};
use crate::party::engine::{FinishedSong, StartOutcome, StartedSong};
use crate::party::{Guest, QueueSnapshot, SongEntry};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

/// Generic mutation acknowledgment; `message` only where a surface shows it
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl StatusResponse {
    fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    device_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    guest: Guest,
}

#[derive(Debug, Serialize)]
pub struct GuestResponse {
    guest: Option<Guest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    songs: Option<Vec<SongEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(default)]
    device_id: Option<String>,
    #[serde(default)]
    song_title: Option<String>,
    #[serde(default)]
    video_url: Option<String>,
    #[serde(default)]
    voice_persona: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    success: bool,
    song_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionRequest {
    #[serde(default)]
    emoji: Option<String>,
    #[serde(default)]
    guest_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PersonasResponse {
    personas: &'static [Persona],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseResponse {
    success: bool,
    is_paused: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    #[serde(default)]
    song_id: Option<u64>,
    #[serde(default)]
    position: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfStartRequest {
    #[serde(default)]
    device_id: Option<String>,
    #[serde(default)]
    song_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfDoneRequest {
    #[serde(default)]
    device_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VipSkipRequest {
    #[serde(default)]
    device_id: Option<String>,
    #[serde(default)]
    song_id: Option<u64>,
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "openmic".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Queue and Guest Endpoints
// ============================================================================

/// GET /queue - Full party snapshot (same shape as the queue-updated event)
pub async fn get_queue(State(ctx): State<AppContext>) -> Json<QueueSnapshot> {
    Json(ctx.party.lock().await.snapshot())
}

/// GET /guest/:device_id - Guest profile plus their submissions
///
/// An unknown device id is not an error; phones probe this before showing
/// the registration form.
pub async fn get_guest(
    State(ctx): State<AppContext>,
    Path(device_id): Path<String>,
) -> Json<GuestResponse> {
    let (guest, songs) = ctx.party.lock().await.guest_view(&device_id);
    let songs = guest.is_some().then_some(songs);
    Json(GuestResponse { guest, songs })
}

/// POST /guest/register - Register or rename a guest
pub async fn register_guest(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>> {
    let name = req.name.unwrap_or_default();
    let is_vip = ctx.config.is_vip_name(&name);

    let guest = ctx.party.lock().await.register_guest(
        req.device_id.as_deref().unwrap_or(""),
        &name,
        is_vip,
    )?;
    ctx.saver.request_save();
    Ok(Json(RegisterResponse { guest }))
}

// ============================================================================
// Song Submission and Reactions
// ============================================================================

/// POST /songs - Queue a song for the submitting guest
pub async fn submit_song(
    State(ctx): State<AppContext>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>> {
    // Unknown persona ids are stored as empty, which reads as the default
    let persona = req
        .voice_persona
        .as_deref()
        .filter(|p| personas::is_valid(p))
        .unwrap_or("");
    let entry = {
        let mut party = ctx.party.lock().await;
        let entry = party.submit_song(
            req.device_id.as_deref().unwrap_or(""),
            req.song_title.as_deref().unwrap_or(""),
            req.video_url.as_deref().unwrap_or(""),
            persona,
        )?;
        ctx.events
            .emit_lossy(PartyEvent::QueueUpdated(party.snapshot()));
        entry
    };
    ctx.saver.request_save();
    Ok(Json(SubmitResponse {
        success: true,
        song_id: entry.id,
    }))
}

/// POST /reaction - Crowd reaction, relayed to every screen
///
/// Reactions are ephemeral; nothing is persisted.
pub async fn send_reaction(
    State(ctx): State<AppContext>,
    Json(req): Json<ReactionRequest>,
) -> Result<Json<StatusResponse>> {
    let mut party = ctx.party.lock().await;
    let reaction = party.react(
        req.emoji.as_deref().unwrap_or(""),
        req.guest_name.as_deref(),
    )?;
    ctx.events.emit_lossy(PartyEvent::Reaction {
        emoji: reaction.emoji,
        guest_name: reaction.guest_name,
    });
    Ok(Json(StatusResponse::ok()))
}

/// GET /personas - Announcer voices guests can pick from
pub async fn list_personas() -> Json<PersonasResponse> {
    Json(PersonasResponse {
        personas: personas::all(),
    })
}

// ============================================================================
// KJ Controls
// ============================================================================

/// POST /kj/start - Put the first queued song on stage
pub async fn kj_start(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    let outcome = {
        let mut party = ctx.party.lock().await;
        let outcome = party.start_party();
        if matches!(outcome, StartOutcome::Started(_)) {
            ctx.events
                .emit_lossy(PartyEvent::QueueUpdated(party.snapshot()));
        }
        outcome
    };

    match outcome {
        StartOutcome::Started(started) => {
            ctx.saver.request_save();
            spawn_commentary(&ctx, None, Some(started), false);
            Json(StatusResponse::ok())
        }
        StartOutcome::AlreadyStarted => {
            Json(StatusResponse::with_message("Party already started!"))
        }
        StartOutcome::QueueEmpty => Json(StatusResponse::ok()),
    }
}

/// POST /kj/advance - Credit the current performance and start the next
pub async fn kj_advance(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    let outcome = {
        let mut party = ctx.party.lock().await;
        let outcome = party.advance();
        ctx.events
            .emit_lossy(PartyEvent::QueueUpdated(party.snapshot()));
        outcome
    };
    ctx.saver.request_save();
    spawn_commentary(&ctx, outcome.finished, outcome.started, false);
    Json(StatusResponse::ok())
}

/// POST /kj/skip - Drop the current performance without credit and start
/// the next
pub async fn kj_skip(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    let outcome = {
        let mut party = ctx.party.lock().await;
        let outcome = party.skip();
        ctx.events
            .emit_lossy(PartyEvent::QueueUpdated(party.snapshot()));
        outcome
    };
    ctx.saver.request_save();
    if let Some(skipped) = &outcome.skipped {
        info!(song = %skipped.song.song_title, guest = %skipped.song.guest_name, "performance skipped");
    }
    spawn_commentary(&ctx, None, outcome.started, false);
    Json(StatusResponse::ok())
}

/// POST /kj/pause - Toggle the advisory pause flag
pub async fn kj_pause(State(ctx): State<AppContext>) -> Json<PauseResponse> {
    let is_paused = {
        let mut party = ctx.party.lock().await;
        let is_paused = party.toggle_pause();
        ctx.events.emit_lossy(PartyEvent::PauseState { is_paused });
        is_paused
    };
    ctx.saver.request_save();
    Json(PauseResponse {
        success: true,
        is_paused,
    })
}

/// POST /kj/reset - Wipe songs and counters for a fresh party
pub async fn kj_reset(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    {
        let mut party = ctx.party.lock().await;
        party.reset();
        ctx.events
            .emit_lossy(PartyEvent::QueueUpdated(party.snapshot()));
        ctx.events.emit_lossy(PartyEvent::PartyReset {
            message: "Party has been reset!".to_string(),
        });
    }
    ctx.saver.request_save();
    Json(StatusResponse::with_message(
        "Party reset! Ready for a fresh start.",
    ))
}

/// POST /kj/remove/:song_id - Remove a queued song
///
/// Ignored for unknown ids and entries already on stage or in history.
pub async fn kj_remove(
    State(ctx): State<AppContext>,
    Path(song_id): Path<u64>,
) -> Json<StatusResponse> {
    {
        let mut party = ctx.party.lock().await;
        party.remove_song(song_id);
        ctx.events
            .emit_lossy(PartyEvent::QueueUpdated(party.snapshot()));
    }
    ctx.saver.request_save();
    Json(StatusResponse::ok())
}

/// POST /kj/move - Pin a song to an explicit queue position
pub async fn kj_move(
    State(ctx): State<AppContext>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<StatusResponse>> {
    let (song_id, position) = match (req.song_id, req.position) {
        (Some(song_id), Some(position)) => (song_id, position),
        _ => return Err(crate::error::Error::validation("Missing required fields")),
    };

    {
        let mut party = ctx.party.lock().await;
        party.move_song(song_id, position)?;
        ctx.events
            .emit_lossy(PartyEvent::QueueUpdated(party.snapshot()));
    }
    ctx.saver.request_save();
    Ok(Json(StatusResponse::ok()))
}

// ============================================================================
// Guest Self-Service
// ============================================================================

/// POST /song/start - Head-of-queue guest starts their own song
pub async fn self_start(
    State(ctx): State<AppContext>,
    Json(req): Json<SelfStartRequest>,
) -> Result<Json<StatusResponse>> {
    let grace = Duration::seconds(ctx.config.takeover_grace_secs as i64);
    let outcome = {
        let mut party = ctx.party.lock().await;
        let outcome = party.self_start(
            req.device_id.as_deref().unwrap_or(""),
            req.song_id,
            grace,
        )?;
        ctx.events
            .emit_lossy(PartyEvent::QueueUpdated(party.snapshot()));
        outcome
    };
    ctx.saver.request_save();
    // Started from the performer's own phone, so the screen cues the video
    spawn_commentary(&ctx, None, Some(outcome.started), true);
    Ok(Json(StatusResponse::with_message(
        "You're up! Get to the stage!",
    )))
}

/// POST /song/done - Performer marks their own song finished
pub async fn self_done(
    State(ctx): State<AppContext>,
    Json(req): Json<SelfDoneRequest>,
) -> Result<Json<StatusResponse>> {
    let outcome = {
        let mut party = ctx.party.lock().await;
        let outcome = party.self_done(req.device_id.as_deref().unwrap_or(""))?;
        ctx.events
            .emit_lossy(PartyEvent::QueueUpdated(party.snapshot()));
        if let Some(next) = &outcome.next_up {
            ctx.events.emit_lossy(PartyEvent::YourTurnSoon {
                guest_id: next.song.guest_id.clone(),
                song_id: next.song.id,
            });
        }
        outcome
    };
    ctx.saver.request_save();
    spawn_commentary(&ctx, Some(outcome.finished), None, false);
    Ok(Json(StatusResponse::with_message("Great job! 🎤")))
}

// ============================================================================
// VIP Powers
// ============================================================================

/// POST /vip/skip - One-shot fast-track to the front of the queue
pub async fn vip_skip(
    State(ctx): State<AppContext>,
    Json(req): Json<VipSkipRequest>,
) -> Result<Json<StatusResponse>> {
    {
        let mut party = ctx.party.lock().await;
        let guest = party.vip_skip(
            req.device_id.as_deref().unwrap_or(""),
            req.song_id.unwrap_or(0),
        )?;
        ctx.events
            .emit_lossy(PartyEvent::QueueUpdated(party.snapshot()));
        ctx.events.emit_lossy(PartyEvent::VipSkip {
            guest_name: guest.name,
        });
    }
    ctx.saver.request_save();
    Ok(Json(StatusResponse::ok()))
}

// ============================================================================
// Commentary Fan-out
// ============================================================================

fn intro_request_for(started: &StartedSong) -> IntroRequest {
    IntroRequest {
        guest_name: started.song.song.guest_name.clone(),
        song_title: started.song.song.song_title.clone(),
        voice_persona: started.song.song.voice_persona.clone(),
        songs_completed: started.song.songs_completed,
        is_vip: started.song.is_vip,
        drunk_o_meter: started.drunk_o_meter,
        recent_reactions: started.reaction_summary.clone(),
    }
}

fn post_song_request_for(finished: &FinishedSong) -> PostSongRequest {
    PostSongRequest {
        guest_name: finished.song.song.guest_name.clone(),
        song_title: finished.song.song.song_title.clone(),
        voice_persona: finished.song.song.voice_persona.clone(),
        duration_secs: finished.duration_secs,
        reaction_summary: finished.reaction_summary.clone(),
        songs_completed: finished.song.songs_completed,
    }
}

fn emit_now_playing(events: &EventBus, started: StartedSong, text: String, auto_play: bool) {
    events.emit_lossy(PartyEvent::NowPlaying {
        is_vip: started.song.is_vip,
        song: started.song,
        commentary_text: text,
        auto_play,
    });
}

/// Resolve announcer lines off the party lock and push the resulting
/// events. When a transition both ends and starts a performance, the
/// song-finished announcement goes out before the now-playing one.
fn spawn_commentary(
    ctx: &AppContext,
    finished: Option<FinishedSong>,
    started: Option<StartedSong>,
    auto_play: bool,
) {
    if finished.is_none() && started.is_none() {
        return;
    }
    let announcer = Arc::clone(&ctx.announcer);
    let events = ctx.events.clone();

    tokio::spawn(async move {
        match (finished, started) {
            (Some(finished), Some(started)) => {
                let (outro, intro) = tokio::join!(
                    announcer.post_song(&post_song_request_for(&finished)),
                    announcer.intro(&intro_request_for(&started)),
                );
                events.emit_lossy(PartyEvent::SongFinished {
                    song: finished.song,
                    commentary_text: outro,
                });
                emit_now_playing(&events, started, intro, auto_play);
            }
            (Some(finished), None) => {
                let outro = announcer.post_song(&post_song_request_for(&finished)).await;
                events.emit_lossy(PartyEvent::SongFinished {
                    song: finished.song,
                    commentary_text: outro,
                });
            }
            (None, Some(started)) => {
                let intro = announcer.intro(&intro_request_for(&started)).await;
                emit_now_playing(&events, started, intro, auto_play);
            }
            (None, None) => {}
        }
    });
}
