//! Songbird implementation of the voice connection seams.

use std::sync::Arc;

use poise::serenity_prelude as serenity;
use serenity::async_trait;
use songbird::input::Input;
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::{Call, Event, Songbird, TrackEvent};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::event_handlers::TrackEndNotifier;
use super::music_manager::{MusicError, MusicResult, SessionRegistry};
use super::voice_connection::{CompletionToken, VoiceConnection, VoiceConnector};
use super::voice_session::MusicBackend;
use crate::commands::music::audio_sources::youtube::YoutubeApi;

/// Joins voice channels through the songbird manager registered on the client
pub struct SongbirdConnector {
    manager: Arc<Songbird>,
}

impl SongbirdConnector {
    pub fn new(manager: Arc<Songbird>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl VoiceConnector for SongbirdConnector {
    type Connection = SongbirdConnection;

    async fn connect(
        &self,
        guild_id: serenity::GuildId,
        channel_id: serenity::ChannelId,
    ) -> MusicResult<SongbirdConnection> {
        let call = self
            .manager
            .join(guild_id, channel_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))?;
        info!("Joined voice channel {} in guild {}", channel_id, guild_id);

        Ok(SongbirdConnection {
            manager: Arc::clone(&self.manager),
            guild_id,
            call,
            track: Mutex::new(None),
        })
    }
}

/// One songbird call plus the handle of the track it is playing
pub struct SongbirdConnection {
    manager: Arc<Songbird>,
    guild_id: serenity::GuildId,
    call: Arc<Mutex<Call>>,
    track: Mutex<Option<TrackHandle>>,
}

impl SongbirdConnection {
    async fn play_mode(&self) -> Option<PlayMode> {
        let track = self.track.lock().await;
        let info = track.as_ref()?.get_info().await.ok()?;
        Some(info.playing)
    }

    async fn current_track(&self) -> MusicResult<TrackHandle> {
        self.track
            .lock()
            .await
            .clone()
            .ok_or(MusicError::NothingPlaying)
    }
}

#[async_trait]
impl VoiceConnection for SongbirdConnection {
    type Stream = Input;

    async fn is_connected(&self) -> bool {
        // The manager forgets the call once it is removed elsewhere.
        if self.manager.get(self.guild_id).is_none() {
            return false;
        }
        self.call.lock().await.current_connection().is_some()
    }

    async fn is_playing(&self) -> bool {
        matches!(
            self.play_mode().await,
            Some(PlayMode::Play) | Some(PlayMode::Pause)
        )
    }

    async fn is_paused(&self) -> bool {
        matches!(self.play_mode().await, Some(PlayMode::Pause))
    }

    async fn play(&self, stream: Input, on_complete: CompletionToken) -> MusicResult<()> {
        let handle = self.call.lock().await.play_only_input(stream);

        let notifier = TrackEndNotifier::new(self.guild_id, on_complete);
        for event in [TrackEvent::End, TrackEvent::Error] {
            handle
                .add_event(Event::Track(event), notifier.clone())
                .map_err(|e| MusicError::PlaybackError(e.to_string()))?;
        }

        debug!("Started track {} in guild {}", handle.uuid(), self.guild_id);
        *self.track.lock().await = Some(handle);
        Ok(())
    }

    async fn pause(&self) -> MusicResult<()> {
        self.current_track()
            .await?
            .pause()
            .map_err(|e| MusicError::PlaybackError(e.to_string()))
    }

    async fn resume(&self) -> MusicResult<()> {
        self.current_track()
            .await?
            .play()
            .map_err(|e| MusicError::PlaybackError(e.to_string()))
    }

    async fn stop(&self) -> MusicResult<()> {
        if let Some(track) = self.track.lock().await.take() {
            if let Err(e) = track.stop() {
                // Already finished; its end event has fired or is about to.
                debug!("Track in guild {} was already gone: {}", self.guild_id, e);
            }
        }
        Ok(())
    }

    async fn disconnect(&self) -> MusicResult<()> {
        self.track.lock().await.take();
        if let Err(e) = self.manager.remove(self.guild_id).await {
            warn!("Songbird had no call for guild {}: {}", self.guild_id, e);
        }
        Ok(())
    }
}

/// Songbird transport with yt-dlp resolution
pub struct SongbirdBackend;

impl MusicBackend for SongbirdBackend {
    type Connector = SongbirdConnector;
    type Resolver = YoutubeApi;
}

/// The per-guild session registry the bot runs with
pub type MusicManager = SessionRegistry<SongbirdBackend>;
