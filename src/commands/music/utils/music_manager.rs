use dashmap::DashMap;
use poise::serenity_prelude::{ChannelId, Context, GuildId, UserId};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::voice_session::{MusicBackend, SessionSettings, VoiceSession};

/// Errors that can occur during music operations
#[derive(Error, Debug)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("User is not in a voice channel")]
    UserNotInVoiceChannel,

    #[error("Nothing is playing")]
    NothingPlaying,

    #[error("Invalid url: {0}")]
    InvalidUrl(String),

    #[error("Invalid playlist: {0}")]
    InvalidPlaylist(String),

    #[error("No results found for '{0}'")]
    NoResultsFound(String),

    #[error("Audio source error: {0}")]
    ResolutionFailure(String),

    #[error("Playback error: {0}")]
    PlaybackError(String),

    #[error("Voice connection dropped")]
    ConnectionDropped,
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// Per-guild registry of voice sessions.
///
/// Every guild gets its own [`VoiceSession`] with its own queue, connection and
/// serialization. Guilds never share state.
pub struct SessionRegistry<B: MusicBackend> {
    connector: Arc<B::Connector>,
    resolver: Arc<B::Resolver>,
    settings: SessionSettings,
    sessions: DashMap<GuildId, Arc<VoiceSession<B>>>,
}

impl<B: MusicBackend> SessionRegistry<B> {
    pub fn new(
        connector: Arc<B::Connector>,
        resolver: Arc<B::Resolver>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            connector,
            resolver,
            settings,
            sessions: DashMap::new(),
        }
    }

    /// Get the session for a guild, creating it on first use
    pub fn session(&self, guild_id: GuildId) -> Arc<VoiceSession<B>> {
        self.sessions
            .entry(guild_id)
            .or_insert_with(|| {
                info!("Creating voice session for guild {}", guild_id);
                VoiceSession::new(
                    guild_id,
                    Arc::clone(&self.connector),
                    Arc::clone(&self.resolver),
                    self.settings.clone(),
                )
            })
            .clone()
    }

    /// Get the session for a guild without creating one
    pub fn get(&self, guild_id: GuildId) -> Option<Arc<VoiceSession<B>>> {
        self.sessions.get(&guild_id).map(|entry| entry.value().clone())
    }

    /// Forward a gateway notice that the bot left voice in this guild
    pub async fn connection_lost(&self, guild_id: GuildId) {
        match self.get(guild_id) {
            Some(session) => session.connection_lost().await,
            None => debug!("No session to tear down for guild {}", guild_id),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Get the voice channel ID that the user is currently in
pub fn get_user_voice_channel(
    ctx: &Context,
    guild_id: GuildId,
    user_id: UserId,
) -> MusicResult<ChannelId> {
    // Get the guild
    let guild = ctx.cache.guild(guild_id).ok_or(MusicError::NotInGuild)?;

    // Get the voice state of the user
    let voice_state = guild
        .voice_states
        .get(&user_id)
        .ok_or(MusicError::UserNotInVoiceChannel)?;

    voice_state
        .channel_id
        .ok_or(MusicError::UserNotInVoiceChannel)
}
