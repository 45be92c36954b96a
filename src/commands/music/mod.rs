pub(crate) mod leave;
pub(crate) mod loop_track;
pub(crate) mod pause;
pub(crate) mod play;
pub(crate) mod play_url;
pub(crate) mod playlist;
pub(crate) mod queue;
pub(crate) mod resume;
pub(crate) mod skip;
pub(crate) mod stop;

pub mod audio_sources;
pub mod utils;

use crate::{CommandResult, Context, Error};
use poise::CreateReply;
use poise::serenity_prelude::{ChannelId, GuildId};
use std::sync::Arc;
use tracing::{debug, warn};
use utils::{
    embedded_messages,
    event_handlers::ChannelStatusSink,
    music_manager::{MusicError, MusicResult, get_user_voice_channel},
    songbird_voice::SongbirdBackend,
    voice_session::VoiceSession,
};

type Session = Arc<VoiceSession<SongbirdBackend>>;

/// Session of the guild the command was invoked in
fn guild_session(ctx: Context<'_>) -> Result<(GuildId, Session), Error> {
    let guild_id = ctx.guild_id().ok_or_else(|| Box::new(MusicError::NotInGuild) as Error)?;
    Ok((guild_id, ctx.data().music.session(guild_id)))
}

/// Voice channel of the command author, if any
fn requester_voice_channel(ctx: Context<'_>, guild_id: GuildId) -> Option<ChannelId> {
    match get_user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id) {
        Ok(channel_id) => Some(channel_id),
        Err(err) => {
            debug!("No voice channel for {}: {}", ctx.author().name, err);
            None
        }
    }
}

/// Send follow-up playback messages to the channel this command came from
async fn bind_status(ctx: Context<'_>, session: &Session) {
    let sink = ChannelStatusSink::new(ctx.serenity_context().http.clone(), ctx.channel_id());
    session.bind_status(Arc::new(sink)).await;
}

/// Reply with `success` or with the error turned into a user-facing message
async fn reply<T>(
    ctx: Context<'_>,
    result: MusicResult<T>,
    success: impl FnOnce(T) -> CreateReply,
) -> CommandResult {
    let message = match result {
        Ok(value) => success(value),
        Err(err) => {
            warn!("Music command '{}' failed: {}", ctx.command().name, err);
            embedded_messages::music_error(&err)
        }
    };

    ctx.send(message).await?;
    Ok(())
}

/// Queue a single URL; shared by `play` and `url`
async fn enqueue_url(ctx: Context<'_>, url: &str) -> CommandResult {
    let (guild_id, session) = guild_session(ctx)?;
    let voice_channel = requester_voice_channel(ctx, guild_id);

    ctx.defer().await?;
    bind_status(ctx, &session).await;

    let result = session.enqueue_from_url(url, voice_channel).await;
    reply(ctx, result, |(metadata, outcome)| {
        embedded_messages::added_to_queue(&metadata, outcome.started)
    })
    .await
}
