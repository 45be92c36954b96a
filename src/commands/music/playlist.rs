use super::*;
use tracing::info;

/// Queue every video of a YouTube playlist
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn playlist(
    ctx: Context<'_>,
    #[description = "YouTube URL with a list= parameter"]
    #[rest]
    url: String,
) -> CommandResult {
    let (guild_id, session) = guild_session(ctx)?;
    let voice_channel = requester_voice_channel(ctx, guild_id);

    // Listing a playlist can take a while
    ctx.defer().await?;
    bind_status(ctx, &session).await;

    let result = session.enqueue_from_playlist(&url, voice_channel).await;
    if let Ok(outcome) = &result {
        info!("Queued {} playlist tracks for guild {}", outcome.added, guild_id);
    }
    reply(ctx, result, |outcome| {
        embedded_messages::playlist_added(outcome.added)
    })
    .await
}
