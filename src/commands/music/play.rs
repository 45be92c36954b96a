use super::*;
use crate::commands::music::audio_sources::looks_like_url;
use tracing::info;

/// Play the first YouTube result for your keywords (or a YouTube URL)
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[description = "Search keywords or a YouTube URL"]
    #[rest]
    query: String,
) -> CommandResult {
    info!("Received play command with query: {}", query);
    if looks_like_url(&query) {
        return enqueue_url(ctx, &query).await;
    }

    let (guild_id, session) = guild_session(ctx)?;
    let voice_channel = requester_voice_channel(ctx, guild_id);

    // Searching takes a moment
    ctx.defer().await?;
    bind_status(ctx, &session).await;

    let result = session.enqueue_from_keywords(&query, voice_channel).await;
    reply(ctx, result, |(metadata, outcome)| {
        embedded_messages::result_found(&metadata, outcome.started)
    })
    .await
}
