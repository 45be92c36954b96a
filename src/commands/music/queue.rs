use super::*;

/// View the tracks waiting to be played
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn queue(ctx: Context<'_>) -> CommandResult {
    let (_, session) = guild_session(ctx)?;

    let now_playing = session.now_playing().await;
    let pending = session.queue_snapshot().await;

    ctx.send(embedded_messages::music_queue(now_playing.as_ref(), &pending))
        .await?;
    Ok(())
}
