use super::*;

/// Resume a paused track, or restart the queue after a stop
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn resume(ctx: Context<'_>) -> CommandResult {
    let (_, session) = guild_session(ctx)?;
    bind_status(ctx, &session).await;

    let result = session.resume().await;
    reply(ctx, result, |_| embedded_messages::resumed()).await
}
