use super::*;

/// Stop the current track; the queue is kept
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let (_, session) = guild_session(ctx)?;

    let result = session.stop().await;
    reply(ctx, result, |_| embedded_messages::stopped()).await
}
