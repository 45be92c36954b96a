use super::*;

/// Pause the current track
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn pause(ctx: Context<'_>) -> CommandResult {
    let (_, session) = guild_session(ctx)?;

    let result = session.pause().await;
    reply(ctx, result, |_| embedded_messages::paused()).await
}
