use super::*;

/// Leave the voice channel and clear the queue
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn leave(ctx: Context<'_>) -> CommandResult {
    let (_, session) = guild_session(ctx)?;

    let result = session.leave().await;
    reply(ctx, result, |_| embedded_messages::left_voice_channel()).await
}
