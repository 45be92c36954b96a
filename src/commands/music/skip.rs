use super::*;

/// Skip the current track (this also turns looping off)
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn skip(ctx: Context<'_>) -> CommandResult {
    let (_, session) = guild_session(ctx)?;

    let result = session.skip().await;
    reply(ctx, result, |_| embedded_messages::skipped()).await
}
