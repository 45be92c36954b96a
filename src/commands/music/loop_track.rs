use super::*;

/// Toggle repeating the current track
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    rename = "loop",
    category = "Music"
)]
pub async fn loop_track(ctx: Context<'_>) -> CommandResult {
    let (_, session) = guild_session(ctx)?;

    let enabled = session.toggle_loop().await;
    ctx.send(embedded_messages::loop_status(enabled)).await?;
    Ok(())
}
