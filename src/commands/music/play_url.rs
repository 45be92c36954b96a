use super::*;

/// Play the audio of a YouTube video
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    rename = "url",
    category = "Music"
)]
pub async fn play_url(
    ctx: Context<'_>,
    #[description = "https://www.youtube.com/... or https://youtu.be/... link"]
    #[rest]
    url: String,
) -> CommandResult {
    enqueue_url(ctx, &url).await
}
