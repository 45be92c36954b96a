use super::*;
use tracing::warn;

/// Chat with the AI
#[poise::command(slash_command, prefix_command, category = "AI")]
pub async fn chat(
    ctx: Context<'_>,
    #[description = "Your chat message"]
    #[rest]
    message: String,
) -> CommandResult {
    let client = &ctx.data().chat;
    if !client.is_enabled() {
        ctx.say(NOT_IN_THE_MOOD).await?;
        return Ok(());
    }

    ctx.defer().await?;

    let author = ctx.author();
    match client.chat(author.id, &message).await {
        Ok(response) => chunk_response(ctx, response.message.content).await,
        Err(e) => {
            warn!("Chat failed for {}: {}", author.name, e);
            ctx.say(NOT_FEELING_WELL).await?;
            Ok(())
        }
    }
}
