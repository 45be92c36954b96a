use super::*;

/// Forget your conversation with the AI and start over
#[poise::command(slash_command, prefix_command, rename = "newchat", category = "AI")]
pub async fn new_chat(ctx: Context<'_>) -> CommandResult {
    let client = &ctx.data().chat;
    if !client.is_enabled() {
        ctx.say(NOT_IN_THE_MOOD).await?;
        return Ok(());
    }

    client.new_conversation(ctx.author().id);
    ctx.say("Starting a new conversation! :D").await?;
    Ok(())
}
