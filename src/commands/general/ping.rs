use poise::CreateReply;
use poise::serenity_prelude::CreateEmbed;

use crate::{CommandResult, Context};

/// Ping the bot to check its latency
#[poise::command(slash_command, prefix_command, category = "General")]
pub async fn ping(ctx: Context<'_>) -> CommandResult {
    // Zero until the shard has seen its first heartbeat ack
    let latency = ctx.ping().await.as_millis();

    let embed = CreateEmbed::new()
        .title("Pong!")
        .field("API Latency", format!("{} ms", latency), false)
        .color(0x00ff00);

    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}
