//! Commands relaying messages to the Ollama chat model.

/// Submodule defining the `/chat` command.
pub(crate) mod chat;
/// Submodule defining the `/newchat` command.
pub(crate) mod new_chat;

use crate::CommandResult;
use crate::Context;

/// The maximum character length allowed for a single Discord message.
const MAX_MESSAGE_LENGTH: usize = 2000;

/// Reply sent when the model call fails
const NOT_FEELING_WELL: &str = "Sorry, I'm not feeling well... :(";

/// Reply sent when no model is configured
const NOT_IN_THE_MOOD: &str = "I'm not in the mood to chat... :(";

/// Split `response` into pieces of at most `MAX_MESSAGE_LENGTH` characters,
/// never cutting a character in half.
pub fn split_message(response: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = response;

    while !rest.is_empty() {
        let end = rest
            .char_indices()
            .nth(MAX_MESSAGE_LENGTH)
            .map(|(index, _)| index)
            .unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk);
        rest = tail;
    }

    chunks
}

/// Sends a potentially long response string by splitting it into chunks
/// that respect Discord's message length limit.
pub async fn chunk_response<S: AsRef<str>>(ctx: Context<'_>, response: S) -> CommandResult {
    for chunk in split_message(response.as_ref()) {
        ctx.say(chunk).await?;
    }

    Ok(())
}
