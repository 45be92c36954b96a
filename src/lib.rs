pub mod commands;
pub mod events;
pub mod utils;

use std::sync::{Arc, LazyLock};

#[cfg(feature = "music")]
use commands::music::utils::songbird_voice::MusicManager;
use utils::{config::BotConfig, ollama_client::OllamaClient};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// Shared HTTP client, reused by every songbird input
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

/// User data, which is stored and accessible in all command invocations
pub struct Data {
    pub config: BotConfig,
    pub chat: Arc<OllamaClient>,
    #[cfg(feature = "music")]
    pub music: Arc<MusicManager>,
}

#[poise::command(slash_command, prefix_command, category = "General")]
async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

#[poise::command(prefix_command, hide_in_help)]
async fn register(ctx: Context<'_>) -> Result<(), Error> {
    poise::builtins::register_application_commands_buttons(ctx)
        .await
        .map_err(|e| e.into())
}

/// Every command the bot registers
pub fn commands() -> Vec<poise::Command<Data, Error>> {
    use crate::commands::{
        ai::{chat::*, new_chat::*},
        general::ping::*,
    };

    #[allow(unused_mut)]
    let mut commands = vec![
        // Default commands
        register(),
        help(),
        // General commands
        ping(),
        // AI-centric commands
        chat(),
        new_chat(),
    ];

    // Handle Music feature
    #[cfg(feature = "music")]
    {
        use crate::commands::music::{
            leave::*, loop_track::*, pause::*, play::*, play_url::*, playlist::*, queue::*,
            resume::*, skip::*, stop::*,
        };

        commands.extend(vec![
            play(),
            play_url(),
            playlist(),
            stop(),
            pause(),
            resume(),
            queue(),
            loop_track(),
            skip(),
            leave(),
        ]);
    }

    commands
}
