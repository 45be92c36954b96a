use poise::serenity_prelude as serenity;
use serenity::async_trait;
use serenity::{Context, EventHandler, Ready, VoiceState};
#[cfg(feature = "music")]
use std::sync::Arc;
use tracing::{error, info, warn};

#[cfg(feature = "music")]
use crate::commands::music::utils::songbird_voice::MusicManager;
use crate::{Data, Error};

const UNKNOWN_COMMAND: &str = "Was that meant to be a command? Because if that's the case, maaaan I have no idea what you are waiting for me to do :/";

pub struct Handler {
    #[cfg(feature = "music")]
    pub music: Arc<MusicManager>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Logged in as {}", ready.user.name);
    }

    /// Notice when the bot itself is disconnected from voice (kicked, channel deleted, ...)
    async fn voice_state_update(&self, ctx: Context, _old: Option<VoiceState>, new: VoiceState) {
        if new.user_id != ctx.cache.current_user().id || new.channel_id.is_some() {
            return;
        }
        let Some(guild_id) = new.guild_id else {
            return;
        };

        info!("Bot left voice in guild {}", guild_id);
        #[cfg(feature = "music")]
        self.music.connection_lost(guild_id).await;
    }
}

/// Framework error handler: friendly replies for user mistakes, logs for the rest
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::UnknownCommand { ctx, msg, .. } => {
            if let Err(e) = msg.channel_id.say(ctx, UNKNOWN_COMMAND).await {
                warn!("Failed to answer unknown command: {}", e);
            }
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command '{}': {}", ctx.command().name, error);
            if let Err(e) = ctx.say("Something went wrong running that command... :(").await {
                warn!("Failed to report command error: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}
