use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ytbot::utils::{config::BotConfig, ollama_client::OllamaClient};
use ytbot::{Data, Error, events};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ytbot=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    dotenv().ok();

    let config = BotConfig::from_env()?;

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let chat = Arc::new(OllamaClient::from_config(&config));

    #[cfg(feature = "music")]
    let (voice, music) = {
        use ytbot::commands::music::audio_sources::youtube::YoutubeApi;
        use ytbot::commands::music::utils::{
            songbird_voice::{MusicManager, SongbirdConnector},
            voice_session::SessionSettings,
        };

        let voice = songbird::Songbird::serenity();
        let settings = SessionSettings {
            idle_limit: config.idle_timeout_secs,
            ..Default::default()
        };
        let music = Arc::new(MusicManager::new(
            Arc::new(SongbirdConnector::new(voice.clone())),
            Arc::new(YoutubeApi::default()),
            settings,
        ));
        (voice, music)
    };

    let data = Data {
        config: config.clone(),
        chat,
        #[cfg(feature = "music")]
        music: music.clone(),
    };

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: ytbot::commands(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.command_prefix.clone()),
                ..Default::default()
            },
            on_error: |error| Box::pin(events::on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered {} commands", framework.options().commands.len());
                Ok(data)
            })
        })
        .build();

    let handler = events::Handler {
        #[cfg(feature = "music")]
        music,
    };

    let client_builder = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .event_handler(handler);

    // Create and run client
    #[cfg(feature = "music")]
    {
        use songbird::SerenityInit;

        let mut client = client_builder.register_songbird_with(voice).await?;
        client.start().await.map_err(Into::into)
    }

    #[cfg(not(feature = "music"))]
    {
        let mut client = client_builder.await?;
        client.start().await.map_err(Into::into)
    }
}
