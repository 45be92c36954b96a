use std::sync::{Arc, Mutex, PoisonError};

use poise::serenity_prelude as serenity;
use serenity::async_trait;
use serenity::Http;
use tracing::{debug, warn};

use super::voice_connection::{CompletionToken, StatusSink};

/// Songbird track event handler that reports the end of one playback to its session.
///
/// It is registered for both `TrackEvent::End` and `TrackEvent::Error`; the token is
/// shared between the two registrations so only the first event gets through.
#[derive(Clone)]
pub struct TrackEndNotifier {
    pub guild_id: serenity::GuildId,
    token: Arc<Mutex<Option<CompletionToken>>>,
}

impl TrackEndNotifier {
    pub fn new(guild_id: serenity::GuildId, token: CompletionToken) -> Self {
        Self {
            guild_id,
            token: Arc::new(Mutex::new(Some(token))),
        }
    }

    fn take_token(&self) -> Option<CompletionToken> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[async_trait]
impl songbird::EventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &songbird::EventContext<'_>) -> Option<songbird::Event> {
        if let songbird::EventContext::Track(tracks) = ctx {
            let mut errored = false;
            for (state, _) in tracks.iter() {
                if let songbird::tracks::PlayMode::Errored(err) = &state.playing {
                    warn!("Track errored in guild {}: {}", self.guild_id, err);
                    errored = true;
                }
            }

            match self.take_token() {
                Some(token) if errored => token.fail(),
                Some(token) => {
                    debug!(
                        "Track ended for guild {} (playback {})",
                        self.guild_id,
                        token.generation()
                    );
                    token.complete();
                }
                None => debug!("Track end already reported for guild {}", self.guild_id),
            }
        }
        None
    }
}

/// Posts asynchronous playback messages in the text channel the last command came from
pub struct ChannelStatusSink {
    http: Arc<Http>,
    channel_id: serenity::ChannelId,
}

impl ChannelStatusSink {
    pub fn new(http: Arc<Http>, channel_id: serenity::ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl StatusSink for ChannelStatusSink {
    async fn notify(&self, message: String) {
        if let Err(e) = self.channel_id.say(&*self.http, message).await {
            warn!(
                "Failed to send status message to channel {}: {}",
                self.channel_id, e
            );
        }
    }
}
