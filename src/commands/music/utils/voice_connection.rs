//! Seams between a [`VoiceSession`](super::voice_session::VoiceSession) and the
//! voice transport it drives.

use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::music_manager::MusicResult;

/// How one playback ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackEnded {
    pub generation: u64,
    /// The transport gave up on the stream instead of reaching its end
    pub errored: bool,
}

/// One-shot completion callback handed to [`VoiceConnection::play`].
///
/// The token is tagged with the generation of the playback it was issued for.
/// `complete` and `fail` consume it, so a playback can report its end at most once.
pub struct CompletionToken {
    generation: u64,
    sender: UnboundedSender<PlaybackEnded>,
}

impl CompletionToken {
    pub(crate) fn new(generation: u64, sender: UnboundedSender<PlaybackEnded>) -> Self {
        Self { generation, sender }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Report that the playback this token belongs to has ended
    pub fn complete(self) {
        self.send(false);
    }

    /// Report that the playback this token belongs to broke off with an error
    pub fn fail(self) {
        self.send(true);
    }

    fn send(self, errored: bool) {
        let ended = PlaybackEnded {
            generation: self.generation,
            errored,
        };
        if self.sender.send(ended).is_err() {
            debug!(
                "Session went away before playback {} completed",
                self.generation
            );
        }
    }
}

impl fmt::Debug for CompletionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionToken")
            .field("generation", &self.generation)
            .finish()
    }
}

/// An established audio link to a single voice channel.
#[async_trait]
pub trait VoiceConnection: Send + Sync + 'static {
    /// The locally playable stream type this connection accepts.
    type Stream: Send + 'static;

    async fn is_connected(&self) -> bool;

    async fn is_playing(&self) -> bool;

    async fn is_paused(&self) -> bool;

    /// Start playing `stream`, replacing whatever was playing before.
    ///
    /// `on_complete` must be completed when the playback ends or is stopped, and
    /// failed when the transport reports an error.
    async fn play(&self, stream: Self::Stream, on_complete: CompletionToken) -> MusicResult<()>;

    async fn pause(&self) -> MusicResult<()>;

    async fn resume(&self) -> MusicResult<()>;

    async fn stop(&self) -> MusicResult<()>;

    async fn disconnect(&self) -> MusicResult<()>;
}

/// Establishes [`VoiceConnection`]s.
#[async_trait]
pub trait VoiceConnector: Send + Sync + 'static {
    type Connection: VoiceConnection;

    async fn connect(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> MusicResult<Self::Connection>;
}

/// Where follow-up messages discovered after a command returned are sent.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn notify(&self, message: String);
}
