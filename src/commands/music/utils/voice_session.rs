//! Per-guild voice session: lazy connection, playback queue, loop flag and idle
//! watchdog.
//!
//! All mutable state lives behind one async mutex, so commands, playback
//! completions and watchdog ticks for the same guild are serialized. Completions
//! and watchdog ticks carry a generation id and are ignored once superseded.

use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::commands::music::audio_sources::{
    self, AudioResolver, track_metadata::TrackMetadata,
};

use super::idle_watchdog::{self, DEFAULT_IDLE_LIMIT, IdleTarget, Probe, TICK_PERIOD};
use super::music_manager::{MusicError, MusicResult};
use super::playback_queue::{PlaybackQueue, QueueItem};
use super::voice_connection::{
    CompletionToken, PlaybackEnded, StatusSink, VoiceConnection, VoiceConnector,
};

/// Stream type produced by a connector's connections
pub type StreamOf<C> = <<C as VoiceConnector>::Connection as VoiceConnection>::Stream;

type ConnectionOf<B> = <<B as MusicBackend>::Connector as VoiceConnector>::Connection;

/// Ties a voice transport to an audio resolver producing streams it can play.
pub trait MusicBackend: Send + Sync + 'static {
    type Connector: VoiceConnector;
    type Resolver: AudioResolver<Stream = StreamOf<Self::Connector>>;
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Consecutive idle ticks before the connection is dropped
    pub idle_limit: u32,
    pub tick_period: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_limit: DEFAULT_IDLE_LIMIT,
            tick_period: TICK_PERIOD,
        }
    }
}

/// Result of adding tracks to a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnqueueOutcome {
    /// How many tracks were added
    pub added: usize,
    /// Whether the session was idle and one of the new tracks is now playing
    pub started: bool,
}

#[derive(Debug)]
struct NowPlaying {
    item: QueueItem,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Release {
    /// A user asked to leave
    Requested,
    /// The watchdog timed out
    Idle,
    /// The connection vanished on its own
    Dropped,
}

struct SessionState<Conn> {
    connection: Option<Conn>,
    watchdog: Option<JoinHandle<()>>,
    watchdog_generation: u64,
    queue: PlaybackQueue,
    current: Option<NowPlaying>,
    playback_generation: u64,
    looping: bool,
    status: Option<Arc<dyn StatusSink>>,
}

impl<Conn> Default for SessionState<Conn> {
    fn default() -> Self {
        Self {
            connection: None,
            watchdog: None,
            watchdog_generation: 0,
            queue: PlaybackQueue::new(),
            current: None,
            playback_generation: 0,
            looping: false,
            status: None,
        }
    }
}

pub struct VoiceSession<B: MusicBackend> {
    guild_id: GuildId,
    connector: Arc<B::Connector>,
    resolver: Arc<B::Resolver>,
    settings: SessionSettings,
    completions: UnboundedSender<PlaybackEnded>,
    me: Weak<Self>,
    state: Mutex<SessionState<ConnectionOf<B>>>,
}

impl<B: MusicBackend> VoiceSession<B> {
    /// Create a session and start the task that feeds playback completions back into it
    pub fn new(
        guild_id: GuildId,
        connector: Arc<B::Connector>,
        resolver: Arc<B::Resolver>,
        settings: SessionSettings,
    ) -> Arc<Self> {
        let (completions, receiver) = mpsc::unbounded_channel();
        let session = Arc::new_cyclic(|me| Self {
            guild_id,
            connector,
            resolver,
            settings,
            completions,
            me: me.clone(),
            state: Mutex::new(SessionState::default()),
        });

        tokio::spawn(Self::drive_completions(Arc::downgrade(&session), receiver));
        session
    }

    async fn drive_completions(
        session: Weak<Self>,
        mut receiver: UnboundedReceiver<PlaybackEnded>,
    ) {
        while let Some(ended) = receiver.recv().await {
            let Some(session) = session.upgrade() else {
                break;
            };
            session.on_playback_complete(ended).await;
        }
    }

    /// Route asynchronous follow-up messages (e.g. late resolution failures) to `sink`
    pub async fn bind_status(&self, sink: Arc<dyn StatusSink>) {
        self.state.lock().await.status = Some(sink);
    }

    /// Make sure a live connection exists, joining `voice_channel` if needed.
    ///
    /// Restarts the idle watchdog on success.
    pub async fn ensure_connected(&self, voice_channel: Option<ChannelId>) -> MusicResult<()> {
        let mut guard = self.state.lock().await;
        self.connect_locked(&mut guard, voice_channel).await
    }

    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.connection.is_some()
    }

    /// Search for `keywords` and queue the first match
    pub async fn enqueue_from_keywords(
        &self,
        keywords: &str,
        voice_channel: Option<ChannelId>,
    ) -> MusicResult<(TrackMetadata, EnqueueOutcome)> {
        let keywords = keywords.trim();
        if keywords.is_empty() {
            return Err(MusicError::NoResultsFound(String::new()));
        }

        let metadata = self
            .resolver
            .resolve_search(keywords)
            .await?
            .ok_or_else(|| MusicError::NoResultsFound(keywords.to_string()))?;
        debug!("Search '{}' resolved to {}", keywords, metadata.url);

        let outcome = self
            .enqueue_tracks(vec![metadata.clone()], voice_channel)
            .await?;
        Ok((metadata, outcome))
    }

    /// Validate and queue a single video URL.
    ///
    /// Rejected URLs never reach the resolver.
    pub async fn enqueue_from_url(
        &self,
        url: &str,
        voice_channel: Option<ChannelId>,
    ) -> MusicResult<(TrackMetadata, EnqueueOutcome)> {
        let url = audio_sources::validate_track_url(url)?;
        let metadata = self.resolver.resolve_url(&url).await?;

        let outcome = self
            .enqueue_tracks(vec![metadata.clone()], voice_channel)
            .await?;
        Ok((metadata, outcome))
    }

    /// Validate a playlist URL and queue all of its entries in order
    pub async fn enqueue_from_playlist(
        &self,
        url: &str,
        voice_channel: Option<ChannelId>,
    ) -> MusicResult<EnqueueOutcome> {
        let url = audio_sources::validate_playlist_url(url)?;
        let tracks = self.resolver.resolve_playlist(&url).await?;
        if tracks.is_empty() {
            return Err(MusicError::InvalidPlaylist(url));
        }

        self.enqueue_tracks(tracks, voice_channel).await
    }

    /// Queue already-resolved tracks
    pub async fn enqueue_tracks(
        &self,
        tracks: Vec<TrackMetadata>,
        voice_channel: Option<ChannelId>,
    ) -> MusicResult<EnqueueOutcome> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        self.connect_locked(state, voice_channel).await?;

        let added = tracks.len();
        for metadata in tracks {
            state.queue.push_back(QueueItem::new(metadata));
        }
        info!(
            "Queued {} track(s) for guild {} ({} pending)",
            added,
            self.guild_id,
            state.queue.len()
        );

        // Nothing in flight means nothing will ever call advance for us.
        let idle = state.current.is_none();
        if idle && added > 0 {
            self.advance(state).await;
        }

        Ok(EnqueueOutcome {
            added,
            started: idle && state.current.is_some(),
        })
    }

    /// Stop the current track without moving on; the queue is kept
    pub async fn stop(&self) -> MusicResult<()> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        self.check_live(state).await?;
        let connection = state.connection.as_ref().ok_or(MusicError::NotConnected)?;

        // Forget the playback before stopping it so its completion is ignored.
        if let Some(stopped) = state.current.take() {
            info!(
                "Stopping '{}' in guild {}",
                stopped.item.metadata.title, self.guild_id
            );
        }
        connection.stop().await
    }

    pub async fn pause(&self) -> MusicResult<()> {
        let mut guard = self.state.lock().await;
        self.check_live(&mut guard).await?;
        let connection = guard.connection.as_ref().ok_or(MusicError::NotConnected)?;
        if guard.current.is_none() {
            return Err(MusicError::NothingPlaying);
        }
        connection.pause().await
    }

    /// Resume a paused track, or restart a stopped queue
    pub async fn resume(&self) -> MusicResult<()> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        self.check_live(state).await?;
        let connection = state.connection.as_ref().ok_or(MusicError::NotConnected)?;

        if state.current.is_some() {
            return connection.resume().await;
        }
        if state.queue.is_empty() {
            return Err(MusicError::NothingPlaying);
        }

        info!("Restarting queue for guild {}", self.guild_id);
        self.advance(state).await;
        Ok(())
    }

    /// Stop the current track and move on to the next one, turning loop off
    pub async fn skip(&self) -> MusicResult<()> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state.looping = false;

        self.check_live(state).await?;
        let connection = state.connection.as_ref().ok_or(MusicError::NotConnected)?;
        let Some(current) = state.current.as_ref() else {
            return Err(MusicError::NothingPlaying);
        };
        info!(
            "Skipping '{}' in guild {}",
            current.item.metadata.title, self.guild_id
        );

        // The completion of this playback drives the advance.
        connection.stop().await
    }

    /// Flip the loop flag and return its new value
    pub async fn toggle_loop(&self) -> bool {
        let mut state = self.state.lock().await;
        state.looping = !state.looping;
        info!("Looping for guild {}: {}", self.guild_id, state.looping);
        state.looping
    }

    pub async fn is_looping(&self) -> bool {
        self.state.lock().await.looping
    }

    /// Display strings for the pending tracks; never includes the track playing now
    pub async fn queue_snapshot(&self) -> Vec<String> {
        self.state.lock().await.queue.snapshot()
    }

    pub async fn now_playing(&self) -> Option<TrackMetadata> {
        let state = self.state.lock().await;
        state.current.as_ref().map(|now| now.item.metadata.clone())
    }

    /// Leave the voice channel; the queue is kept for a later reconnect
    pub async fn disconnect(&self) {
        let mut guard = self.state.lock().await;
        self.release(&mut guard, Release::Requested).await;
    }

    /// Leave the voice channel and forget every pending track.
    ///
    /// Without a connection nothing is touched.
    pub async fn leave(&self) -> MusicResult<()> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        if state.connection.is_none() {
            return Err(MusicError::NotConnected);
        }

        self.release(state, Release::Requested).await;
        state.queue.clear();
        state.looping = false;
        Ok(())
    }

    /// Tear down the session if its connection is no longer alive.
    ///
    /// Gateway events can arrive late, so a connection that still reports
    /// itself as connected is left alone.
    pub async fn connection_lost(&self) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let Some(connection) = state.connection.as_ref() else {
            return;
        };
        if connection.is_connected().await {
            debug!(
                "Ignoring voice state update for guild {}: connection is alive",
                self.guild_id
            );
            return;
        }

        self.release(state, Release::Dropped).await;
    }

    pub(crate) async fn on_playback_complete(&self, ended: PlaybackEnded) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let generation = ended.generation;

        let is_current = state
            .current
            .as_ref()
            .is_some_and(|now| now.generation == generation);
        if !is_current {
            debug!(
                "Ignoring stale completion {} for guild {}",
                generation, self.guild_id
            );
            return;
        }
        let Some(finished) = state.current.take() else {
            return;
        };

        if ended.errored {
            // Never loop a stream the transport could not play.
            warn!(
                "Playback of '{}' failed in guild {}",
                finished.item.metadata.url, self.guild_id
            );
            report(
                &state.status,
                format!("Failed to play {}", finished.item.metadata),
            )
            .await;
        } else {
            debug!(
                "Finished '{}' in guild {}",
                finished.item.metadata.title, self.guild_id
            );
            if state.looping {
                state.queue.push_front(finished.item);
            }
        }

        self.advance(state).await;
    }

    async fn connect_locked(
        &self,
        state: &mut SessionState<ConnectionOf<B>>,
        voice_channel: Option<ChannelId>,
    ) -> MusicResult<()> {
        if let Some(connection) = state.connection.as_ref() {
            if connection.is_connected().await {
                self.restart_watchdog(state);
                return Ok(());
            }
            warn!(
                "Voice connection for guild {} is gone, reconnecting",
                self.guild_id
            );
            self.release(state, Release::Dropped).await;
        }

        let channel_id = voice_channel.ok_or(MusicError::UserNotInVoiceChannel)?;
        info!(
            "Connecting to voice channel {} in guild {}",
            channel_id, self.guild_id
        );
        let connection = self.connector.connect(self.guild_id, channel_id).await?;
        state.connection = Some(connection);
        self.restart_watchdog(state);

        Ok(())
    }

    /// Fail with `NotConnected` without a connection, or tear down a dead one
    /// and fail with `ConnectionDropped`
    async fn check_live(&self, state: &mut SessionState<ConnectionOf<B>>) -> MusicResult<()> {
        let alive = match state.connection.as_ref() {
            Some(connection) => connection.is_connected().await,
            None => return Err(MusicError::NotConnected),
        };
        if !alive {
            self.release(state, Release::Dropped).await;
            return Err(MusicError::ConnectionDropped);
        }
        Ok(())
    }

    fn restart_watchdog(&self, state: &mut SessionState<ConnectionOf<B>>) {
        if let Some(previous) = state.watchdog.take() {
            previous.abort();
        }

        state.watchdog_generation += 1;
        let generation = state.watchdog_generation;
        debug!(
            "Starting idle watchdog {} for guild {}",
            generation, self.guild_id
        );

        state.watchdog = Some(tokio::spawn(idle_watchdog::run(
            self.me.clone(),
            generation,
            self.settings.tick_period,
            self.settings.idle_limit,
        )));
    }

    /// Drop the connection exactly once and invalidate everything tied to it
    async fn release(&self, state: &mut SessionState<ConnectionOf<B>>, reason: Release) {
        state.watchdog_generation += 1;
        if let Some(watchdog) = state.watchdog.take() {
            // The watchdog may be the caller; it exits on its own once stale.
            if reason == Release::Requested {
                watchdog.abort();
            }
        }
        state.current = None;

        let Some(connection) = state.connection.take() else {
            return;
        };

        match reason {
            Release::Dropped => {
                warn!("Voice connection for guild {} was dropped", self.guild_id);
            }
            Release::Idle | Release::Requested => {
                info!(
                    "Leaving voice in guild {} ({:?})",
                    self.guild_id, reason
                );
                if let Err(err) = connection.disconnect().await {
                    warn!("Failed to disconnect from guild {}: {}", self.guild_id, err);
                }
            }
        }
    }

    /// Play the next queued track that can be resolved.
    ///
    /// Tracks that fail to resolve or play are reported and dropped; the loop is
    /// bounded by the queue length.
    async fn advance(&self, state: &mut SessionState<ConnectionOf<B>>) {
        let status = state.status.clone();

        while let Some(item) = state.queue.pop_front() {
            let Some(connection) = state.connection.as_ref() else {
                debug!("No voice connection for guild {}, holding queue", self.guild_id);
                state.queue.push_front(item);
                return;
            };

            let stream = match self.resolver.materialize(&item.metadata).await {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(
                        "Could not resolve '{}' for guild {}: {}",
                        item.metadata.url, self.guild_id, err
                    );
                    report(&status, format!("Failed to play {}: {}", item.metadata, err)).await;
                    continue;
                }
            };

            state.playback_generation += 1;
            let generation = state.playback_generation;
            let token = CompletionToken::new(generation, self.completions.clone());

            match connection.play(stream, token).await {
                Ok(()) => {
                    info!(
                        "Now playing '{}' in guild {} (playback {})",
                        item.metadata.title, self.guild_id, generation
                    );
                    state.current = Some(NowPlaying { item, generation });
                    return;
                }
                Err(err) => {
                    error!(
                        "Voice connection refused '{}' in guild {}: {}",
                        item.metadata.url, self.guild_id, err
                    );
                    report(&status, format!("Failed to play {}: {}", item.metadata, err)).await;
                }
            }
        }

        debug!("Queue for guild {} is drained", self.guild_id);
    }
}

async fn report(status: &Option<Arc<dyn StatusSink>>, message: String) {
    match status {
        Some(sink) => sink.notify(message).await,
        None => debug!("No status channel bound, dropping message: {}", message),
    }
}

#[async_trait]
impl<B: MusicBackend> IdleTarget for VoiceSession<B> {
    async fn probe(&self, generation: u64) -> Probe {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        if state.watchdog_generation != generation {
            return Probe::Stale;
        }
        let Some(connection) = state.connection.as_ref() else {
            return Probe::Stale;
        };

        if !connection.is_connected().await {
            self.release(state, Release::Dropped).await;
            return Probe::Dropped;
        }

        if connection.is_playing().await && !connection.is_paused().await {
            Probe::Active
        } else {
            Probe::Idle
        }
    }

    async fn expire(&self, generation: u64) {
        let mut guard = self.state.lock().await;
        if guard.watchdog_generation != generation {
            return;
        }

        info!(
            "Voice in guild {} idle for {} ticks",
            self.guild_id, self.settings.idle_limit
        );
        self.release(&mut guard, Release::Idle).await;
    }
}
