//! Mock implementations for external dependencies
//! This module contains the fake voice transport and the mocked resolver

use mockall::mock;
use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::{Arc, Mutex, MutexGuard};

use ytbot::commands::music::audio_sources::{AudioResolver, track_metadata::TrackMetadata};
use ytbot::commands::music::utils::music_manager::{MusicError, MusicResult};
use ytbot::commands::music::utils::voice_connection::{
    CompletionToken, StatusSink, VoiceConnection, VoiceConnector,
};
use ytbot::commands::music::utils::voice_session::{MusicBackend, SessionSettings, VoiceSession};

use super::fixtures::GUILD;

/// Stand-in for decoded audio: the url it was made from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeStream(pub String);

#[derive(Default)]
struct VoiceLog {
    connects: Vec<ChannelId>,
    disconnects: usize,
    stops: usize,
    played: Vec<String>,
    current: Option<CompletionToken>,
    paused: bool,
    connected: bool,
    live_connection: u64,
}

/// Shared recorder behind every fake connection of one test
#[derive(Clone, Default)]
pub struct FakeVoice {
    log: Arc<Mutex<VoiceLog>>,
}

impl FakeVoice {
    fn log(&self) -> MutexGuard<'_, VoiceLog> {
        self.log.lock().expect("voice log poisoned")
    }

    pub fn connects(&self) -> usize {
        self.log().connects.len()
    }

    pub fn disconnects(&self) -> usize {
        self.log().disconnects
    }

    pub fn stops(&self) -> usize {
        self.log().stops
    }

    /// Urls handed to `play`, in order
    pub fn played(&self) -> Vec<String> {
        self.log().played.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.log().connected
    }

    pub fn is_paused(&self) -> bool {
        self.log().paused
    }

    /// Whether a playback is in flight
    pub fn has_playback(&self) -> bool {
        self.log().current.is_some()
    }

    /// Let the current track run to its natural end
    pub fn finish_current(&self) {
        let token = {
            let mut log = self.log();
            log.paused = false;
            log.current.take()
        };
        token.expect("nothing is playing").complete();
    }

    /// Make the current track break off with a transport error
    pub fn fail_current(&self) {
        let token = {
            let mut log = self.log();
            log.paused = false;
            log.current.take()
        };
        token.expect("nothing is playing").fail();
    }

    /// Simulate the bot being kicked from the channel
    pub fn drop_connection(&self) {
        self.log().connected = false;
    }
}

pub struct FakeConnector {
    voice: FakeVoice,
}

impl FakeConnector {
    pub fn new(voice: FakeVoice) -> Self {
        Self { voice }
    }
}

#[async_trait]
impl VoiceConnector for FakeConnector {
    type Connection = FakeConnection;

    async fn connect(&self, _guild_id: GuildId, channel_id: ChannelId) -> MusicResult<FakeConnection> {
        let mut log = self.voice.log();
        log.connects.push(channel_id);
        log.live_connection += 1;
        log.connected = true;

        Ok(FakeConnection {
            id: log.live_connection,
            voice: self.voice.clone(),
        })
    }
}

pub struct FakeConnection {
    id: u64,
    voice: FakeVoice,
}

impl FakeConnection {
    fn live(&self, log: &VoiceLog) -> bool {
        log.connected && log.live_connection == self.id
    }
}

#[async_trait]
impl VoiceConnection for FakeConnection {
    type Stream = FakeStream;

    async fn is_connected(&self) -> bool {
        let log = self.voice.log();
        self.live(&log)
    }

    async fn is_playing(&self) -> bool {
        let log = self.voice.log();
        self.live(&log) && log.current.is_some()
    }

    async fn is_paused(&self) -> bool {
        self.voice.log().paused
    }

    async fn play(&self, stream: FakeStream, on_complete: CompletionToken) -> MusicResult<()> {
        let replaced = {
            let mut log = self.voice.log();
            log.played.push(stream.0);
            log.paused = false;
            log.current.replace(on_complete)
        };
        // Starting a new track ends the previous one
        if let Some(previous) = replaced {
            previous.complete();
        }
        Ok(())
    }

    async fn pause(&self) -> MusicResult<()> {
        let mut log = self.voice.log();
        if log.current.is_none() {
            return Err(MusicError::NothingPlaying);
        }
        log.paused = true;
        Ok(())
    }

    async fn resume(&self) -> MusicResult<()> {
        self.voice.log().paused = false;
        Ok(())
    }

    async fn stop(&self) -> MusicResult<()> {
        let token = {
            let mut log = self.voice.log();
            log.stops += 1;
            log.paused = false;
            log.current.take()
        };
        if let Some(token) = token {
            token.complete();
        }
        Ok(())
    }

    async fn disconnect(&self) -> MusicResult<()> {
        let token = {
            let mut log = self.voice.log();
            log.disconnects += 1;
            log.connected = false;
            log.paused = false;
            log.current.take()
        };
        if let Some(token) = token {
            token.complete();
        }
        Ok(())
    }
}

mock! {
    pub Resolver {}

    #[async_trait]
    impl AudioResolver for Resolver {
        type Stream = FakeStream;

        async fn resolve_search(&self, keywords: &str) -> MusicResult<Option<TrackMetadata>>;
        async fn resolve_url(&self, url: &str) -> MusicResult<TrackMetadata>;
        async fn resolve_playlist(&self, url: &str) -> MusicResult<Vec<TrackMetadata>>;
        async fn materialize(&self, track: &TrackMetadata) -> MusicResult<FakeStream>;
    }
}

/// A resolver whose `materialize` fails for urls containing "bad"
pub fn streaming_resolver() -> MockResolver {
    let mut resolver = MockResolver::new();
    resolver.expect_materialize().returning(|track| {
        if track.url.contains("bad") {
            Err(MusicError::ResolutionFailure(format!(
                "no audio stream for {}",
                track.url
            )))
        } else {
            Ok(FakeStream(track.url.clone()))
        }
    });
    resolver
}

/// Collects follow-up messages
#[derive(Clone, Default)]
pub struct RecordingSink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("sink poisoned").clone()
    }
}

#[async_trait]
impl StatusSink for RecordingSink {
    async fn notify(&self, message: String) {
        self.messages.lock().expect("sink poisoned").push(message);
    }
}

pub struct TestBackend;

impl MusicBackend for TestBackend {
    type Connector = FakeConnector;
    type Resolver = MockResolver;
}

pub type TestSession = Arc<VoiceSession<TestBackend>>;

/// A session on `GUILD` with the default 60 second idle limit
pub fn new_session(resolver: MockResolver, voice: &FakeVoice) -> TestSession {
    VoiceSession::new(
        GUILD,
        Arc::new(FakeConnector::new(voice.clone())),
        Arc::new(resolver),
        SessionSettings::default(),
    )
}
