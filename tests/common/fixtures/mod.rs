//! Sample ids and tracks used across the session tests

use serenity::model::id::{ChannelId, GuildId};
use ytbot::commands::music::audio_sources::track_metadata::TrackMetadata;

pub const GUILD: GuildId = GuildId::new(100_000_000_000_000_001);
pub const OTHER_GUILD: GuildId = GuildId::new(100_000_000_000_000_002);
pub const VOICE_CHANNEL: ChannelId = ChannelId::new(200_000_000_000_000_001);

pub const PLAYLIST_URL: &str = "https://www.youtube.com/playlist?list=PLx0sYbCqOb8TBPRdmBHs5Iftvv9TPboYG";

/// The requesting user's voice channel
pub fn in_voice() -> Option<ChannelId> {
    Some(VOICE_CHANNEL)
}

/// A resolved track whose url ends with `name`
pub fn track(name: &str) -> TrackMetadata {
    TrackMetadata {
        title: name.to_string(),
        url: format!("https://youtu.be/{}", name),
        duration: None,
    }
}

/// How `track(name)` shows up in a queue snapshot
pub fn listed(name: &str) -> String {
    format!("{} - https://youtu.be/{}", name, name)
}
