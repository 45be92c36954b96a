use poise::CreateReply;
use poise::serenity_prelude::CreateEmbed;

use super::music_manager::MusicError;
use crate::commands::music::audio_sources::track_metadata::TrackMetadata;

const GREEN: u32 = 0x00ff00;
const RED: u32 = 0xff0000;

fn success(title: &str, description: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title(title)
            .description(description)
            .color(GREEN),
    )
}

fn failure(description: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("❌ Error")
            .description(description)
            .color(RED),
    )
}

/// Create an embed for when a search matched a track and it was queued
pub fn result_found(metadata: &TrackMetadata, started: bool) -> CreateReply {
    let status = if started { "Now playing" } else { "Added to queue!" };
    success(
        "🔎 Result found! :D",
        format!("{} --> \n{}", status, metadata),
    )
}

/// Create an embed for when a track is added to the queue
pub fn added_to_queue(metadata: &TrackMetadata, started: bool) -> CreateReply {
    let title = if started {
        "🎵 Now Playing"
    } else {
        "🎵 Added to Queue"
    };
    success(title, format!("Added to queue! --> \n{}", metadata))
}

/// Create an embed for when a whole playlist is added to the queue
pub fn playlist_added(count: usize) -> CreateReply {
    success(
        "📋 Playlist added",
        format!("Added {} tracks to the queue! :D", count),
    )
}

/// Create an embed listing the pending tracks
pub fn music_queue(now_playing: Option<&TrackMetadata>, pending: &[String]) -> CreateReply {
    if pending.is_empty() && now_playing.is_none() {
        return success("📭 Queue", "Queue is empty!");
    }

    let mut embed = CreateEmbed::new().title("🎵 Queue").color(GREEN);
    if let Some(metadata) = now_playing {
        embed = embed.field("Now Playing", metadata.to_string(), false);
    }

    let description = if pending.is_empty() {
        "Queue is empty!".to_string()
    } else {
        pending
            .iter()
            .enumerate()
            .map(|(index, entry)| format!("`#{}` {}", index + 1, entry))
            .collect::<Vec<_>>()
            .join("\n")
    };

    CreateReply::default().embed(embed.description(description))
}

pub fn stopped() -> CreateReply {
    success("⏹️ Stopped!", "Playback stopped, the queue is kept")
}

pub fn paused() -> CreateReply {
    success("⏸️ Paused!", "Use resume to continue")
}

pub fn resumed() -> CreateReply {
    success("▶️ Resumed!", "Back to the music")
}

pub fn skipped() -> CreateReply {
    success("⏭️ Skipped!", "Moving on to the next track")
}

/// Create an embed for when looping is toggled
pub fn loop_status(enabled: bool) -> CreateReply {
    if enabled {
        success("🔂 Looping enabled!", "The current track will repeat")
    } else {
        success("➡️ Looping disabled!", "The queue will move on")
    }
}

/// Create an embed for when the bot leaves a voice channel
pub fn left_voice_channel() -> CreateReply {
    success(
        "👋 Left Voice Channel",
        "Successfully disconnected and cleared the queue",
    )
}

/// User-facing text for a failed music command
pub fn error_text(err: &MusicError) -> String {
    match err {
        MusicError::UserNotInVoiceChannel => "You are not in a voice channel!".to_string(),
        MusicError::InvalidUrl(_) => "Invalid url! (Try using +play <keywords>)".to_string(),
        MusicError::InvalidPlaylist(_) => "Invalid playlist sorry :(".to_string(),
        MusicError::NoResultsFound(_) => {
            "Sorry, no results found... :( (Try using +url <url>)".to_string()
        }
        MusicError::NotConnected => "I'm not in a voice channel!".to_string(),
        MusicError::NothingPlaying => "Nothing is playing right now".to_string(),
        MusicError::ConnectionDropped => {
            "I lost the voice connection, play something to bring me back!".to_string()
        }
        MusicError::ResolutionFailure(_) => {
            "Sorry there was an error loading the audio... :(".to_string()
        }
        other => other.to_string(),
    }
}

/// Create an embed for a failed music command
pub fn music_error(err: &MusicError) -> CreateReply {
    failure(error_text(err))
}
