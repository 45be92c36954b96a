//! Turning user input (search keywords, video URLs, playlist URLs) into track
//! metadata, and track metadata into playable streams.

/// Submodule defining the `TrackMetadata` struct used across audio sources.
pub mod track_metadata;
/// Submodule implementing `AudioResolver` on top of `yt-dlp`.
#[cfg(feature = "music")]
pub mod youtube;

use crate::commands::music::utils::music_manager::{MusicError, MusicResult};
use regex::Regex;
use serenity::async_trait;
use std::sync::LazyLock;
use track_metadata::TrackMetadata;
use url::Url;

/// Hosts accepted by the URL and playlist paths
const ACCEPTED_PREFIXES: [&str; 2] = ["https://www.youtube.com/", "https://youtu.be/"];

/// Matches the playlist id query parameter of a YouTube URL
static PLAYLIST_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]list=([\w-]+)").unwrap());

/// Resolves user input into tracks and tracks into playable streams.
#[async_trait]
pub trait AudioResolver: Send + Sync + 'static {
    /// The locally playable stream produced by [`AudioResolver::materialize`]
    type Stream: Send + 'static;

    /// Returns the first match for `keywords`, or `None` if the search came back empty.
    async fn resolve_search(&self, keywords: &str) -> MusicResult<Option<TrackMetadata>>;

    /// Resolve an already validated video URL
    async fn resolve_url(&self, url: &str) -> MusicResult<TrackMetadata>;

    /// Resolve an already validated playlist URL into its entries, in playlist order
    async fn resolve_playlist(&self, url: &str) -> MusicResult<Vec<TrackMetadata>>;

    /// Fetch the audio for `track`. Called lazily, right before playback.
    async fn materialize(&self, track: &TrackMetadata) -> MusicResult<Self::Stream>;
}

/// Whether the input should be treated as a URL rather than search keywords
pub fn looks_like_url(input: &str) -> bool {
    input.trim_start().starts_with("https://")
}

/// Check that `input` is a YouTube video URL and return it trimmed.
///
/// Whitespace inside the URL is rejected rather than stripped.
pub fn validate_track_url(input: &str) -> MusicResult<String> {
    let url = input.trim().to_string();

    let accepted = ACCEPTED_PREFIXES
        .iter()
        .any(|prefix| url.starts_with(prefix));
    if !accepted || url.contains(char::is_whitespace) || Url::parse(&url).is_err() {
        return Err(MusicError::InvalidUrl(url));
    }

    Ok(url)
}

/// Check that `input` is a YouTube URL carrying a playlist id.
pub fn validate_playlist_url(input: &str) -> MusicResult<String> {
    let url =
        validate_track_url(input).map_err(|_| MusicError::InvalidPlaylist(input.trim().to_string()))?;

    if !PLAYLIST_REGEX.is_match(&url) {
        return Err(MusicError::InvalidPlaylist(url));
    }

    Ok(url)
}
