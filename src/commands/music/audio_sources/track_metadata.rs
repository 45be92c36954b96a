//! Defines the `TrackMetadata` struct and its conversion from `yt-dlp` JSON output.

use crate::commands::music::utils::format_duration;
use crate::commands::music::utils::music_manager::{MusicError, MusicResult};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// What the bot knows about a track before it is played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    /// The title of the track, or its URL when the title is unknown.
    pub title: String,
    /// Page URL the audio is fetched from.
    pub url: String,
    /// The duration of the track, if available.
    pub duration: Option<Duration>,
}

/// The subset of a `yt-dlp --dump-json` entry we care about
#[derive(Debug, Deserialize)]
struct YtDlpVideo {
    title: Option<String>,
    webpage_url: Option<String>,
    url: Option<String>,
    id: Option<String>,
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct YtDlpPlaylist {
    #[serde(default)]
    entries: Vec<Option<YtDlpVideo>>,
}

impl TrackMetadata {
    /// Metadata for a URL whose title has not been looked up
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            title: url.clone(),
            url,
            duration: None,
        }
    }

    /// Parse one `yt-dlp -j` object
    pub fn from_ytdlp_json(json: &str) -> MusicResult<Self> {
        let video: YtDlpVideo = serde_json::from_str(json).map_err(|e| {
            MusicError::ResolutionFailure(format!("Failed to parse video metadata: {}", e))
        })?;

        video
            .into_metadata()
            .ok_or_else(|| MusicError::ResolutionFailure("Video has no url".to_string()))
    }

    /// Parse the output of `yt-dlp -J --flat-playlist`, keeping playlist order.
    ///
    /// Unavailable entries (deleted or private videos) are skipped.
    pub fn from_flat_playlist(json: &str) -> MusicResult<Vec<Self>> {
        let playlist: YtDlpPlaylist = serde_json::from_str(json).map_err(|e| {
            MusicError::ResolutionFailure(format!("Failed to parse playlist metadata: {}", e))
        })?;

        Ok(playlist
            .entries
            .into_iter()
            .flatten()
            .filter_map(YtDlpVideo::into_metadata)
            .collect())
    }
}

impl YtDlpVideo {
    fn into_metadata(self) -> Option<TrackMetadata> {
        // Flat playlist entries only carry `url` (sometimes just `id`).
        let url = self
            .webpage_url
            .or(self.url.filter(|url| url.starts_with("http")))
            .or(self
                .id
                .map(|id| format!("https://www.youtube.com/watch?v={}", id)))?;

        Some(TrackMetadata {
            title: self.title.unwrap_or_else(|| url.clone()),
            url,
            duration: self
                .duration
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(Duration::from_secs_f64),
        })
    }
}

impl fmt::Display for TrackMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title == self.url {
            return write!(f, "{}", self.url);
        }

        write!(f, "{}", self.title)?;
        if let Some(duration) = self.duration {
            write!(f, " [{}]", format_duration(duration))?;
        }
        write!(f, " - {}", self.url)
    }
}
