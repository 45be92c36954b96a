//! `AudioResolver` backed by the `yt-dlp` command-line tool.

use crate::HTTP_CLIENT;
use crate::commands::music::utils::music_manager::{MusicError, MusicResult};
use reqwest::Client;
use serenity::async_trait;
use songbird::input::{Compose, Input, YoutubeDl};
use tokio::process::Command;
use tracing::{debug, info};

use super::{AudioResolver, TrackMetadata};

/// Resolves searches, videos and playlists with `yt-dlp` and streams audio through songbird.
#[derive(Clone)]
pub struct YoutubeApi {
    http: Client,
}

impl Default for YoutubeApi {
    fn default() -> Self {
        Self::new(HTTP_CLIENT.clone())
    }
}

impl YoutubeApi {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// Run `yt-dlp` with `args` and return its stdout
    async fn yt_dlp(args: &[&str]) -> MusicResult<String> {
        debug!("Running yt-dlp {:?}", args);

        let output = Command::new("yt-dlp")
            .args(args)
            .output()
            .await
            .map_err(|e| MusicError::ResolutionFailure(format!("Failed to execute yt-dlp: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MusicError::ResolutionFailure(format!(
                "yt-dlp exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl AudioResolver for YoutubeApi {
    type Stream = Input;

    async fn resolve_search(&self, keywords: &str) -> MusicResult<Option<TrackMetadata>> {
        info!("Searching YouTube for: {}", keywords);
        let query = format!("ytsearch1:{}", keywords);
        let stdout = Self::yt_dlp(&["-j", "--no-playlist", &query]).await?;

        // An empty search prints nothing at all.
        match stdout.lines().find(|line| !line.trim().is_empty()) {
            Some(line) => TrackMetadata::from_ytdlp_json(line).map(Some),
            None => Ok(None),
        }
    }

    async fn resolve_url(&self, url: &str) -> MusicResult<TrackMetadata> {
        // The title is looked up when the track is materialized.
        Ok(TrackMetadata::from_url(url))
    }

    async fn resolve_playlist(&self, url: &str) -> MusicResult<Vec<TrackMetadata>> {
        info!("Fetching YouTube playlist: {}", url);
        let stdout = Self::yt_dlp(&["-J", "--flat-playlist", url])
            .await
            .map_err(|e| MusicError::InvalidPlaylist(e.to_string()))?;

        TrackMetadata::from_flat_playlist(&stdout)
    }

    async fn materialize(&self, track: &TrackMetadata) -> MusicResult<Input> {
        info!("Creating YouTube audio source for URL: {}", track.url);
        let mut source = YoutubeDl::new(self.http.clone(), track.url.clone());

        // Probe up front so unavailable videos fail here instead of inside the driver.
        let aux = source
            .aux_metadata()
            .await
            .map_err(|e| MusicError::ResolutionFailure(e.to_string()))?;
        debug!(
            "Resolved '{}' ({:?})",
            aux.title.as_deref().unwrap_or(&track.url),
            aux.duration
        );

        Ok(source.into())
    }
}
