use serde::{Deserialize, Serialize};

use crate::app::api::TranscodeOptions;

/// How audio is keyed in the media cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCacheKey {
    /// One entry per song: the first rendition fetched is reused
    #[default]
    Song,
    /// One entry per song, transcode flag, format and bitrate
    Rendition,
}

/// Which result wins when play requests resolve out of order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOrdering {
    /// The most recently arrived response becomes the source
    #[default]
    LastResponse,
    /// Only the most recent request may become the source
    LatestRequest,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackConfig {
    #[serde(default)]
    pub transcode: bool,
    #[serde(default = "PlaybackConfig::default_format")]
    pub format: String,
    #[serde(default = "PlaybackConfig::default_bitrate")]
    pub bitrate: u32,
    /// Loudness target in LUFS, 0 disables normalisation
    #[serde(default)]
    pub target_lufs: f32,
    #[serde(default)]
    pub audio_cache_key: AudioCacheKey,
    #[serde(default)]
    pub response_ordering: ResponseOrdering,
    /// External player invoked with the audio file as last argument
    #[serde(default = "PlaybackConfig::default_player")]
    pub player: String,
    #[serde(default = "PlaybackConfig::default_player_args")]
    pub player_args: Vec<String>,
}

impl PlaybackConfig {
    fn default_format() -> String {
        "mp3".to_string()
    }

    fn default_bitrate() -> u32 {
        192
    }

    fn default_player() -> String {
        "mpv".to_string()
    }

    fn default_player_args() -> Vec<String> {
        vec!["--no-video".to_string(), "--really-quiet".to_string()]
    }

    pub fn transcode_options(&self) -> TranscodeOptions {
        TranscodeOptions {
            transcode: self.transcode,
            format: self.format.clone(),
            bitrate: self.bitrate,
            target_lufs: self.target_lufs,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            transcode: false,
            format: Self::default_format(),
            bitrate: Self::default_bitrate(),
            target_lufs: 0.0,
            audio_cache_key: AudioCacheKey::default(),
            response_ordering: ResponseOrdering::default(),
            player: Self::default_player(),
            player_args: Self::default_player_args(),
        }
    }
}
