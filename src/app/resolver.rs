use crate::app::api::client::MAX_COVER_SIZE;
use crate::app::api::{ApiClient, TranscodeOptions};
use crate::app::cache::{CacheKey, MediaHandle, SharedResourceCache};
use crate::app::config::playback::AudioCacheKey;
use crate::app::error::ClientError;

/// Turns cover and audio requests into media handles, cache first.
///
/// Two concurrent resolutions of the same key are not merged: both go to
/// the network and the later one overwrites the cache entry.
#[derive(Debug, Clone)]
pub struct MediaResolver {
    client: ApiClient,
    cache: SharedResourceCache,
    audio_key: AudioCacheKey,
}

impl MediaResolver {
    pub fn new(client: ApiClient, cache: SharedResourceCache, audio_key: AudioCacheKey) -> Self {
        Self {
            client,
            cache,
            audio_key,
        }
    }

    pub fn cache(&self) -> &SharedResourceCache {
        &self.cache
    }

    /// Resolve a cover. `Ok(None)` means the server has no cover for the
    /// song; callers render without one.
    pub async fn resolve_cover(
        &self,
        song_hash: &str,
        size: u32,
    ) -> Result<Option<MediaHandle>, ClientError> {
        // Sizes past the server's bounds fetch the same rendition
        let size = size.clamp(1, MAX_COVER_SIZE);
        let key = CacheKey::cover(song_hash, size);
        if let Some(handle) = self.cache.write().await.get(&key) {
            log::debug!("Cover cache hit: {}", song_hash);
            return Ok(Some(handle));
        }

        let payload = match self.client.cover_art(song_hash, size).await {
            Ok(payload) => payload,
            Err(ClientError::Resolution { status, .. }) => {
                log::debug!("No cover for {} (HTTP {})", song_hash, status);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let handle = MediaHandle::from(payload);
        if handle.is_empty() {
            log::debug!("Empty cover body for {}", song_hash);
            return Ok(None);
        }
        self.cache.write().await.put(key, handle.clone());
        log::debug!("Cover resolved for {} ({} bytes)", song_hash, handle.len());
        Ok(Some(handle))
    }

    /// Resolve playable audio for a song.
    ///
    /// With [`AudioCacheKey::Song`] the first rendition fetched for a song is
    /// reused for every later request, whatever transcode options they carry.
    pub async fn resolve_audio(
        &self,
        song_hash: &str,
        options: &TranscodeOptions,
    ) -> Result<MediaHandle, ClientError> {
        let key = match self.audio_key {
            AudioCacheKey::Song => CacheKey::audio(song_hash),
            AudioCacheKey::Rendition => CacheKey::audio_rendition(song_hash, options),
        };
        if let Some(handle) = self.cache.write().await.get(&key) {
            log::debug!("Audio cache hit: {}", song_hash);
            return Ok(handle);
        }

        let payload = self
            .client
            .song_file(song_hash, options)
            .await
            .inspect_err(|e| log::warn!("Audio resolution failed for {}: {}", song_hash, e))?;

        let handle = MediaHandle::from(payload);
        self.cache.write().await.put(key, handle.clone());
        log::info!(
            "Audio resolved for {} ({} KiB, {})",
            song_hash,
            handle.len() / 1024,
            handle.content_type.as_deref().unwrap_or("unknown type")
        );
        Ok(handle)
    }
}
