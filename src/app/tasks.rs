use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::app::api::{ApiClient, TranscodeOptions};
use crate::app::cache::MediaHandle;
use crate::app::error::ClientError;
use crate::app::playback::{self, PlayRequest};
use crate::app::resolver::MediaResolver;
use crate::app::song::{LibrarySnapshot, LibraryStore};

/// Results of background network work, delivered to the main loop.
#[derive(Debug)]
pub enum AppEvent {
    LibraryLoaded(Result<LibrarySnapshot, ClientError>),
    CoverResolved {
        song_hash: String,
        result: Result<Option<MediaHandle>, ClientError>,
    },
    AudioResolved {
        request: PlayRequest,
        result: Result<MediaHandle, ClientError>,
    },
}

/// Spawn a background task that fetches the full library
pub fn spawn_library_load(client: &ApiClient, tx: mpsc::Sender<AppEvent>) {
    let client = client.clone();

    tokio::spawn(async move {
        let result = LibraryStore::fetch(&client).await;
        // Receiver gone means the app is shutting down
        let _ = tx.send(AppEvent::LibraryLoaded(result)).await;
    });
}

/// Spawn a background task to resolve one cover
pub fn spawn_cover_loader(
    resolver: &MediaResolver,
    song_hash: String,
    size: u32,
    tx: mpsc::Sender<AppEvent>,
) {
    let resolver = resolver.clone();

    tokio::spawn(async move {
        let result = resolver.resolve_cover(&song_hash, size).await;
        let _ = tx.send(AppEvent::CoverResolved { song_hash, result }).await;
    });
}

/// Spawn a background task to resolve audio for a play request, writing it
/// to `staging_dir` before reporting so the main loop never touches the disk
pub fn spawn_audio_resolution(
    resolver: &MediaResolver,
    request: PlayRequest,
    options: TranscodeOptions,
    staging_dir: Option<PathBuf>,
    tx: mpsc::Sender<AppEvent>,
) {
    let resolver = resolver.clone();

    tokio::spawn(async move {
        let result = resolver.resolve_audio(&request.song_hash, &options).await;
        if let (Ok(handle), Some(dir)) = (&result, &staging_dir) {
            playback::stage_or_warn(dir, handle).await;
        }
        let _ = tx.send(AppEvent::AudioResolved { request, result }).await;
    });
}
