use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::app::api::TranscodeOptions;
use crate::app::cache::MediaHandle;
use crate::app::config::playback::{PlaybackConfig, ResponseOrdering};
use crate::app::error::ClientError;
use crate::app::resolver::MediaResolver;

/// Something that can play one resolved audio handle at a time.
pub trait AudioOutput: Send {
    /// Stop the current source, then start `handle`.
    fn play(&mut self, song_hash: &str, handle: &MediaHandle) -> color_eyre::Result<()>;
    fn stop(&mut self);
    /// Whether a source is still playing.
    fn is_playing(&mut self) -> bool;
    /// Directory resolved audio can be written to ahead of [`play`](Self::play).
    fn staging_dir(&self) -> Option<&Path> {
        None
    }
}

/// Scratch file a handle is written to before a player opens it.
pub fn staged_path(dir: &Path, handle: &MediaHandle) -> PathBuf {
    let extension = extension_for(handle.content_type.as_deref());
    dir.join(format!("{}{}.{}", STAGED_PREFIX, handle.id, extension))
}

/// Write a handle to its scratch file without blocking the caller's thread.
/// A handle staged earlier (a cache hit) is not written again.
pub async fn stage_audio(dir: &Path, handle: &MediaHandle) -> std::io::Result<PathBuf> {
    let path = staged_path(dir, handle);
    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Ok(path);
    }
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&path, &handle.data).await?;
    log::debug!("Staged {} bytes at {}", handle.len(), path.display());
    Ok(path)
}

const STAGED_PREFIX: &str = "audio-";

/// Plays audio by handing a scratch file to an external player process.
#[derive(Debug)]
pub struct CommandOutput {
    program: String,
    args: Vec<String>,
    scratch_dir: PathBuf,
    child: Option<Child>,
    current_file: Option<PathBuf>,
}

impl CommandOutput {
    pub fn new(program: impl Into<String>, args: Vec<String>, scratch_dir: PathBuf) -> Self {
        Self {
            program: program.into(),
            args,
            scratch_dir,
            child: None,
            current_file: None,
        }
    }

    /// Player from the `[playback]` section, writing into the user cache dir
    pub fn from_config(config: &PlaybackConfig) -> Self {
        let scratch_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("mulise");
        Self::new(config.player.clone(), config.player_args.clone(), scratch_dir)
    }

    fn kill_player(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                log::debug!("Player already exited: {}", e);
            }
            let _ = child.wait();
        }
    }

    fn remove_current_file(&mut self) {
        if let Some(path) = self.current_file.take()
            && let Err(e) = fs::remove_file(&path)
        {
            log::debug!("Could not remove {}: {}", path.display(), e);
        }
    }

    /// Remove staged files left by superseded requests
    fn remove_staged_files(&self) {
        let Ok(entries) = fs::read_dir(&self.scratch_dir) else {
            return;
        };
        for entry in entries.flatten() {
            if entry.file_name().to_string_lossy().starts_with(STAGED_PREFIX) {
                let _ = fs::remove_file(entry.path());
            }
        }
    }
}

/// File extension for an audio content type, so players can detect the format.
fn extension_for(content_type: Option<&str>) -> &'static str {
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .unwrap_or_default();
    match mime {
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/flac" | "audio/x-flac" => "flac",
        "audio/aac" => "aac",
        "audio/mp4" | "audio/x-m4a" | "audio/m4a" => "m4a",
        "audio/ogg" | "audio/vorbis" => "ogg",
        "audio/opus" => "opus",
        "audio/wav" | "audio/x-wav" => "wav",
        _ => "bin",
    }
}

impl AudioOutput for CommandOutput {
    fn play(&mut self, song_hash: &str, handle: &MediaHandle) -> color_eyre::Result<()> {
        self.kill_player();

        let path = staged_path(&self.scratch_dir, handle);
        if self.current_file.as_ref() != Some(&path) {
            self.remove_current_file();
        }
        if !path.exists() {
            log::debug!("Audio for {} was not staged, writing it now", song_hash);
            fs::create_dir_all(&self.scratch_dir)?;
            fs::write(&path, &handle.data)?;
        }
        self.current_file = Some(path.clone());

        let child = spawn_player(&self.program, &self.args, &path)?;
        log::info!(
            "Started {} for {} (pid {})",
            self.program,
            song_hash,
            child.id()
        );
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        self.kill_player();
        self.remove_current_file();
    }

    fn staging_dir(&self) -> Option<&Path> {
        Some(&self.scratch_dir)
    }

    fn is_playing(&mut self) -> bool {
        match self.child.as_mut().map(Child::try_wait) {
            Some(Ok(None)) => true,
            Some(Ok(Some(_))) | Some(Err(_)) => {
                self.child = None;
                false
            }
            None => false,
        }
    }
}

impl Drop for CommandOutput {
    fn drop(&mut self) {
        self.stop();
        self.remove_staged_files();
    }
}

fn spawn_player(program: &str, args: &[String], path: &Path) -> color_eyre::Result<Child> {
    Command::new(program)
        .args(args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to start player '{}': {}", program, e))
}

/// Stage a handle; on failure the output writes it itself when playing.
pub async fn stage_or_warn(dir: &Path, handle: &MediaHandle) {
    if let Err(e) = stage_audio(dir, handle).await {
        log::warn!("Could not stage audio in {}: {}", dir.display(), e);
    }
}

/// Ticket for one `play` request, matched against later arrivals.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRequest {
    pub id: u64,
    pub song_hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayOutcome {
    Started { song_hash: String },
    /// A newer request was issued before this one resolved
    Superseded { song_hash: String },
    Failed { song_hash: String, message: String },
}

#[derive(Debug, Clone)]
pub struct NowPlaying {
    pub song_hash: String,
    pub content_type: Option<String>,
}

/// Owns the single playback source.
///
/// Resolution is split into [`begin`](Self::begin) and
/// [`complete`](Self::complete) so the main loop can resolve in a background
/// task; [`play`](Self::play) does both inline.
pub struct PlaybackController {
    output: Box<dyn AudioOutput>,
    ordering: ResponseOrdering,
    now_playing: Option<NowPlaying>,
    in_flight: usize,
    next_request_id: u64,
    latest_request_id: u64,
}

impl PlaybackController {
    pub fn new(output: Box<dyn AudioOutput>, ordering: ResponseOrdering) -> Self {
        Self {
            output,
            ordering,
            now_playing: None,
            in_flight: 0,
            next_request_id: 0,
            latest_request_id: 0,
        }
    }

    /// Register a play request; the controller is busy until it completes.
    pub fn begin(&mut self, song_hash: &str) -> PlayRequest {
        self.next_request_id += 1;
        self.latest_request_id = self.next_request_id;
        self.in_flight += 1;
        log::debug!("Play request #{} for {}", self.next_request_id, song_hash);
        PlayRequest {
            id: self.next_request_id,
            song_hash: song_hash.to_string(),
        }
    }

    /// Apply the resolution result of a request.
    ///
    /// Failures leave the current source untouched. Under
    /// [`ResponseOrdering::LastResponse`] whichever result arrives last
    /// becomes the source; under [`ResponseOrdering::LatestRequest`] results
    /// of superseded requests are dropped.
    pub fn complete(
        &mut self,
        request: PlayRequest,
        result: Result<MediaHandle, ClientError>,
    ) -> PlayOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        let PlayRequest { id, song_hash } = request;

        let handle = match result {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("Playback of {} failed: {}", song_hash, e);
                return PlayOutcome::Failed {
                    song_hash,
                    message: e.to_string(),
                };
            }
        };

        if self.ordering == ResponseOrdering::LatestRequest && id != self.latest_request_id {
            log::debug!("Discarding superseded play request #{} for {}", id, song_hash);
            return PlayOutcome::Superseded { song_hash };
        }

        if let Err(e) = self.output.play(&song_hash, &handle) {
            log::error!("Audio output failed for {}: {}", song_hash, e);
            self.now_playing = None;
            return PlayOutcome::Failed {
                song_hash,
                message: e.to_string(),
            };
        }

        self.now_playing = Some(NowPlaying {
            song_hash: song_hash.clone(),
            content_type: handle.content_type,
        });
        PlayOutcome::Started { song_hash }
    }

    /// Resolve and play a song in one step.
    pub async fn play(
        &mut self,
        resolver: &MediaResolver,
        song_hash: &str,
        options: &TranscodeOptions,
    ) -> PlayOutcome {
        let request = self.begin(song_hash);
        let result = resolver.resolve_audio(song_hash, options).await;
        if let (Ok(handle), Some(dir)) = (&result, self.staging_dir()) {
            stage_or_warn(&dir, handle).await;
        }
        self.complete(request, result)
    }

    /// Where the output wants audio staged, if anywhere
    pub fn staging_dir(&self) -> Option<PathBuf> {
        self.output.staging_dir().map(Path::to_path_buf)
    }

    pub fn stop(&mut self) {
        if let Some(now) = self.now_playing.take() {
            log::info!("Stopped {}", now.song_hash);
        }
        self.output.stop();
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// Current source; cleared once the output reports it finished.
    pub fn now_playing(&mut self) -> Option<&NowPlaying> {
        if self.now_playing.is_some() && !self.output.is_playing() {
            self.now_playing = None;
        }
        self.now_playing.as_ref()
    }
}
