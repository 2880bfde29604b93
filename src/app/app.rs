use std::collections::HashSet;
use std::time::{Duration, Instant};

use ratatui::widgets::ListState;
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;
use tokio::sync::mpsc;

use crate::app::config::Config;
use crate::app::playback::PlaybackController;
use crate::app::resolver::MediaResolver;
use crate::app::song::LibraryStore;
use crate::app::tasks::AppEvent;
use crate::app::view::ArtistPager;

/// How long a status message stays in the status line
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    Artists,
    Albums,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub kind: MessageType,
    pub created: Instant,
}

impl StatusMessage {
    pub fn is_expired(&self) -> bool {
        self.created.elapsed() > STATUS_MESSAGE_TTL
    }
}

/// Cover image currently decoded for display.
pub struct CoverImage {
    pub song_hash: String,
    pub protocol: Option<StatefulProtocol>,
}

/// All state of one client session.
pub struct App {
    pub running: bool,
    pub config: Config,
    pub store: LibraryStore,
    pub pager: ArtistPager,
    pub resolver: MediaResolver,
    pub playback: PlaybackController,
    pub load_state: LoadState,
    pub panel_focus: PanelFocus,
    /// Selection within the current page of artists
    pub artist_list_state: ListState,
    /// Selection within the albums/tracks display list
    pub album_list_state: ListState,
    /// Hashes of albums whose tracks are shown
    pub expanded_albums: HashSet<String>,
    /// Song hashes the server has no cover for
    pub covers_missing: HashSet<String>,
    pub covers_in_flight: HashSet<String>,
    pub cover_image: Option<CoverImage>,
    pub picker: Option<Picker>,
    pub status: Option<StatusMessage>,
    pub config_warnings: Vec<String>,
    pub show_config_warnings_popup: bool,
    pub events_tx: mpsc::Sender<AppEvent>,
    pub events_rx: Option<mpsc::Receiver<AppEvent>>,
}

impl App {
    pub fn set_status(&mut self, text: impl Into<String>, kind: MessageType) {
        let text = text.into();
        match kind {
            MessageType::Info => log::info!("{}", text),
            MessageType::Error => log::warn!("{}", text),
        }
        self.status = Some(StatusMessage {
            text,
            kind,
            created: Instant::now(),
        });
    }

    /// Current status message, dropping it once expired
    pub fn current_status(&mut self) -> Option<&StatusMessage> {
        if self.status.as_ref().is_some_and(StatusMessage::is_expired) {
            self.status = None;
        }
        self.status.as_ref()
    }

    /// Whether any user-visible network activity is pending
    pub fn is_busy(&self) -> bool {
        self.load_state == LoadState::Loading || self.playback.is_busy()
    }
}
