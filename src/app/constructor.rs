use std::collections::HashSet;

use ratatui::widgets::ListState;
use tokio::sync::mpsc;

use super::App;
use crate::app::api::ApiClient;
use crate::app::app::{LoadState, PanelFocus};
use crate::app::cache::new_shared_cache;
use crate::app::config::Config;
use crate::app::playback::{CommandOutput, PlaybackController};
use crate::app::resolver::MediaResolver;
use crate::app::song::LibraryStore;
use crate::app::view::ArtistPager;

/// Pending background results the main loop has not drained yet
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Trait for App construction
pub trait AppConstructor {
    fn new_with_config(config: Config, client: ApiClient, config_warnings: Vec<String>) -> Self
    where
        Self: Sized;
}

impl AppConstructor for App {
    /// Construct a new instance of [`App`] around an authenticated client.
    fn new_with_config(config: Config, client: ApiClient, config_warnings: Vec<String>) -> Self {
        let cache = new_shared_cache(config.cache.max_entries);
        let resolver = MediaResolver::new(client.clone(), cache, config.playback.audio_cache_key);

        let output = CommandOutput::from_config(&config.playback);
        let playback = PlaybackController::new(Box::new(output), config.playback.response_ordering);

        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let show_config_warnings_popup = !config_warnings.is_empty();

        Self {
            running: false,
            store: LibraryStore::new(client),
            pager: ArtistPager::new(config.library.page_size),
            resolver,
            playback,
            load_state: LoadState::NotLoaded,
            panel_focus: PanelFocus::Artists,
            artist_list_state: ListState::default(),
            album_list_state: ListState::default(),
            expanded_albums: HashSet::new(),
            covers_missing: HashSet::new(),
            covers_in_flight: HashSet::new(),
            cover_image: None,
            picker: None,
            status: None,
            config_warnings,
            show_config_warnings_popup,
            events_tx,
            events_rx: Some(events_rx),
            config,
        }
    }
}
