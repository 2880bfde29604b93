use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;

use super::App;
use crate::app::app::{CoverImage, LoadState, MessageType, PanelFocus};
use crate::app::cache::MediaHandle;
use crate::app::playback::PlayOutcome;
use crate::app::song::{Artist, LibrarySnapshot};
use crate::app::tasks::{self, AppEvent};

/// One row of the albums panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayItem {
    Album { hash: String },
    Song { hash: String, album_hash: String },
}

impl DisplayItem {
    pub fn album_hash(&self) -> &str {
        match self {
            DisplayItem::Album { hash } => hash,
            DisplayItem::Song { album_hash, .. } => album_hash,
        }
    }
}

/// Albums of an artist, each followed by its tracks when expanded
pub fn compute_display_list(
    snapshot: &LibrarySnapshot,
    artist: &Artist,
    expanded: &HashSet<String>,
) -> Vec<DisplayItem> {
    let mut items = Vec::new();
    for album in snapshot.albums_of(artist) {
        items.push(DisplayItem::Album {
            hash: album.hash.clone(),
        });
        if expanded.contains(&album.hash) {
            items.extend(
                snapshot
                    .tracks_of(album)
                    .into_iter()
                    .map(|song| DisplayItem::Song {
                        hash: song.hash.clone(),
                        album_hash: album.hash.clone(),
                    }),
            );
        }
    }
    items
}

/// Step a list selection by one row, wrapping at both ends
fn wrap_step(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = current.unwrap_or(0).min(len - 1);
    Some(match (forward, current) {
        (true, c) if c + 1 >= len => 0,
        (true, c) => c + 1,
        (false, 0) => len - 1,
        (false, c) => c - 1,
    })
}

impl App {
    /// Current snapshot, cloned out so callers can mutate `self` freely
    pub fn snapshot(&self) -> Option<Arc<LibrarySnapshot>> {
        self.store.snapshot().cloned()
    }

    /// Index into the snapshot's artists of the selected row
    pub fn selected_artist_index(&self) -> Option<usize> {
        let row = self.artist_list_state.selected()?;
        self.pager.visible_slice().get(row).copied()
    }

    pub fn display_list(&self) -> Vec<DisplayItem> {
        let Some(snapshot) = self.store.snapshot() else {
            return Vec::new();
        };
        let Some(artist) = self
            .selected_artist_index()
            .and_then(|i| snapshot.artists().get(i))
        else {
            return Vec::new();
        };
        compute_display_list(snapshot, artist, &self.expanded_albums)
    }

    pub fn selected_display_item(&self) -> Option<DisplayItem> {
        let row = self.album_list_state.selected()?;
        self.display_list().into_iter().nth(row)
    }

    pub fn navigate_up(&mut self) {
        self.step_selection(false);
    }

    pub fn navigate_down(&mut self) {
        self.step_selection(true);
    }

    fn step_selection(&mut self, forward: bool) {
        match self.panel_focus {
            PanelFocus::Artists => {
                let len = self.pager.visible_slice().len();
                let next = wrap_step(self.artist_list_state.selected(), len, forward);
                if next != self.artist_list_state.selected() {
                    self.artist_list_state.select(next);
                    self.on_artist_changed();
                }
            }
            PanelFocus::Albums => {
                let len = self.display_list().len();
                let next = wrap_step(self.album_list_state.selected(), len, forward);
                self.album_list_state.select(next);
                self.refresh_cover_image();
            }
        }
    }

    pub fn toggle_panel(&mut self) {
        self.panel_focus = match self.panel_focus {
            PanelFocus::Artists if !self.display_list().is_empty() => {
                if self.album_list_state.selected().is_none() {
                    self.album_list_state.select(Some(0));
                }
                PanelFocus::Albums
            }
            PanelFocus::Artists => PanelFocus::Artists,
            PanelFocus::Albums => PanelFocus::Artists,
        };
    }

    pub fn next_page(&mut self) {
        if self.pager.next_page() {
            self.reset_artist_selection();
        }
    }

    pub fn prev_page(&mut self) {
        if self.pager.prev_page() {
            self.reset_artist_selection();
        }
    }

    /// Apply (or clear with `None`) the first-letter filter
    pub fn set_letter_filter(&mut self, letter: Option<char>) {
        let Some(snapshot) = self.snapshot() else {
            return;
        };
        self.pager.set_filter(&snapshot, letter);
        self.reset_artist_selection();

        if let Some(letter) = self.pager.filter()
            && self.pager.filtered_len() == 0
        {
            self.set_status(format!("No artists starting with {}", letter), MessageType::Info);
        }
    }

    /// Select the first artist of the current page and reset the albums panel
    fn reset_artist_selection(&mut self) {
        let first = (!self.pager.visible_slice().is_empty()).then_some(0);
        self.artist_list_state.select(first);
        self.panel_focus = PanelFocus::Artists;
        self.on_artist_changed();
    }

    fn on_artist_changed(&mut self) {
        self.expanded_albums.clear();
        let first = (!self.display_list().is_empty()).then_some(0);
        self.album_list_state.select(first);
        self.request_covers();
        self.refresh_cover_image();
    }

    /// Enter: expand/collapse an album or play a track
    pub fn activate_selection(&mut self) {
        if self.panel_focus == PanelFocus::Artists {
            self.toggle_panel();
            return;
        }

        match self.selected_display_item() {
            Some(DisplayItem::Album { hash }) => {
                if !self.expanded_albums.remove(&hash) {
                    self.expanded_albums.insert(hash);
                }
            }
            Some(DisplayItem::Song { hash, .. }) => self.play_song(&hash),
            None => {}
        }
    }

    pub fn play_song(&mut self, song_hash: &str) {
        let request = self.playback.begin(song_hash);
        tasks::spawn_audio_resolution(
            &self.resolver,
            request,
            self.config.playback.transcode_options(),
            self.playback.staging_dir(),
            self.events_tx.clone(),
        );
        let title = self.song_title(song_hash);
        self.set_status(format!("Loading {}", title), MessageType::Info);
    }

    pub fn stop_playback(&mut self) {
        self.playback.stop();
    }

    /// Fetch the library again; ignored while a load is running
    pub fn reload_library(&mut self) {
        if self.load_state == LoadState::Loading {
            return;
        }
        self.load_state = LoadState::Loading;
        tasks::spawn_library_load(self.store.client(), self.events_tx.clone());
    }

    /// Prefetch covers for every album of the selected artist
    pub fn request_covers(&mut self) {
        let Some(snapshot) = self.snapshot() else {
            return;
        };
        let Some(artist) = self
            .selected_artist_index()
            .and_then(|i| snapshot.artists().get(i))
        else {
            return;
        };

        let size = self.config.library.cover_size;
        for album in snapshot.albums_of(artist) {
            let Some(song_hash) = snapshot.cover_hash_for(album) else {
                continue;
            };
            self.request_cover(song_hash, size);
        }
    }

    /// Resolve one cover in the background. Covers already fetched come
    /// back from the resource cache without a network call.
    fn request_cover(&mut self, song_hash: &str, size: u32) {
        if self.covers_missing.contains(song_hash) || self.covers_in_flight.contains(song_hash) {
            return;
        }
        self.covers_in_flight.insert(song_hash.to_string());
        tasks::spawn_cover_loader(
            &self.resolver,
            song_hash.to_string(),
            size,
            self.events_tx.clone(),
        );
    }

    /// Song hash whose cover belongs in the cover panel: the album under
    /// the albums selection, else the artist's first album
    pub fn focused_cover_hash(&self) -> Option<String> {
        let snapshot = self.store.snapshot()?;
        let album = match self.selected_display_item() {
            Some(item) => snapshot.album_by_hash(item.album_hash())?,
            None => {
                let artist = snapshot.artists().get(self.selected_artist_index()?)?;
                snapshot.albums_of(artist).next()?
            }
        };
        snapshot.cover_hash_for(album).map(str::to_string)
    }

    /// Follow the focused album: drop the displayed cover when focus moved
    /// and ask the resolver for the new one
    pub fn refresh_cover_image(&mut self) {
        let Some(target) = self.focused_cover_hash() else {
            self.cover_image = None;
            return;
        };
        if self
            .cover_image
            .as_ref()
            .is_some_and(|cover| cover.song_hash == target)
        {
            return;
        }

        self.cover_image = None;
        let size = self.config.library.cover_size;
        self.request_cover(&target, size);
    }

    /// Decode a resolved cover into the cover panel. Only the decoded image
    /// is kept; the payload stays in the resource cache.
    fn show_cover(&mut self, target: String, handle: &MediaHandle) {
        let protocol = self.picker.as_mut().and_then(|picker| {
            image::ImageReader::new(Cursor::new(&handle.data[..]))
                .with_guessed_format()
                .ok()
                .and_then(|reader| reader.decode().ok())
                .map(|img| picker.new_resize_protocol(img))
        });
        if protocol.is_none() && self.picker.is_some() {
            log::debug!("Could not decode cover for {}", target);
        }

        self.cover_image = Some(CoverImage {
            song_hash: target,
            protocol,
        });
    }

    fn song_title(&self, song_hash: &str) -> String {
        self.store
            .song_by_hash(song_hash)
            .map(|song| song.title.clone())
            .unwrap_or_else(|| song_hash.to_string())
    }

    /// Apply one result delivered by a background task
    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::LibraryLoaded(Ok(snapshot)) => {
                let snapshot = self.store.install(snapshot);
                self.pager.rebuild(&snapshot);
                self.covers_missing.clear();
                self.load_state = LoadState::Loaded;
                if snapshot.is_empty() {
                    self.set_status("The server library is empty", MessageType::Info);
                } else {
                    self.set_status(
                        format!(
                            "Loaded {} artists, {} albums, {} songs",
                            snapshot.artists().len(),
                            snapshot.albums().len(),
                            snapshot.songs().len()
                        ),
                        MessageType::Info,
                    );
                }
                self.reset_artist_selection();
            }
            AppEvent::LibraryLoaded(Err(e)) => {
                let message = if e.is_auth() {
                    "Access token rejected by server".to_string()
                } else {
                    format!("Failed to load library: {}", e)
                };
                // A previous snapshot stays usable
                self.load_state = if self.store.is_loaded() {
                    LoadState::Loaded
                } else {
                    LoadState::Failed(message.clone())
                };
                self.set_status(message, MessageType::Error);
            }
            AppEvent::CoverResolved { song_hash, result } => {
                self.covers_in_flight.remove(&song_hash);
                match result {
                    Ok(Some(handle)) => {
                        if self.focused_cover_hash().as_deref() == Some(song_hash.as_str()) {
                            self.show_cover(song_hash, &handle);
                        }
                    }
                    Ok(None) => {
                        self.covers_missing.insert(song_hash);
                    }
                    Err(e) if e.is_auth() => {
                        self.set_status("Access token rejected by server", MessageType::Error);
                    }
                    Err(e) => log::debug!("Cover for {} unavailable: {}", song_hash, e),
                }
            }
            AppEvent::AudioResolved { request, result } => {
                match self.playback.complete(request, result) {
                    PlayOutcome::Started { song_hash } => {
                        let title = self.song_title(&song_hash);
                        self.set_status(format!("Playing {}", title), MessageType::Info);
                    }
                    PlayOutcome::Superseded { .. } => {}
                    PlayOutcome::Failed { song_hash, message } => {
                        let title = self.song_title(&song_hash);
                        self.set_status(
                            format!("Could not play {}: {}", title, message),
                            MessageType::Error,
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::api::ApiClient;
    use crate::app::api::transport::TransportResponse;
    use crate::app::api::transport::mock::MockTransport;
    use crate::app::cache::CacheKey;
    use crate::app::config::Config;
    use crate::app::constructor::AppConstructor;
    use crate::app::error::ClientError;
    use crate::app::song::LibraryResponse;
    use serde_json::json;

    fn sample_snapshot() -> LibrarySnapshot {
        let response: LibraryResponse = serde_json::from_value(json!({
            "songs": [
                {"hash": "s1", "title": "One", "track_number": 1},
                {"hash": "s2", "title": "Two", "track_number": 2},
                {"hash": "s3", "title": "Three", "track_number": 1}
            ],
            "albums": [
                {"hash": "al1", "name": "Arrival", "songs": ["s2", "s1"]},
                {"hash": "al2", "name": "Voulez-Vous", "songs": ["s3"]}
            ],
            "artists": [
                {"hash": "ar2", "name": "Zoe", "albums": []},
                {"hash": "ar1", "name": "Abba", "albums": ["al1", "al2", "missing"]},
                {"hash": "ar3", "name": "blur", "albums": []}
            ]
        }))
        .unwrap();
        LibrarySnapshot::from_response(response)
    }

    fn test_app(transport: Arc<MockTransport>, page_size: usize) -> App {
        let mut config = Config::default();
        config.library.page_size = page_size;
        App::new_with_config(config, ApiClient::new(transport, "token"), Vec::new())
    }

    fn cover_transport() -> Arc<MockTransport> {
        MockTransport::new(|_, _, _| Ok(TransportResponse::bytes(vec![0u8; 4], "image/png")))
    }

    #[test]
    fn test_display_list_expands_tracks_in_track_order() {
        let snapshot = sample_snapshot();
        let artist = &snapshot.artists()[0];
        let expanded: HashSet<String> = ["al1".to_string()].into_iter().collect();

        let items = compute_display_list(&snapshot, artist, &expanded);

        let rows: Vec<&str> = items
            .iter()
            .map(|item| match item {
                DisplayItem::Album { hash } => hash.as_str(),
                DisplayItem::Song { hash, .. } => hash.as_str(),
            })
            .collect();
        assert_eq!(rows, vec!["al1", "s1", "s2", "al2"]);
    }

    #[test]
    fn test_wrap_step() {
        assert_eq!(wrap_step(None, 0, true), None);
        assert_eq!(wrap_step(Some(2), 3, true), Some(0));
        assert_eq!(wrap_step(Some(0), 3, false), Some(2));
        assert_eq!(wrap_step(Some(1), 3, true), Some(2));
    }

    #[tokio::test]
    async fn test_library_loaded_selects_first_artist_and_prefetches_covers() {
        let transport = cover_transport();
        let mut app = test_app(transport.clone(), 10);
        let mut rx = app.events_rx.take().unwrap();

        app.handle_app_event(AppEvent::LibraryLoaded(Ok(sample_snapshot())));

        assert_eq!(app.load_state, LoadState::Loaded);
        assert_eq!(app.artist_list_state.selected(), Some(0));
        assert_eq!(app.album_list_state.selected(), Some(0));
        assert_eq!(app.covers_in_flight.len(), 2);

        for _ in 0..2 {
            let event = rx.recv().await.unwrap();
            app.handle_app_event(event);
        }

        assert!(app.covers_in_flight.is_empty());
        assert_eq!(transport.calls_to("get_cover_art"), 2);
        // First track of "Arrival" in album order carries its cover
        assert_eq!(
            app.cover_image.as_ref().map(|c| c.song_hash.as_str()),
            Some("s2")
        );
    }

    #[tokio::test]
    async fn test_known_covers_are_not_requested_again() {
        let transport = cover_transport();
        let mut app = test_app(transport.clone(), 10);
        let mut rx = app.events_rx.take().unwrap();

        app.handle_app_event(AppEvent::LibraryLoaded(Ok(sample_snapshot())));
        for _ in 0..2 {
            let event = rx.recv().await.unwrap();
            app.handle_app_event(event);
        }
        app.navigate_down();
        app.navigate_up();
        // Revisiting the artist resolves both covers again, from the cache
        for _ in 0..2 {
            let event = rx.recv().await.unwrap();
            app.handle_app_event(event);
        }

        assert!(app.covers_in_flight.is_empty());
        assert_eq!(transport.calls_to("get_cover_art"), 2);
        assert_eq!(
            app.cover_image.as_ref().map(|c| c.song_hash.as_str()),
            Some("s2")
        );
    }

    #[tokio::test]
    async fn test_bounded_cache_limits_retained_covers() {
        let transport = cover_transport();
        let mut config = Config::default();
        config.cache.max_entries = 1;
        let mut app = App::new_with_config(config, ApiClient::new(transport, "token"), Vec::new());
        let mut rx = app.events_rx.take().unwrap();

        app.handle_app_event(AppEvent::LibraryLoaded(Ok(sample_snapshot())));
        for _ in 0..2 {
            let event = rx.recv().await.unwrap();
            app.handle_app_event(event);
        }

        let size = app.config.library.cover_size;
        let mut cache = app.resolver.cache().write().await;
        assert_eq!(cache.len(), 1);
        let kept = ["s2", "s3"]
            .into_iter()
            .find_map(|hash| cache.get(&CacheKey::cover(hash, size)))
            .unwrap();
        // Only the cache and this lookup hold the payload
        assert_eq!(Arc::strong_count(&kept.data), 2);
    }

    #[tokio::test]
    async fn test_missing_cover_is_not_requested_again() {
        let transport = MockTransport::new(|_, _, _| Ok(TransportResponse::status(404)));
        let mut app = test_app(transport.clone(), 10);
        let mut rx = app.events_rx.take().unwrap();

        app.handle_app_event(AppEvent::LibraryLoaded(Ok(sample_snapshot())));
        for _ in 0..2 {
            let event = rx.recv().await.unwrap();
            app.handle_app_event(event);
        }
        app.navigate_down();
        app.navigate_up();

        assert!(app.covers_in_flight.is_empty());
        assert_eq!(app.covers_missing.len(), 2);
        assert!(app.cover_image.is_none());
        assert_eq!(transport.calls_to("get_cover_art"), 2);
    }

    #[tokio::test]
    async fn test_page_change_resets_selection() {
        let mut app = test_app(cover_transport(), 2);
        app.handle_app_event(AppEvent::LibraryLoaded(Ok(sample_snapshot())));
        app.navigate_down();
        assert_eq!(app.artist_list_state.selected(), Some(1));

        app.next_page();

        assert_eq!(app.pager.current_page(), 2);
        assert_eq!(app.artist_list_state.selected(), Some(0));
        assert_eq!(app.selected_artist_index(), Some(2));
        assert_eq!(app.snapshot().unwrap().artists()[2].name, "Zoe");

        // Already on the last page
        app.next_page();
        assert_eq!(app.pager.current_page(), 2);
    }

    #[tokio::test]
    async fn test_filter_without_matches_clears_selection() {
        let mut app = test_app(cover_transport(), 10);
        app.handle_app_event(AppEvent::LibraryLoaded(Ok(sample_snapshot())));

        app.set_letter_filter(Some('q'));

        assert_eq!(app.pager.filter(), Some('Q'));
        assert_eq!(app.artist_list_state.selected(), None);
        assert!(app.display_list().is_empty());
        assert!(app.cover_image.is_none());

        app.set_letter_filter(None);
        assert_eq!(app.pager.filtered_len(), 3);
        assert_eq!(app.artist_list_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_filter_before_load_is_ignored() {
        let mut app = test_app(cover_transport(), 10);
        app.set_letter_filter(Some('A'));
        assert_eq!(app.pager.filter(), None);
    }

    #[test]
    fn test_auth_failure_keeps_pre_load_state() {
        let mut app = test_app(cover_transport(), 10);

        app.handle_app_event(AppEvent::LibraryLoaded(Err(ClientError::Auth { status: 401 })));

        assert!(!app.store.is_loaded());
        assert!(matches!(app.load_state, LoadState::Failed(_)));
        assert_eq!(
            app.status.as_ref().map(|s| s.kind),
            Some(MessageType::Error)
        );
    }

    #[tokio::test]
    async fn test_enter_expands_album_then_plays_track() {
        let transport = MockTransport::new(|_, _, _| Ok(TransportResponse::status(404)));
        let mut app = test_app(transport, 10);
        let mut rx = app.events_rx.take().unwrap();
        app.handle_app_event(AppEvent::LibraryLoaded(Ok(sample_snapshot())));

        app.activate_selection();
        assert_eq!(app.panel_focus, PanelFocus::Albums);

        app.activate_selection();
        assert!(app.expanded_albums.contains("al1"));
        assert_eq!(app.display_list().len(), 4);

        app.navigate_down();
        assert_eq!(
            app.selected_display_item(),
            Some(DisplayItem::Song {
                hash: "s1".to_string(),
                album_hash: "al1".to_string()
            })
        );

        app.activate_selection();
        assert!(app.playback.is_busy());

        // Two cover misses, then the failed audio resolution
        loop {
            let event = rx.recv().await.unwrap();
            let is_audio = matches!(event, AppEvent::AudioResolved { .. });
            app.handle_app_event(event);
            if is_audio {
                break;
            }
        }
        assert!(!app.playback.is_busy());
        assert_eq!(
            app.status.as_ref().map(|s| s.kind),
            Some(MessageType::Error)
        );
    }
}
