use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::app::api::ApiClient;
use crate::app::error::ClientError;
use crate::app::song::{Album, Artist, Song};

/// Queries shorter than this return no search results
const MIN_SEARCH_QUERY_LEN: usize = 3;
/// Maximum number of search results returned
const MAX_SEARCH_RESULTS: usize = 20;

/// Body of `POST /get_full_library`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LibraryResponse {
    pub songs: Vec<Song>,
    pub albums: Vec<Album>,
    pub artists: Vec<Artist>,
}

/// One complete copy of the library, replaced as a whole on every load.
#[derive(Debug, Default)]
pub struct LibrarySnapshot {
    songs: Vec<Song>,
    albums: Vec<Album>,
    /// Sorted by name, ignoring case and diacritics
    artists: Vec<Artist>,
    song_index: HashMap<String, usize>,
    album_index: HashMap<String, usize>,
}

/// A song matched by [`LibrarySnapshot::search_songs`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit<'a> {
    pub song: &'a Song,
    pub score: u32,
}

impl LibrarySnapshot {
    /// Build the snapshot and its hash indexes from a server response.
    pub fn from_response(response: LibraryResponse) -> Self {
        let songs: Vec<Song> = response.songs.into_iter().map(Song::sanitize).collect();
        let albums: Vec<Album> = response.albums.into_iter().map(Album::sanitize).collect();
        let mut artists: Vec<Artist> = response
            .artists
            .into_iter()
            .map(Artist::sanitize)
            .collect();

        artists.sort_by_cached_key(|artist| (artist.sort_key(), artist.name.clone()));

        // First occurrence wins if the server ever sends a duplicate hash
        let mut song_index = HashMap::with_capacity(songs.len());
        for (i, song) in songs.iter().enumerate() {
            song_index.entry(song.hash.clone()).or_insert(i);
        }
        let mut album_index = HashMap::with_capacity(albums.len());
        for (i, album) in albums.iter().enumerate() {
            album_index.entry(album.hash.clone()).or_insert(i);
        }

        let snapshot = Self {
            songs,
            albums,
            artists,
            song_index,
            album_index,
        };

        let dangling = snapshot.dangling_references();
        if dangling > 0 {
            log::warn!("Library contains {} dangling song/album references", dangling);
        }

        snapshot
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty() && self.albums.is_empty() && self.artists.is_empty()
    }

    pub fn song_by_hash(&self, hash: &str) -> Option<&Song> {
        self.song_index.get(hash).map(|&i| &self.songs[i])
    }

    pub fn album_by_hash(&self, hash: &str) -> Option<&Album> {
        self.album_index.get(hash).map(|&i| &self.albums[i])
    }

    /// Songs of an album in album order, skipping hashes that do not resolve.
    pub fn songs_of<'a>(&'a self, album: &'a Album) -> impl Iterator<Item = &'a Song> + 'a {
        album.songs.iter().filter_map(|hash| self.song_by_hash(hash))
    }

    /// Songs of an album ordered by disc then track number.
    pub fn tracks_of<'a>(&'a self, album: &'a Album) -> Vec<&'a Song> {
        let mut tracks: Vec<&Song> = self.songs_of(album).collect();
        tracks.sort_by(|a, b| {
            a.disc_number
                .cmp(&b.disc_number)
                .then(a.track_number.cmp(&b.track_number))
        });
        tracks
    }

    /// Albums of an artist, skipping hashes that do not resolve.
    pub fn albums_of<'a>(&'a self, artist: &'a Artist) -> impl Iterator<Item = &'a Album> + 'a {
        artist
            .albums
            .iter()
            .filter_map(|hash| self.album_by_hash(hash))
    }

    pub fn album_duration(&self, album: &Album) -> Duration {
        self.songs_of(album).map(Song::duration).sum()
    }

    /// Song hash used to fetch an album's cover.
    pub fn cover_hash_for<'a>(&self, album: &'a Album) -> Option<&'a str> {
        album.cover_song_hash(|hash| self.song_index.contains_key(hash))
    }

    fn dangling_references(&self) -> usize {
        let dangling_songs = self
            .albums
            .iter()
            .flat_map(|a| a.songs.iter())
            .filter(|hash| !self.song_index.contains_key(hash.as_str()))
            .count();
        let dangling_albums = self
            .artists
            .iter()
            .flat_map(|a| a.albums.iter())
            .filter(|hash| !self.album_index.contains_key(hash.as_str()))
            .count();
        dangling_songs + dangling_albums
    }

    /// Word-overlap search over title, artists and album.
    ///
    /// Each distinct query word scores 2 when it equals a word of the song and
    /// 1 when it is contained in one. Results are ordered by score, ties keep
    /// library order.
    pub fn search_songs(&self, query: &str) -> Vec<SearchHit<'_>> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < MIN_SEARCH_QUERY_LEN {
            return Vec::new();
        }
        let query_words: HashSet<&str> = query.split_whitespace().collect();

        let mut hits: Vec<SearchHit<'_>> = self
            .songs
            .iter()
            .filter_map(|song| {
                let haystack = format!("{} {} {}", song.title, song.artists(), song.album)
                    .to_lowercase();
                let song_words: HashSet<&str> = haystack.split_whitespace().collect();

                let score: u32 = query_words
                    .iter()
                    .map(|word| {
                        if song_words.contains(word) {
                            2
                        } else if song_words.iter().any(|w| w.contains(word)) {
                            1
                        } else {
                            0
                        }
                    })
                    .sum();

                (score > 0).then_some(SearchHit { song, score })
            })
            .collect();

        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits.truncate(MAX_SEARCH_RESULTS);
        hits
    }
}

/// Owns the current snapshot and knows how to fetch a new one.
#[derive(Debug)]
pub struct LibraryStore {
    client: ApiClient,
    snapshot: Option<Arc<LibrarySnapshot>>,
}

impl LibraryStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            snapshot: None,
        }
    }

    /// Fetch a fresh snapshot without touching any store.
    pub async fn fetch(client: &ApiClient) -> Result<LibrarySnapshot, ClientError> {
        let start_time = Instant::now();
        log::info!("Fetching full library...");

        let response = client.full_library().await.inspect_err(|e| {
            log::error!("Library load failed: {}", e);
        })?;
        let snapshot = LibrarySnapshot::from_response(response);

        log::info!(
            "Library loaded: {} artists, {} albums, {} songs in {:?}",
            snapshot.artists.len(),
            snapshot.albums.len(),
            snapshot.songs.len(),
            start_time.elapsed()
        );
        Ok(snapshot)
    }

    /// Fetch and install a new snapshot. On failure the previous snapshot
    /// (if any) stays in place untouched.
    pub async fn load(&mut self) -> Result<Arc<LibrarySnapshot>, ClientError> {
        let snapshot = Self::fetch(&self.client).await?;
        Ok(self.install(snapshot))
    }

    /// Replace the current snapshot wholesale.
    pub fn install(&mut self, snapshot: LibrarySnapshot) -> Arc<LibrarySnapshot> {
        let snapshot = Arc::new(snapshot);
        self.snapshot = Some(Arc::clone(&snapshot));
        snapshot
    }

    pub fn snapshot(&self) -> Option<&Arc<LibrarySnapshot>> {
        self.snapshot.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn song_by_hash(&self, hash: &str) -> Option<&Song> {
        self.snapshot.as_ref()?.song_by_hash(hash)
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}
