use serde::Deserialize;

use crate::app::song::Song;

/// An album as sent by the server. Tracks are held as song hashes and are
/// resolved against the owning snapshot.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Album {
    pub hash: String,
    pub name: String,
    pub album_artist: String,
    pub artists: Vec<String>,
    pub release_year: u32,
    pub play_count: u64,
    /// Song hashes in server order
    pub songs: Vec<String>,
    pub cover_art: String,
}

impl Album {
    pub(crate) fn sanitize(mut self) -> Self {
        self.name = Song::sanitize_string(&self.name);
        if self.name.trim().is_empty() {
            self.name = "Unknown Album".to_string();
        }
        self
    }

    /// Hash used to request the album cover: the first track that exists.
    pub fn cover_song_hash<'a>(&'a self, has_song: impl Fn(&str) -> bool) -> Option<&'a str> {
        self.songs
            .iter()
            .map(String::as_str)
            .find(|hash| has_song(hash))
    }
}
