use serde::Deserialize;
use std::time::Duration;

/// A single track as reported by the library server.
///
/// Only `hash` is required on the wire; everything else falls back to an
/// empty value so older servers that send fewer fields still load.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Song {
    pub hash: String,
    pub title: String,
    pub track_number: u32,
    pub disc_number: u32,
    /// Length in whole seconds
    pub duration: u64,
    pub genres: Vec<String>,
    pub play_count: u64,
    pub album: String,
    pub album_artist: String,
    pub other_artists: Vec<String>,
    pub release_year: u32,
    pub bitrate: u32,
    pub format: String,
    pub file_size: u64,
    pub loudness: f64,
    pub peak: f64,
    pub explicit: bool,
    pub lastfm_playcount: u64,
    pub lastfm_tags: Vec<String>,
}

impl Song {
    /// Replace control and zero-width characters that break terminal layout.
    pub fn sanitize_string(s: &str) -> String {
        let result: String = s
            .chars()
            .map(|c| match c {
                '\u{0000}'..='\u{001F}'
                | '\u{007F}'..='\u{009F}'
                | '\u{00AD}'
                | '\u{200B}'
                | '\u{200C}'
                | '\u{200D}'
                | '\u{2060}'
                | '\u{3164}'
                | '\u{FEFF}' => ' ',
                _ => c,
            })
            .collect();
        if result != s {
            log::debug!("Sanitized string: {:?} -> {:?}", s, result);
        }
        result
    }

    /// Clean up display strings after deserialization.
    pub(crate) fn sanitize(mut self) -> Self {
        self.title = Self::sanitize_string(&self.title);
        self.album = Self::sanitize_string(&self.album);
        self.album_artist = Self::sanitize_string(&self.album_artist);
        if self.title.trim().is_empty() {
            self.title = "Unknown Title".to_string();
        }
        self
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration)
    }

    /// Album artist followed by featured artists, comma separated.
    pub fn artists(&self) -> String {
        let mut names: Vec<&str> = Vec::with_capacity(1 + self.other_artists.len());
        if !self.album_artist.is_empty() {
            names.push(&self.album_artist);
        }
        names.extend(
            self.other_artists
                .iter()
                .map(String::as_str)
                .filter(|a| !a.is_empty() && *a != self.album_artist),
        );
        names.join(", ")
    }

    /// Format the duration as `m:ss`, or `h:mm:ss` for long tracks.
    pub fn format_duration(duration: Duration) -> String {
        let total = duration.as_secs();
        let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            format!("{}:{:02}", minutes, seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_song() {
        let song: Song = serde_json::from_str(r#"{"hash": "abc", "title": "Intro"}"#).unwrap();
        assert_eq!(song.hash, "abc");
        assert_eq!(song.title, "Intro");
        assert_eq!(song.duration, 0);
        assert!(song.genres.is_empty());
    }

    #[test]
    fn test_deserialize_full_song_ignores_unknown_fields() {
        let json = r#"{
            "hash": "h1", "title": "Song", "track_number": 3, "disc_number": 1,
            "duration": 215, "genres": ["rock", "indie"], "play_count": 7,
            "album": "Album", "album_artist": "Band", "other_artists": ["Guest"],
            "file_path": "/music/band/song.flac", "lyrics": ""
        }"#;
        let song: Song = serde_json::from_str(json).unwrap();
        assert_eq!(song.track_number, 3);
        assert_eq!(song.genres, vec!["rock", "indie"]);
        assert_eq!(song.duration(), Duration::from_secs(215));
        assert_eq!(song.artists(), "Band, Guest");
    }

    #[test]
    fn test_sanitize_replaces_control_chars() {
        let song = Song {
            title: "A\u{200B}B\tC".to_string(),
            ..Default::default()
        }
        .sanitize();
        assert_eq!(song.title, "A B C");
    }

    #[test]
    fn test_empty_title_gets_placeholder() {
        let song = Song::default().sanitize();
        assert_eq!(song.title, "Unknown Title");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(Song::format_duration(Duration::from_secs(0)), "0:00");
        assert_eq!(Song::format_duration(Duration::from_secs(215)), "3:35");
        assert_eq!(Song::format_duration(Duration::from_secs(3725)), "1:02:05");
    }
}
