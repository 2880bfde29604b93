use serde::Deserialize;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::app::song::Song;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Artist {
    pub hash: String,
    pub name: String,
    pub genres: Vec<String>,
    pub play_count: u64,
    /// Song hashes credited to this artist
    pub songs: Vec<String>,
    /// Album hashes in server order
    pub albums: Vec<String>,
}

impl Artist {
    pub(crate) fn sanitize(mut self) -> Self {
        self.name = Song::sanitize_string(&self.name);
        self
    }

    /// Key used for the canonical artist order: case-insensitive with
    /// diacritics folded, so "adele" sorts before "Bono" and "Émilie" next
    /// to "Emilie".
    pub fn sort_key(&self) -> String {
        self.name
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .collect::<String>()
            .to_lowercase()
    }

    /// Uppercased first character of the name, used by the letter filter.
    pub fn initial(&self) -> Option<char> {
        self.name.chars().next().and_then(|c| c.to_uppercase().next())
    }
}
