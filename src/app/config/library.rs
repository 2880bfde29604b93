use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Artists shown per page
    #[serde(default = "LibraryConfig::default_page_size")]
    pub page_size: usize,
    /// Edge length requested for cover art (1..=1000)
    #[serde(default = "LibraryConfig::default_cover_size")]
    pub cover_size: u32,
}

impl LibraryConfig {
    fn default_page_size() -> usize {
        10
    }

    fn default_cover_size() -> u32 {
        300
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            page_size: Self::default_page_size(),
            cover_size: Self::default_cover_size(),
        }
    }
}
