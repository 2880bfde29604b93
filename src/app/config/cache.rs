use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Maximum cached covers and songs; 0 keeps everything for the session
    #[serde(default)]
    pub max_entries: usize,
}
