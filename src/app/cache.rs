//! Session cache for resolved media.
//!
//! Cover art and audio fetched from the server are kept here, keyed by song
//! hash and rendition, so that revisiting an album or replaying a song never
//! goes back to the network. The cache is unbounded by default; a positive
//! `max_entries` turns on LRU eviction.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::app::api::{MediaPayload, TranscodeOptions};

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Cover,
    Audio,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cover => f.write_str("cover"),
            Self::Audio => f.write_str("audio"),
        }
    }
}

/// Which rendition of a resource a key refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Cover scaled to this edge length
    Size(u32),
    /// Audio regardless of transcode parameters
    AnyRendition,
    /// Audio in one specific transcode rendition
    Rendition {
        transcode: bool,
        format: String,
        bitrate: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: ResourceKind,
    pub song_hash: String,
    pub variant: Variant,
}

impl CacheKey {
    pub fn cover(song_hash: &str, size: u32) -> Self {
        Self {
            kind: ResourceKind::Cover,
            song_hash: song_hash.to_string(),
            variant: Variant::Size(size),
        }
    }

    /// Audio key that ignores transcode parameters.
    pub fn audio(song_hash: &str) -> Self {
        Self {
            kind: ResourceKind::Audio,
            song_hash: song_hash.to_string(),
            variant: Variant::AnyRendition,
        }
    }

    /// Audio key that distinguishes format, bitrate and transcode flag.
    pub fn audio_rendition(song_hash: &str, options: &TranscodeOptions) -> Self {
        Self {
            kind: ResourceKind::Audio,
            song_hash: song_hash.to_string(),
            variant: Variant::Rendition {
                transcode: options.transcode,
                format: options.format.clone(),
                bitrate: options.bitrate,
            },
        }
    }
}

/// Opaque reference to resolved media bytes.
///
/// Clones share the payload; `id` identifies one resolution so playback can
/// tell two fetches of the same song apart.
#[derive(Debug, Clone)]
pub struct MediaHandle {
    pub id: u64,
    pub data: Arc<[u8]>,
    pub content_type: Option<String>,
}

impl MediaHandle {
    pub fn new(data: impl Into<Arc<[u8]>>, content_type: Option<String>) -> Self {
        Self {
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            data: data.into(),
            content_type,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<MediaPayload> for MediaHandle {
    fn from(payload: MediaPayload) -> Self {
        Self::new(payload.data, payload.content_type)
    }
}

impl PartialEq for MediaHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[derive(Debug)]
pub struct ResourceCache {
    entries: HashMap<CacheKey, MediaHandle>,
    /// LRU order (front = oldest, back = most recent); only kept when bounded
    lru_order: VecDeque<CacheKey>,
    /// 0 means unbounded
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl ResourceCache {
    /// Cache that keeps every entry for the whole session.
    pub fn new() -> Self {
        Self::with_capacity_limit(0)
    }

    /// Cache evicting the least recently used entry beyond `max_entries`.
    pub fn with_capacity_limit(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru_order: VecDeque::new(),
            max_entries,
            hits: 0,
            misses: 0,
        }
    }

    fn is_bounded(&self) -> bool {
        self.max_entries > 0
    }

    fn touch(&mut self, key: &CacheKey) {
        if self.is_bounded() {
            self.lru_order.retain(|k| k != key);
            self.lru_order.push_back(key.clone());
        }
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<MediaHandle> {
        match self.entries.get(key).cloned() {
            Some(handle) => {
                self.hits += 1;
                self.touch(key);
                Some(handle)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Check if a key is cached (without updating LRU or stats)
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Store a handle, overwriting any previous entry for the key.
    pub fn put(&mut self, key: CacheKey, handle: MediaHandle) {
        if self.contains(&key) {
            self.touch(&key);
            self.entries.insert(key, handle);
            return;
        }

        if self.is_bounded() {
            while self.entries.len() >= self.max_entries {
                let Some(oldest) = self.lru_order.pop_front() else {
                    break;
                };
                self.entries.remove(&oldest);
                log::debug!("Evicted cache entry: {:?}", oldest);
            }
            self.lru_order.push_back(key.clone());
        }
        self.entries.insert(key, handle);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses, entries)
    pub fn stats(&self) -> (u64, u64, usize) {
        (self.hits, self.misses, self.len())
    }

    pub fn log_stats(&self) {
        let (hits, misses, entries) = self.stats();
        if self.is_empty() && hits + misses == 0 {
            return;
        }
        let hit_rate = if hits + misses > 0 {
            (hits as f64 / (hits + misses) as f64) * 100.0
        } else {
            0.0
        };
        let bytes: usize = self.entries.values().map(MediaHandle::len).sum();
        log::info!(
            "Media cache: {} hits, {} misses ({:.1}% hit rate), {} entries, {} KiB",
            hits,
            misses,
            hit_rate,
            entries,
            bytes / 1024
        );
    }
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared cache wrapped in Arc<RwLock> for access from resolver tasks
pub type SharedResourceCache = Arc<RwLock<ResourceCache>>;

pub fn new_shared_cache(max_entries: usize) -> SharedResourceCache {
    Arc::new(RwLock::new(ResourceCache::with_capacity_limit(max_entries)))
}
