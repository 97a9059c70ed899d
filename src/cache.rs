//! Local caches for playlists and video durations.
//!
//! Playlists are stored as one pretty-printed JSON document per playlist
//! (`playlist-{id}.json`); video durations as one small file per video under
//! `videos/` so that playlists sharing videos only fetch them once.

use crate::error::Result;
use crate::types::PlaylistCache;
use log::warn;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Persistence for playlist documents, keyed by playlist ID.
pub trait PlaylistStore {
    /// Load the cached document, or `None` when there is no usable cache.
    fn load(&self, playlist_id: &str) -> Option<PlaylistCache>;

    /// Persist the full document for a playlist.
    fn save(&self, playlist_id: &str, data: &PlaylistCache) -> Result<()>;
}

/// File-backed playlist store rooted at a cache directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the cache file for a playlist.
    pub fn path_for(&self, playlist_id: &str) -> PathBuf {
        self.dir.join(format!("playlist-{}.json", playlist_id))
    }
}

impl PlaylistStore for FileCache {
    fn load(&self, playlist_id: &str) -> Option<PlaylistCache> {
        let path = self.path_for(playlist_id);
        if !path.exists() {
            return None;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read cache {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("Ignoring corrupt cache {}: {}", path.display(), e);
                None
            }
        }
    }

    fn save(&self, playlist_id: &str, data: &PlaylistCache) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(playlist_id);
        let content = serde_json::to_string_pretty(data)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

/// In-memory playlist store, handy for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RefCell<HashMap<String, PlaylistCache>>,
    saves: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl PlaylistStore for MemoryStore {
    fn load(&self, playlist_id: &str) -> Option<PlaylistCache> {
        self.documents.borrow().get(playlist_id).cloned()
    }

    fn save(&self, playlist_id: &str, data: &PlaylistCache) -> Result<()> {
        self.documents
            .borrow_mut()
            .insert(playlist_id.to_string(), data.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct VideoEntry {
    duration: u64,
}

/// Per-video duration cache.
#[derive(Debug, Clone)]
pub struct VideoCache {
    dir: PathBuf,
}

impl VideoCache {
    /// Create a cache under `<cache_dir>/videos`.
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            dir: cache_dir.join("videos"),
        }
    }

    fn path_for(&self, video_id: &str) -> PathBuf {
        self.dir.join(format!("video-{}.json", video_id))
    }

    /// Cached duration in seconds, if known.
    pub fn get(&self, video_id: &str) -> Option<u64> {
        let content = fs::read_to_string(self.path_for(video_id)).ok()?;
        serde_json::from_str::<VideoEntry>(&content)
            .ok()
            .map(|entry| entry.duration)
    }

    /// Remember a duration.
    pub fn put(&self, video_id: &str, duration: u64) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string(&VideoEntry { duration })?;
        fs::write(self.path_for(video_id), content)?;
        Ok(())
    }
}
