//! Type definitions for the playlist-watcher application.
//!
//! This module contains the episode records shown in the list, the cached
//! playlist document, and the raw playlist items returned by the API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// One entry of a playlist, as shown and tracked by the list view.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    /// Identifier, unique within the playlist.
    pub id: String,

    /// Display title.
    pub title: String,

    /// Length in whole seconds.
    pub duration: u64,

    /// Whether the user marked this episode as watched.
    #[serde(default)]
    pub watched: bool,
}

impl Episode {
    /// Build an episode from a loosely typed cache record.
    ///
    /// `index` is the record's 0-based position in the playlist. Missing or
    /// malformed fields fall back to defaults instead of failing:
    /// the id falls back to `videoId` and then to the position, the title to
    /// `Episode {n}`, the duration to 0 and the watched flag to `false`.
    ///
    /// # Examples
    ///
    /// ```
    /// use playlist_watcher::types::Episode;
    ///
    /// let ep = Episode::from_value(2, &serde_json::json!({ "duration": "90" }));
    /// assert_eq!(ep.id, "2");
    /// assert_eq!(ep.title, "Episode 3");
    /// assert_eq!(ep.duration, 90);
    /// assert!(!ep.watched);
    /// ```
    pub fn from_value(index: usize, value: &Value) -> Self {
        let id = non_empty_id(value.get("id"))
            .or_else(|| non_empty_id(value.get("videoId")))
            .unwrap_or_else(|| index.to_string());

        let title = value
            .get("title")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Episode {}", index + 1));

        Self {
            id,
            title,
            duration: coerce_seconds(value.get("duration")),
            watched: value.get("watched").and_then(Value::as_bool).unwrap_or(false),
        }
    }
}

fn non_empty_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerce a JSON duration into non-negative whole seconds.
fn coerce_seconds(value: Option<&Value>) -> u64 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() && n > 0.0 => n.trunc() as u64,
        _ => 0,
    }
}

/// Make episode ids unique within a playlist.
///
/// A playlist may hold the same video more than once. The first occurrence
/// keeps its id; later ones become `{id}#2`, `{id}#3` and so on, so the n-th
/// copy of a video gets the same id on every fetch.
pub fn dedupe_ids(episodes: &mut [Episode]) {
    let mut taken = HashSet::new();

    for episode in episodes.iter_mut() {
        if taken.contains(&episode.id) {
            let mut n = 2;
            let mut candidate = format!("{}#{}", episode.id, n);
            while taken.contains(&candidate) {
                n += 1;
                candidate = format!("{}#{}", episode.id, n);
            }
            episode.id = candidate;
        }
        taken.insert(episode.id.clone());
    }
}

/// The document persisted per playlist: opaque details plus the episodes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawPlaylistCache")]
pub struct PlaylistCache {
    /// Playlist metadata exactly as the API returned it.
    pub details: Value,

    /// Episodes in playlist order.
    pub items: Vec<Episode>,
}

#[derive(Deserialize)]
struct RawPlaylistCache {
    #[serde(default)]
    details: Value,
    #[serde(default)]
    items: Vec<Value>,
}

impl From<RawPlaylistCache> for PlaylistCache {
    fn from(raw: RawPlaylistCache) -> Self {
        let mut items: Vec<Episode> = raw
            .items
            .iter()
            .enumerate()
            .map(|(i, v)| Episode::from_value(i, v))
            .collect();
        dedupe_ids(&mut items);

        Self {
            details: raw.details,
            items,
        }
    }
}

impl PlaylistCache {
    /// Display name of the playlist, if the details carry one.
    pub fn title(&self) -> Option<&str> {
        let first = match &self.details {
            Value::Array(items) => items.first()?,
            other => other,
        };
        first.pointer("/snippet/title").and_then(Value::as_str)
    }
}

/// A playlist entry as listed by the `playlistItems` endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaylistItem {
    /// Identifier of the underlying video.
    pub video_id: String,

    /// Title of the entry.
    pub title: Option<String>,
}

impl PlaylistItem {
    /// Turn this item into an episode with the given duration.
    ///
    /// `index` is used for the fallback title when the item has none. The id
    /// is the video id; see [`dedupe_ids`] for repeated videos.
    pub fn into_episode(self, index: usize, duration: u64) -> Episode {
        let title = self
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("Episode {}", index + 1));

        Episode {
            id: self.video_id,
            title,
            duration,
            watched: false,
        }
    }
}
