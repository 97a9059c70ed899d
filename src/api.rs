//! API client for the YouTube Data API v3.
//!
//! This module provides the calls needed to build a playlist cache: playlist
//! details, the paginated item list, and video durations.

use crate::cache::VideoCache;
use crate::duration::parse_iso8601_duration;
use crate::error::{AppError, Result};
use crate::types::{Episode, PlaylistCache, PlaylistItem, dedupe_ids};
use log::{debug, info, warn};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Maximum number of retry attempts for failed requests.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds (doubles each retry).
const BASE_RETRY_DELAY_MS: u64 = 500;

/// Largest page size / id batch the API accepts.
pub const MAX_RESULTS: usize = 50;

const API_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Check if an error is retryable (network errors, timeouts, server errors).
fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout()
        || error.is_connect()
        || error.is_request()
        || error.status().map(|s| s.is_server_error()).unwrap_or(false)
}

/// Retry an async operation with exponential backoff.
///
/// Retries the operation up to `MAX_RETRIES` times on retryable errors and
/// on 5xx responses, with exponential backoff starting at
/// `BASE_RETRY_DELAY_MS`.
async fn retry_with_backoff<F, Fut>(operation_name: &str, f: F) -> Result<reqwest::Response>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 0;

    loop {
        let outcome = f().await;
        let retryable = match &outcome {
            Ok(resp) => resp.status().is_server_error(),
            Err(e) => is_retryable_error(e),
        };

        if !retryable || attempt >= MAX_RETRIES {
            return match outcome {
                Ok(resp) => {
                    if attempt > 0 {
                        info!("{} finished after {} attempts", operation_name, attempt + 1);
                    }
                    Ok(resp)
                }
                Err(e) => Err(AppError::Network(format!("{} failed: {}", operation_name, e))),
            };
        }

        let delay = Duration::from_millis(BASE_RETRY_DELAY_MS * 2_u64.pow(attempt));
        match &outcome {
            Ok(resp) => warn!(
                "{} returned {} (attempt {}/{}). Retrying in {:?}...",
                operation_name,
                resp.status(),
                attempt + 1,
                MAX_RETRIES + 1,
                delay
            ),
            Err(e) => warn!(
                "{} failed (attempt {}/{}): {}. Retrying in {:?}...",
                operation_name,
                attempt + 1,
                MAX_RETRIES + 1,
                e,
                delay
            ),
        }
        sleep(delay).await;
        attempt += 1;
    }
}

// Error envelope returned by Google APIs
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

// Response types for playlistItems
#[derive(Debug, Deserialize)]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<RawPlaylistItem>,
    #[serde(default, rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPlaylistItem {
    #[serde(default)]
    snippet: Option<ItemSnippet>,
    #[serde(default, rename = "contentDetails")]
    content_details: Option<ItemContentDetails>,
}

#[derive(Debug, Deserialize)]
struct ItemSnippet {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "resourceId")]
    resource_id: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
struct ResourceId {
    #[serde(default, rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemContentDetails {
    #[serde(default, rename = "videoId")]
    video_id: Option<String>,
}

// Response types for videos
#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<RawVideo>,
}

#[derive(Debug, Deserialize)]
struct RawVideo {
    id: String,
    #[serde(default, rename = "contentDetails")]
    content_details: Option<VideoContentDetails>,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    #[serde(default)]
    duration: Option<String>,
}

impl RawPlaylistItem {
    fn into_item(self) -> Option<PlaylistItem> {
        let (title, snippet_video) = match self.snippet {
            Some(s) => (s.title, s.resource_id.and_then(|r| r.video_id)),
            None => (None, None),
        };
        let video_id = snippet_video.or(self.content_details.and_then(|c| c.video_id))?;

        Some(PlaylistItem { video_id, title })
    }
}

/// Convert one page of items, dropping entries without a video id.
fn page_items(page: Vec<RawPlaylistItem>) -> Vec<PlaylistItem> {
    page.into_iter()
        .filter_map(|raw| {
            let item = raw.into_item();
            if item.is_none() {
                warn!("Skipping playlist item without a video id");
            }
            item
        })
        .collect()
}

/// Durations keyed by video id, from a `videos` response.
fn video_durations(resp: VideosResponse) -> HashMap<String, u64> {
    resp.items
        .into_iter()
        .map(|v| {
            let iso = v
                .content_details
                .and_then(|c| c.duration)
                .unwrap_or_default();
            (v.id, parse_iso8601_duration(&iso))
        })
        .collect()
}

/// Map a non-success response to an error, keeping the API's message.
fn status_error(operation_name: &str, status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_default();
    let detail = if message.is_empty() {
        format!("{} failed: HTTP {}", operation_name, status)
    } else {
        format!("{} failed: HTTP {}: {}", operation_name, status, message)
    };

    match status {
        StatusCode::NOT_FOUND => AppError::NotFound(detail),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Auth(detail),
        _ => AppError::Network(detail),
    }
}

/// Fetch pages until one comes back without a `nextPageToken`.
///
/// `fetch_page` receives the token of the page to fetch, `None` for the
/// first one.
async fn collect_pages<F, Fut>(mut fetch_page: F) -> Result<Vec<PlaylistItem>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<PlaylistItemsResponse>>,
{
    let mut items = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = fetch_page(page_token.take()).await?;

        items.extend(page_items(page.items));
        debug!("Fetched {} playlist items so far", items.len());

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    Ok(items)
}

/// Merge durations into items, keeping playlist order.
///
/// Repeated videos get distinct episode ids.
pub fn build_episodes(items: Vec<PlaylistItem>, durations: &HashMap<String, u64>) -> Vec<Episode> {
    let mut episodes: Vec<Episode> = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let duration = durations.get(&item.video_id).copied().unwrap_or(0);
            item.into_episode(i, duration)
        })
        .collect();
    dedupe_ids(&mut episodes);
    episodes
}

/// Authenticated YouTube Data API client.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl YouTubeClient {
    /// Create a client using a bearer access token.
    pub fn new(access_token: &str) -> Result<Self> {
        Self::with_base_url(access_token, API_URL)
    }

    /// Create a client against a different API root.
    pub fn with_base_url(access_token: &str, base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            access_token: access_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation_name: &str,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let resp = retry_with_backoff(operation_name, || {
            self.http
                .get(&url)
                .bearer_auth(&self.access_token)
                .query(query)
                .send()
        })
        .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(status_error(operation_name, status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            AppError::Parse(format!("Failed to parse {} response: {}", operation_name, e))
        })
    }

    /// Fetch playlist metadata.
    ///
    /// Returns the raw `items` array of the `playlists` endpoint, or an empty
    /// array when the playlist is unknown.
    pub async fn get_playlist(&self, playlist_id: &str) -> Result<Value> {
        debug!("Fetching details for playlist {}", playlist_id);

        let resp: Value = self
            .get_json(
                "Fetch playlist",
                "playlists",
                &[
                    ("part", "snippet,contentDetails,status,player,localizations".to_string()),
                    ("id", playlist_id.to_string()),
                ],
            )
            .await?;

        Ok(resp
            .get("items")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())))
    }

    /// Fetch all items of a playlist, following page tokens.
    pub async fn get_playlist_items(&self, playlist_id: &str) -> Result<Vec<PlaylistItem>> {
        collect_pages(|page_token| {
            let mut query = vec![
                ("part", "snippet,contentDetails,status,id".to_string()),
                ("playlistId", playlist_id.to_string()),
                ("maxResults", MAX_RESULTS.to_string()),
            ];
            if let Some(token) = page_token {
                query.push(("pageToken", token));
            }

            async move {
                self.get_json::<PlaylistItemsResponse>(
                    "Fetch playlist items",
                    "playlistItems",
                    &query,
                )
                .await
            }
        })
        .await
    }

    /// Look up durations for the given videos, consulting `cache` first.
    ///
    /// Videos the API does not return (deleted or private) count as zero
    /// seconds and are not cached.
    pub async fn get_video_durations(
        &self,
        video_ids: &[String],
        cache: &VideoCache,
    ) -> Result<HashMap<String, u64>> {
        let mut durations = HashMap::new();
        let mut seen = HashSet::new();
        let mut missing = Vec::new();

        for id in video_ids {
            if !seen.insert(id.as_str()) {
                continue;
            }
            match cache.get(id) {
                Some(duration) => {
                    durations.insert(id.clone(), duration);
                }
                None => missing.push(id.clone()),
            }
        }

        debug!(
            "{} durations cached, {} to fetch",
            durations.len(),
            missing.len()
        );

        for batch in missing.chunks(MAX_RESULTS) {
            let resp: VideosResponse = self
                .get_json(
                    "Fetch video durations",
                    "videos",
                    &[
                        ("part", "contentDetails".to_string()),
                        ("id", batch.join(",")),
                        ("maxResults", MAX_RESULTS.to_string()),
                    ],
                )
                .await?;

            let fetched = video_durations(resp);
            for id in batch {
                match fetched.get(id) {
                    Some(&duration) => {
                        if let Err(e) = cache.put(id, duration) {
                            warn!("Failed to cache duration of {}: {}", id, e);
                        }
                        durations.insert(id.clone(), duration);
                    }
                    None => {
                        warn!("No duration returned for video {}", id);
                        durations.insert(id.clone(), 0);
                    }
                }
            }
        }

        Ok(durations)
    }

    /// Fetch everything needed for a playlist cache document.
    pub async fn fetch_playlist(
        &self,
        playlist_id: &str,
        video_cache: &VideoCache,
    ) -> Result<PlaylistCache> {
        let details = self.get_playlist(playlist_id).await?;
        let items = self.get_playlist_items(playlist_id).await?;

        let details_empty = details.as_array().map(Vec::is_empty).unwrap_or(true);
        if details_empty && items.is_empty() {
            return Err(AppError::NotFound(format!("Playlist '{}'", playlist_id)));
        }

        let ids: Vec<String> = items.iter().map(|i| i.video_id.clone()).collect();
        let durations = self.get_video_durations(&ids, video_cache).await?;

        Ok(PlaylistCache {
            details,
            items: build_episodes(items, &durations),
        })
    }
}
