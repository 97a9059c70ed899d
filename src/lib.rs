//! Track how much of a YouTube playlist you have watched, from the terminal.
//!
//! playlist-watcher signs in with OAuth, fetches a playlist's items and their
//! durations, caches them locally and shows an interactive list in which
//! episodes can be marked as watched. The share of watched time is shown
//! under the list and every change is saved straight away.
//!
//! # Features
//!
//! - OAuth2 sign-in with token refresh
//! - Paginated playlist fetching with per-video duration cache
//! - Paged episode list with watched checkboxes
//! - Watched time and percentage summary
//!
//! # Usage
//!
//! ```bash
//! # Prompt for a playlist ID
//! cargo run
//!
//! # Open a playlist directly, ignoring the cache
//! cargo run -- --playlist PLxxxxxxxx --refresh
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod duration;
pub mod error;
pub mod stats;
pub mod tui;
pub mod types;
pub mod ui;
