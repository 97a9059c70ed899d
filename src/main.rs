//! Main entry point for the playlist-watcher CLI application.

use clap::Parser;
use log::{debug, error, info, warn};
use playlist_watcher::api::YouTubeClient;
use playlist_watcher::auth::{self, now_ms};
use playlist_watcher::cache::{FileCache, PlaylistStore, VideoCache};
use playlist_watcher::config::Config;
use playlist_watcher::credentials::{self, Credentials, Token};
use playlist_watcher::error::Result;
use playlist_watcher::tui::{App, TerminalGuard, poll_event, run_session};
use playlist_watcher::types::PlaylistCache;
use playlist_watcher::ui;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Command-line arguments for the playlist-watcher application.
#[derive(Parser, Debug)]
#[command(
    name = "playlist-watcher",
    version,
    about = "Track watched progress through a YouTube playlist",
    long_about = "Fetch a YouTube playlist, cache it locally and mark episodes as watched in a TUI."
)]
struct Args {
    /// Playlist ID or URL (prompted for when omitted)
    #[arg(short, long)]
    playlist: Option<String>,

    /// Fetch the playlist again even if it is cached (watched flags are kept)
    #[arg(short, long)]
    refresh: bool,

    /// OAuth client credentials file
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// OAuth token file
    #[arg(long)]
    token: Option<PathBuf>,

    /// Cache directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Log verbosity level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short, long, default_value_t = 1)]
    log: u8,
}

/// Load a stored token, refreshing it when expired, or run the consent flow.
async fn obtain_token(credentials: &Credentials, token_path: &std::path::Path) -> Result<Token> {
    if token_path.exists() {
        let token = credentials::read_token(token_path)?;
        if !token.is_expired(now_ms()) {
            debug!("Using stored token from {}", token_path.display());
            return Ok(token);
        }

        let token = auth::refresh(credentials, &token).await?;
        credentials::write_token(token_path, &token)?;
        return Ok(token);
    }

    let url = auth::authorization_url(credentials)?;
    println!("Authorize this app by visiting this url:\n\n  {}\n", url);

    let code = ui::prompt_auth_code()?;
    let token = auth::exchange_code(credentials, &code).await?;
    credentials::write_token(token_path, &token)?;
    info!("Token stored to {}", token_path.display());
    Ok(token)
}

/// Copy watched flags from a previous cache onto freshly fetched episodes.
fn carry_watched(fresh: &mut PlaylistCache, previous: &PlaylistCache) {
    for episode in &mut fresh.items {
        if let Some(old) = previous.items.iter().find(|e| e.id == episode.id) {
            episode.watched = old.watched;
        }
    }
}

/// Load the playlist from cache, or fetch and cache it. Done exactly once.
async fn load_playlist(
    config: &Config,
    store: &FileCache,
    playlist_id: &str,
    refresh: bool,
) -> Result<PlaylistCache> {
    let cached = store.load(playlist_id);
    if let Some(data) = &cached {
        if !refresh {
            info!("Loaded playlist data from cache.");
            return Ok(data.clone());
        }
    }

    let credentials = credentials::read_credentials(&config.credentials_path)?;
    let token = obtain_token(&credentials, &config.token_path).await?;
    let client = YouTubeClient::new(&token.access_token)?;

    let mut data = client
        .fetch_playlist(playlist_id, &VideoCache::new(&config.cache_dir))
        .await?;
    if let Some(previous) = &cached {
        carry_watched(&mut data, previous);
    }

    store.save(playlist_id, &data)?;
    info!("Fetched and cached playlist data ({} items).", data.items.len());
    Ok(data)
}

async fn run(args: Args) -> Result<()> {
    let _ = dotenvy::dotenv();

    // Load config
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config: {}. Using defaults.", e);
        Config::new()
    });

    // Merge config with environment and CLI args
    let mut config = config.with_env();
    if let Some(path) = args.credentials {
        config.credentials_path = path;
    }
    if let Some(path) = args.token {
        config.token_path = path;
    }
    if let Some(dir) = args.cache_dir {
        config.cache_dir = dir;
    }
    let config = config.resolved()?;
    debug!("Using {:?}", config);

    let playlist_id = match &args.playlist {
        Some(input) => ui::validate_playlist_id(input)?,
        None => ui::prompt_playlist_id()?,
    };

    let store = FileCache::new(&config.cache_dir);
    let data = load_playlist(&config, &store, &playlist_id, args.refresh).await?;

    let mut app = App::new(playlist_id, data);

    // Initialize terminal
    let mut guard = TerminalGuard::enter()?;
    let result = run_session(guard.terminal(), &mut app, &store, || {
        poll_event(Duration::from_millis(100))
    });

    // Restore terminal
    guard.restore()?;
    result?;

    if !app.save_failures.is_empty() {
        warn!(
            "{} change(s) could not be saved to {}",
            app.save_failures.len(),
            store.path_for(&app.playlist_id).display()
        );
        for failure in &app.save_failures {
            warn!("  {}", failure);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.log {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    debug!("Log level set to {:?}", log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playlist_watcher::api::build_episodes;
    use playlist_watcher::types::{Episode, PlaylistItem};
    use std::collections::HashMap;
    use serde_json::Value;

    fn episode(id: &str, watched: bool) -> Episode {
        Episode {
            id: id.to_string(),
            title: id.to_string(),
            duration: 10,
            watched,
        }
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["playlist-watcher", "-p", "PL1", "--refresh", "-l", "3"]);
        assert_eq!(args.playlist.as_deref(), Some("PL1"));
        assert!(args.refresh);
        assert_eq!(args.log, 3);
        assert!(args.cache_dir.is_none());
    }

    #[test]
    fn test_carry_watched() {
        let previous = PlaylistCache {
            details: Value::Null,
            items: vec![episode("a", true), episode("b", false), episode("gone", true)],
        };
        let mut fresh = PlaylistCache {
            details: Value::Null,
            items: vec![episode("new", false), episode("a", false), episode("b", false)],
        };

        carry_watched(&mut fresh, &previous);
        let watched: Vec<bool> = fresh.items.iter().map(|e| e.watched).collect();
        assert_eq!(watched, vec![false, true, false]);
    }

    #[test]
    fn test_carry_watched_repeated_video() {
        let fetch = || {
            let items = vec![
                PlaylistItem {
                    video_id: "same".to_string(),
                    title: Some("First copy".to_string()),
                },
                PlaylistItem {
                    video_id: "same".to_string(),
                    title: Some("Second copy".to_string()),
                },
            ];
            PlaylistCache {
                details: Value::Null,
                items: build_episodes(items, &HashMap::new()),
            }
        };

        let mut previous = fetch();
        previous.items[0].watched = true;

        let mut fresh = fetch();
        carry_watched(&mut fresh, &previous);
        let watched: Vec<bool> = fresh.items.iter().map(|e| e.watched).collect();
        assert_eq!(watched, vec![true, false]);
    }
}
