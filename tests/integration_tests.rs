//! Integration tests for playlist-watcher.
//!
//! These tests drive the public API end to end with in-memory or temporary
//! stores; nothing here talks to the network.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use playlist_watcher::cache::{FileCache, MemoryStore, PlaylistStore};
use playlist_watcher::duration::format_duration;
use playlist_watcher::stats::WatchStats;
use playlist_watcher::tui::{App, Command, Nav, SessionState, render_lines, run_session};
use playlist_watcher::types::{Episode, PlaylistCache};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use serde_json::json;
use std::collections::VecDeque;
use std::io;

fn playlist(durations: &[u64]) -> PlaylistCache {
    PlaylistCache {
        details: json!([{ "snippet": { "title": "Rust talks" } }]),
        items: durations
            .iter()
            .enumerate()
            .map(|(i, &duration)| Episode {
                id: format!("vid{}", i),
                title: format!("Talk {}", i + 1),
                duration,
                watched: false,
            })
            .collect(),
    }
}

fn keys(codes: &[KeyCode]) -> impl FnMut() -> io::Result<Option<Event>> {
    let mut queue: VecDeque<Event> = codes
        .iter()
        .map(|&c| Event::Key(KeyEvent::new(c, KeyModifiers::NONE)))
        .collect();
    move || Ok(Some(queue.pop_front().unwrap_or(Event::Key(KeyEvent::new(
        KeyCode::Char('q'),
        KeyModifiers::NONE,
    )))))
}

/// Test the duration formats shown in the list.
#[test]
fn test_duration_formatting() {
    assert_eq!(format_duration(0), "00m 00s");
    assert_eq!(format_duration(59), "00m 59s");
    assert_eq!(format_duration(3661), "01h 01m 01s");
}

/// Test the watched ratio for a mixed playlist.
#[test]
fn test_stats_scenario() {
    let mut data = playlist(&[60, 120, 180]);
    data.items[1].watched = true;

    let stats = WatchStats::compute(&data.items);
    assert_eq!(stats.watched_seconds, 120);
    assert_eq!(stats.total_seconds, 360);
    assert_eq!(stats.percentage, "33.33");
    assert_eq!(
        stats.message(),
        "You watched 02m 00s out of 06m 00s (33.33%)"
    );
}

/// Test empty playlists end to end.
#[test]
fn test_empty_playlist_session() {
    let stats = WatchStats::compute(&[]);
    assert_eq!((stats.watched_seconds, stats.total_seconds), (0, 0));
    assert_eq!(stats.percentage, "0");
    assert!(stats.message().contains("(0%)"));

    let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
    let mut app = App::new("EMPTY", playlist(&[]));
    let store = MemoryStore::new();

    run_session(
        &mut terminal,
        &mut app,
        &store,
        keys(&[KeyCode::Down, KeyCode::Enter, KeyCode::Up, KeyCode::Char(' ')]),
    )
    .unwrap();

    assert_eq!(store.save_count(), 0);
    assert_eq!(app.state, SessionState::Terminated);
}

/// Test the window after scrolling past the first page.
#[test]
fn test_scrolling_window() {
    let mut app = App::new("PL", playlist(&[30; 25]));
    for _ in 0..12 {
        app.apply(Command::Move(Nav::Down));
    }

    assert_eq!(app.view.cursor, 12);
    assert_eq!(app.view.window_start, 3);

    let lines = render_lines(app.episodes(), &app.view);
    assert_eq!(lines[9], "> 013. [ ] Talk 13 (00m 30s)");
    assert!(lines.contains(&"Showing 4–13 of 25 episodes.".to_string()));
}

/// Test boundary moves leave the view untouched.
#[test]
fn test_boundary_moves() {
    let mut app = App::new("PL", playlist(&[30; 4]));
    app.apply(Command::Move(Nav::Up));
    assert_eq!((app.view.cursor, app.view.window_start), (0, 0));

    for _ in 0..10 {
        app.apply(Command::Move(Nav::Down));
    }
    assert_eq!((app.view.cursor, app.view.window_start), (3, 0));
}

/// Test that toggles made in a session survive a reload from disk.
#[test]
fn test_session_persists_to_file_cache() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCache::new(dir.path());
    store.save("PLdisk", &playlist(&[60, 120, 180])).unwrap();

    let data = store.load("PLdisk").unwrap();
    let mut app = App::new("PLdisk", data);
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();

    run_session(
        &mut terminal,
        &mut app,
        &store,
        keys(&[KeyCode::Down, KeyCode::Enter, KeyCode::Down, KeyCode::Char(' '), KeyCode::Char('q')]),
    )
    .unwrap();

    let reloaded = store.load("PLdisk").unwrap();
    let watched: Vec<bool> = reloaded.items.iter().map(|e| e.watched).collect();
    assert_eq!(watched, vec![false, true, true]);
    assert_eq!(reloaded.details, json!([{ "snippet": { "title": "Rust talks" } }]));

    let stats = WatchStats::compute(&reloaded.items);
    assert_eq!(stats.percentage, "83.33");
}

/// Test that a double toggle restores the original state.
#[test]
fn test_double_toggle_restores() {
    let original = playlist(&[10, 20, 30]);
    let mut app = App::new("PL", original.clone());
    app.apply(Command::Move(Nav::Down));
    app.apply(Command::Toggle);
    app.apply(Command::Toggle);

    assert_eq!(app.data, original);
}
