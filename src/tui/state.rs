//! Application state management and input handling.

use crate::error::AppError;
use crate::types::{Episode, PlaylistCache};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::types::{Action, Command, Nav, PAGE_SIZE, SessionState};

/// Cursor and visible window over the episode list.
///
/// After every move `window_start <= cursor < window_start + PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    /// Index of the highlighted episode
    pub cursor: usize,
    /// Index of the first visible episode
    pub window_start: usize,
}

impl ViewState {
    /// Apply a cursor movement over a list of `len` episodes.
    ///
    /// Moving past either end leaves the state unchanged; the window only
    /// scrolls when the cursor would leave it.
    pub fn apply(self, nav: Nav, len: usize) -> Self {
        let mut next = self;
        match nav {
            Nav::Up => {
                if next.cursor > 0 {
                    next.cursor -= 1;
                    if next.cursor < next.window_start {
                        next.window_start = next.cursor;
                    }
                }
            }
            Nav::Down => {
                if next.cursor + 1 < len {
                    next.cursor += 1;
                    if next.cursor >= next.window_start + PAGE_SIZE {
                        next.window_start = next.cursor + 1 - PAGE_SIZE;
                    }
                }
            }
        }
        next
    }

    /// One past the last visible index.
    pub fn window_end(&self, len: usize) -> usize {
        (self.window_start + PAGE_SIZE).min(len)
    }
}

impl Command {
    /// Map a key event to a command.
    ///
    /// Only key presses count; releases and unrelated keys yield `None`.
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(Command::Quit),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Up => Some(Command::Move(Nav::Up)),
            KeyCode::Down => Some(Command::Move(Nav::Down)),
            KeyCode::Enter | KeyCode::Char(' ') => Some(Command::Toggle),
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
            _ => None,
        }
    }
}

/// Application state for the TUI.
pub struct App {
    /// Playlist the document is saved under
    pub playlist_id: String,
    /// Details and episodes; `watched` flags change during the session
    pub data: PlaylistCache,
    /// Cursor and window
    pub view: ViewState,
    /// Running or terminated
    pub state: SessionState,
    /// Saves that failed during the session
    pub save_failures: Vec<String>,
}

impl App {
    /// Create a new App with the cursor on the first episode.
    pub fn new(playlist_id: impl Into<String>, data: PlaylistCache) -> Self {
        Self {
            playlist_id: playlist_id.into(),
            data,
            view: ViewState::default(),
            state: SessionState::Running,
            save_failures: Vec::new(),
        }
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.data.items
    }

    /// Handle keyboard input and return an action.
    pub fn handle_input(&mut self, key: KeyEvent) -> Action {
        match Command::from_key(key) {
            Some(command) => self.apply(command),
            None => Action::None,
        }
    }

    /// Apply a command to the session.
    pub fn apply(&mut self, command: Command) -> Action {
        if self.state == SessionState::Terminated {
            return Action::None;
        }

        match command {
            Command::Move(nav) => {
                self.view = self.view.apply(nav, self.data.items.len());
                Action::None
            }
            Command::Toggle => self.toggle_current(),
            Command::Quit => {
                self.state = SessionState::Terminated;
                Action::Quit
            }
        }
    }

    fn toggle_current(&mut self) -> Action {
        // Empty playlists have no episode under the cursor
        let Some(episode) = self.data.items.get_mut(self.view.cursor) else {
            return Action::None;
        };

        episode.watched = !episode.watched;
        Action::Save
    }

    /// Remember a failed save; it is reported once the session is over.
    ///
    /// Nothing is logged here since the terminal is in the alternate screen.
    pub fn record_save_failure(&mut self, err: AppError) {
        self.save_failures.push(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn app_with(count: usize) -> App {
        let items = (0..count)
            .map(|i| Episode {
                id: format!("v{}", i),
                title: format!("Video {}", i + 1),
                duration: 60,
                watched: false,
            })
            .collect();
        App::new(
            "PL",
            PlaylistCache {
                details: Value::Null,
                items,
            },
        )
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_up_at_top_is_noop() {
        let view = ViewState::default().apply(Nav::Up, 5);
        assert_eq!(view, ViewState::default());
    }

    #[test]
    fn test_down_at_bottom_is_noop() {
        let last = ViewState {
            cursor: 4,
            window_start: 0,
        };
        assert_eq!(last.apply(Nav::Down, 5), last);
    }

    #[test]
    fn test_window_follows_cursor_down() {
        let mut view = ViewState::default();
        for _ in 0..12 {
            view = view.apply(Nav::Down, 25);
        }
        assert_eq!(view.cursor, 12);
        assert_eq!(view.window_start, 3);
        assert_eq!(view.window_end(25), 13);
    }

    #[test]
    fn test_window_follows_cursor_up() {
        let mut view = ViewState {
            cursor: 12,
            window_start: 3,
        };
        for _ in 0..10 {
            view = view.apply(Nav::Up, 25);
        }
        assert_eq!(view.cursor, 2);
        assert_eq!(view.window_start, 2);
    }

    #[test]
    fn test_window_invariant_holds() {
        let mut view = ViewState::default();
        let moves = [Nav::Down; 30]
            .into_iter()
            .chain([Nav::Up; 17])
            .chain([Nav::Down; 5]);
        for nav in moves {
            view = view.apply(nav, 23);
            assert!(view.window_start <= view.cursor);
            assert!(view.cursor < view.window_start + PAGE_SIZE);
            assert!(view.cursor < 23);
        }
    }

    #[test]
    fn test_moves_on_empty_list() {
        let view = ViewState::default().apply(Nav::Down, 0).apply(Nav::Up, 0);
        assert_eq!(view, ViewState::default());
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(Command::from_key(press(KeyCode::Up)), Some(Command::Move(Nav::Up)));
        assert_eq!(
            Command::from_key(press(KeyCode::Down)),
            Some(Command::Move(Nav::Down))
        );
        assert_eq!(Command::from_key(press(KeyCode::Enter)), Some(Command::Toggle));
        assert_eq!(Command::from_key(press(KeyCode::Char(' '))), Some(Command::Toggle));
        assert_eq!(Command::from_key(press(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(Command::from_key(press(KeyCode::Char('x'))), None);
        assert_eq!(
            Command::from_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
    }

    #[test]
    fn test_key_release_ignored() {
        let mut key = press(KeyCode::Enter);
        key.kind = KeyEventKind::Release;
        assert_eq!(Command::from_key(key), None);
    }

    #[test]
    fn test_toggle_flips_only_cursor_episode() {
        let mut app = app_with(5);
        app.apply(Command::Move(Nav::Down));
        app.apply(Command::Move(Nav::Down));

        assert_eq!(app.apply(Command::Toggle), Action::Save);
        let watched: Vec<bool> = app.episodes().iter().map(|e| e.watched).collect();
        assert_eq!(watched, vec![false, false, true, false, false]);

        assert_eq!(app.apply(Command::Toggle), Action::Save);
        assert!(app.episodes().iter().all(|e| !e.watched));
    }

    #[test]
    fn test_toggle_on_empty_playlist() {
        let mut app = app_with(0);
        assert_eq!(app.apply(Command::Toggle), Action::None);
        assert_eq!(app.apply(Command::Move(Nav::Down)), Action::None);
        assert_eq!(app.view, ViewState::default());
    }

    #[test]
    fn test_quit_terminates() {
        let mut app = app_with(3);
        assert_eq!(app.handle_input(press(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(app.state, SessionState::Terminated);

        // nothing is reachable afterwards
        assert_eq!(app.handle_input(press(KeyCode::Enter)), Action::None);
        assert!(app.episodes().iter().all(|e| !e.watched));
    }

    #[test]
    fn test_record_save_failure() {
        let mut app = app_with(1);
        app.record_save_failure(AppError::Config("disk full".to_string()));
        assert_eq!(app.save_failures, vec!["Config error: disk full".to_string()]);
    }
}
