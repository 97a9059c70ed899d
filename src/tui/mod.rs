//! Terminal User Interface for playlist-watcher using ratatui.
//!
//! This module provides the single-screen episode list: cursor movement,
//! toggling watched state, and saving after every toggle.

mod render;
mod state;
mod types;

pub use render::{draw, render_lines};
pub use state::{App, ViewState};
pub use types::{Action, Command, Nav, PAGE_SIZE, SessionState};

use crate::cache::PlaylistStore;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::{self, Stdout, stdout};
use std::time::Duration;

/// Poll for keyboard events with a timeout.
pub fn poll_event(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Owns raw mode and the alternate screen while the session runs.
///
/// The terminal is restored on drop as well, so an early return or a panic
/// does not leave the shell in raw mode.
pub struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl TerminalGuard {
    /// Initialize the terminal for TUI rendering.
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = execute!(stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        Ok(Self {
            terminal,
            active: true,
        })
    }

    pub fn terminal(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }

    /// Restore the terminal to its original state.
    pub fn restore(mut self) -> io::Result<()> {
        self.active = false;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = disable_raw_mode();
            let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
            let _ = self.terminal.show_cursor();
        }
    }
}

/// Run the interactive list until the user quits.
///
/// `next_event` is polled for input; `None` means no input arrived and the
/// screen is simply redrawn. Every toggle saves the whole document through
/// `store`. Save failures are collected on the app rather than interrupting
/// the session.
pub fn run_session<B, E>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    store: &dyn PlaylistStore,
    mut next_event: E,
) -> io::Result<()>
where
    B: Backend,
    E: FnMut() -> io::Result<Option<Event>>,
{
    loop {
        terminal.draw(|f| draw(f, app))?;

        let Some(Event::Key(key)) = next_event()? else {
            continue;
        };

        match app.handle_input(key) {
            Action::Quit => break,
            Action::Save => {
                if let Err(e) = store.save(&app.playlist_id, &app.data) {
                    app.record_save_failure(e);
                }
            }
            Action::None => {}
        }
    }

    terminal.clear()?;
    Ok(())
}
