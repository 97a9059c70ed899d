//! TUI type definitions for session state, commands, and actions.

/// Number of episodes visible at once.
pub const PAGE_SIZE: usize = 10;

/// Lifecycle of the interactive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting key presses
    Running,
    /// Quit was requested; no further input is handled
    Terminated,
}

/// Cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Up,
    Down,
}

/// A key press after it has been mapped to a meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Move the cursor
    Move(Nav),
    /// Flip the watched flag of the episode under the cursor
    Toggle,
    /// Leave the session
    Quit,
}

/// Side effects the run loop has to perform after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing beyond a redraw
    None,
    /// Persist the full playlist document
    Save,
    /// Tear down the terminal and exit
    Quit,
}
