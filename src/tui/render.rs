//! UI rendering functions for the TUI.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::duration::format_duration;
use crate::stats::WatchStats;
use crate::types::Episode;

use super::state::{App, ViewState};

const HELP: &str = "Use ↑/↓ to navigate, Enter/Space to toggle watched, Q to quit.";

/// Format one visible row.
fn row_line(index: usize, episode: &Episode, selected: bool) -> String {
    format!(
        "{} {:03}. {} {} ({})",
        if selected { '>' } else { ' ' },
        index + 1,
        if episode.watched { "[X]" } else { "[ ]" },
        episode.title,
        format_duration(episode.duration)
    )
}

/// Range summary shown under the rows.
fn range_line(view: &ViewState, len: usize) -> String {
    format!(
        "Showing {}–{} of {} episodes.",
        view.window_start + 1,
        view.window_end(len),
        len
    )
}

/// Render the visible window and the footer as plain text lines.
///
/// The first lines are the visible rows (at most one page), followed by a
/// blank line, the range summary, another blank line and the watch stats.
/// An empty playlist renders a notice instead of rows and range.
pub fn render_lines(episodes: &[Episode], view: &ViewState) -> Vec<String> {
    let mut lines = Vec::new();

    if episodes.is_empty() {
        lines.push("No episodes in this playlist.".to_string());
    } else {
        let end = view.window_end(episodes.len());
        for (i, episode) in episodes.iter().enumerate().take(end).skip(view.window_start) {
            lines.push(row_line(i, episode, i == view.cursor));
        }
        lines.push(String::new());
        lines.push(range_line(view, episodes.len()));
    }

    lines.push(String::new());
    lines.push(WatchStats::compute(episodes).message());
    lines
}

/// Draw the UI.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Help
            Constraint::Min(0),    // List and footer
        ])
        .split(frame.area());

    draw_help(frame, chunks[0]);
    draw_list(frame, app, chunks[1]);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(HELP)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, area);
}

fn draw_list(frame: &mut Frame, app: &App, area: Rect) {
    let episodes = app.episodes();
    let visible = if episodes.is_empty() {
        0
    } else {
        app.view.window_end(episodes.len()) - app.view.window_start
    };
    let cursor_row = app.view.cursor.checked_sub(app.view.window_start);

    let lines: Vec<Line> = render_lines(episodes, &app.view)
        .into_iter()
        .enumerate()
        .map(|(row, text)| {
            if row >= visible {
                return Line::from(text);
            }

            let episode = &episodes[app.view.window_start + row];
            let mut style = if episode.watched {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            if Some(row) == cursor_row {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
            }
            Line::from(Span::styled(text, style))
        })
        .collect();

    let title = app
        .data
        .title()
        .map(str::to_string)
        .unwrap_or_else(|| app.playlist_id.clone());

    let list = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(list, area);
}
