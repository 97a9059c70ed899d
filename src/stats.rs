//! Watched-time statistics for a playlist.

use crate::duration::format_duration;
use crate::types::Episode;

/// Totals derived from an episode list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchStats {
    /// Sum of durations of watched episodes, in seconds.
    pub watched_seconds: u64,
    /// Sum of all durations, in seconds.
    pub total_seconds: u64,
    /// Watched share as a percentage with two decimals, or `"0"` when the
    /// playlist has no duration at all.
    pub percentage: String,
}

impl WatchStats {
    /// Compute the totals in a single pass over `episodes`.
    pub fn compute(episodes: &[Episode]) -> Self {
        let (watched_seconds, total_seconds) =
            episodes.iter().fold((0u64, 0u64), |(watched, total), ep| {
                let watched = if ep.watched {
                    watched.saturating_add(ep.duration)
                } else {
                    watched
                };
                (watched, total.saturating_add(ep.duration))
            });

        let percentage = if total_seconds == 0 {
            "0".to_string()
        } else {
            format!("{:.2}", watched_seconds as f64 / total_seconds as f64 * 100.0)
        };

        Self {
            watched_seconds,
            total_seconds,
            percentage,
        }
    }

    /// The one-line summary shown under the list.
    pub fn message(&self) -> String {
        format!(
            "You watched {} out of {} ({}%)",
            format_duration(self.watched_seconds),
            format_duration(self.total_seconds),
            self.percentage
        )
    }
}
