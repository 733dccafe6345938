use serde::{Deserialize, Serialize};

/// Snapshot of the daemon's run state and configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub paused: bool,
    /// Seconds between ticks.
    pub short_delay: u32,
    /// Seconds of stillness required before moving.
    pub long_delay: u32,
    /// Pixels per movement.
    pub distance: u32,
    /// Human readable form, e.g. `Active (Move: 5s, Wait: 30s)`.
    pub summary: String,
}

impl StatusInfo {
    /// Text shown next to the application name in a tooltip.
    pub fn tooltip(&self) -> String {
        format!("Mouse Mover - {}", self.summary)
    }
}
