use std::time::{Duration, Instant};

use super::CursorPosition;

/// Outcome of one activity sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The pointer moved since the previous sample.
    Active,
    /// The pointer is still, but not for long enough yet.
    IdleBelowThreshold,
    /// The pointer has been still for at least the idle threshold.
    IdleReady,
}

/// Tracks pointer motion between samples and how long it has been still.
///
/// Motion is edge-triggered: a changed position yields `Active` once, and the
/// idle window is measured from that sample, not from process start.
#[derive(Debug, Clone)]
pub struct ActivityTracker {
    idle_threshold: Duration,
    last_known_position: Option<CursorPosition>,
    last_activity: Instant,
    user_recently_active: bool,
}

impl ActivityTracker {
    pub fn new(idle_threshold: Duration, now: Instant) -> Self {
        Self {
            idle_threshold,
            last_known_position: None,
            last_activity: now,
            user_recently_active: false,
        }
    }

    pub fn sample(&mut self, now: Instant, position: CursorPosition) -> Decision {
        if self.last_known_position != Some(position) {
            self.last_known_position = Some(position);
            self.last_activity = now;
            self.user_recently_active = true;
            return Decision::Active;
        }

        if self.user_recently_active {
            if now.saturating_duration_since(self.last_activity) < self.idle_threshold {
                return Decision::IdleBelowThreshold;
            }
            self.user_recently_active = false;
        }

        Decision::IdleReady
    }

    /// Adopts the pointer position after a synthetic movement so the next
    /// sample does not mistake it for the user.
    pub fn rebase(&mut self, position: CursorPosition) {
        self.last_known_position = Some(position);
    }

    #[cfg(test)]
    pub fn last_known_position(&self) -> Option<CursorPosition> {
        self.last_known_position
    }

    #[cfg(test)]
    pub fn user_recently_active(&self) -> bool {
        self.user_recently_active
    }
}
