use std::time::Instant;

use crate::core::{CursorPosition, Displacement, ScreenBounds};

/// Trait for reading and injecting pointer movement.
/// This abstraction allows mocking in tests.
pub trait CursorPort {
    fn position(&self) -> Result<CursorPosition, String>;
    /// Best effort: callers do not retry on failure.
    fn move_by(&self, displacement: Displacement) -> Result<(), String>;
    /// Read fresh on every call so resolution changes are picked up.
    fn screen_bounds(&self) -> Result<ScreenBounds, String>;
}

/// Monotonic time source for the scheduler.
pub trait Clock {
    fn now(&self) -> Instant;
}

pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self
    }
}

#[cfg(target_os = "macos")]
pub type SystemCursor = crate::macos::MacOSCursor;

/// Cursor port for the current platform.
#[cfg(target_os = "macos")]
pub fn system_cursor() -> anyhow::Result<SystemCursor> {
    Ok(crate::macos::MacOSCursor::default())
}

#[cfg(not(target_os = "macos"))]
pub type SystemCursor = UnsupportedCursor;

#[cfg(not(target_os = "macos"))]
pub fn system_cursor() -> anyhow::Result<SystemCursor> {
    anyhow::bail!(
        "Pointer injection is not supported on {}",
        std::env::consts::OS
    )
}

/// Placeholder port for targets without an injection backend.
#[cfg(not(target_os = "macos"))]
pub struct UnsupportedCursor;

#[cfg(not(target_os = "macos"))]
impl CursorPort for UnsupportedCursor {
    fn position(&self) -> Result<CursorPosition, String> {
        Err("unsupported platform".to_string())
    }

    fn move_by(&self, _displacement: Displacement) -> Result<(), String> {
        Err("unsupported platform".to_string())
    }

    fn screen_bounds(&self) -> Result<ScreenBounds, String> {
        Err("unsupported platform".to_string())
    }
}
