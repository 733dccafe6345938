use std::fmt;
use std::time::Duration;

pub const DEFAULT_SHORT_DELAY: u32 = 5;
pub const DEFAULT_LONG_DELAY: u32 = 30;
pub const DEFAULT_DISTANCE: u32 = 5;

pub const MIN_SHORT_DELAY: u32 = 1;
pub const MAX_SHORT_DELAY: u32 = 3600;
pub const MIN_LONG_DELAY: u32 = 0;
pub const MAX_LONG_DELAY: u32 = 7200;
pub const MIN_DISTANCE: u32 = 1;
pub const MAX_DISTANCE: u32 = 100;

/// Movement settings, fixed for the lifetime of the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    short_delay: u32,
    long_delay: u32,
    distance: u32,
}

impl Config {
    /// Validates each value against its range, then `short_delay <= long_delay`.
    pub fn new(short_delay: u32, long_delay: u32, distance: u32) -> Result<Self, ConfigError> {
        if !(MIN_SHORT_DELAY..=MAX_SHORT_DELAY).contains(&short_delay) {
            return Err(ConfigError::ShortDelayOutOfRange(short_delay));
        }
        if !(MIN_LONG_DELAY..=MAX_LONG_DELAY).contains(&long_delay) {
            return Err(ConfigError::LongDelayOutOfRange(long_delay));
        }
        if !(MIN_DISTANCE..=MAX_DISTANCE).contains(&distance) {
            return Err(ConfigError::DistanceOutOfRange(distance));
        }
        if short_delay > long_delay {
            return Err(ConfigError::ShortExceedsLong {
                short_delay,
                long_delay,
            });
        }
        Ok(Self {
            short_delay,
            long_delay,
            distance,
        })
    }

    pub fn short_delay(&self) -> u32 {
        self.short_delay
    }

    pub fn long_delay(&self) -> u32 {
        self.long_delay
    }

    pub fn distance(&self) -> u32 {
        self.distance
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.short_delay))
    }

    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs(u64::from(self.long_delay))
    }

    /// Status text for tooltips and `status` output.
    pub fn status_line(&self, paused: bool) -> String {
        let state = if paused { "Paused" } else { "Active" };
        format!(
            "{} (Move: {}s, Wait: {}s)",
            state, self.short_delay, self.long_delay
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            short_delay: DEFAULT_SHORT_DELAY,
            long_delay: DEFAULT_LONG_DELAY,
            distance: DEFAULT_DISTANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ShortDelayOutOfRange(u32),
    LongDelayOutOfRange(u32),
    DistanceOutOfRange(u32),
    ShortExceedsLong { short_delay: u32, long_delay: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortDelayOutOfRange(value) => write!(
                f,
                "Short-delay must be between {} and {} seconds (got {})",
                MIN_SHORT_DELAY, MAX_SHORT_DELAY, value
            ),
            Self::LongDelayOutOfRange(value) => write!(
                f,
                "Long-delay must be between {} and {} seconds (got {})",
                MIN_LONG_DELAY, MAX_LONG_DELAY, value
            ),
            Self::DistanceOutOfRange(value) => write!(
                f,
                "Distance must be between {} and {} pixels (got {})",
                MIN_DISTANCE, MAX_DISTANCE, value
            ),
            Self::ShortExceedsLong {
                short_delay,
                long_delay,
            } => write!(
                f,
                "Short delay must be less than or equal to long delay ({}s > {}s)",
                short_delay, long_delay
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
