use std::{fmt, str::FromStr, time::Duration};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(79);
pub const DEFAULT_TICKS_PER_SECOND: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("tick period must be greater than zero")]
    ZeroTickPeriod,
    #[error("ticks per second must be greater than zero")]
    ZeroTicksPerSecond,
    #[error("unknown resume policy '{0}', expected 'continue' or 'rebaseline'")]
    UnknownResumePolicy(String),
}

/// What the first position after resuming from a pause counts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ResumePolicy {
    /// The distance from the last position before the pause is counted.
    #[default]
    Continue,
    /// The first position after the pause is a new baseline and adds no distance.
    Rebaseline,
}

impl FromStr for ResumePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continue" => Ok(ResumePolicy::Continue),
            "rebaseline" => Ok(ResumePolicy::Rebaseline),
            _ => Err(ConfigError::UnknownResumePolicy(s.to_string())),
        }
    }
}

impl fmt::Display for ResumePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResumePolicy::Continue => write!(f, "continue"),
            ResumePolicy::Rebaseline => write!(f, "rebaseline"),
        }
    }
}

/// Timing and resume behaviour of a [`SessionTracker`](crate::SessionTracker).
///
/// The tick period only matters to whoever drives `tick()`. The tracker itself
/// counts ticks and rolls them into whole seconds every `ticks_per_second`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackerConfig {
    pub tick_period: Duration,
    pub ticks_per_second: u32,
    pub resume_policy: ResumePolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            resume_policy: ResumePolicy::default(),
        }
    }
}

impl TrackerConfig {
    pub fn new(tick_period: Duration, ticks_per_second: u32) -> Result<Self, ConfigError> {
        let config = Self {
            tick_period,
            ticks_per_second,
            resume_policy: ResumePolicy::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_resume_policy(mut self, resume_policy: ResumePolicy) -> Self {
        self.resume_policy = resume_policy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period.is_zero() {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if self.ticks_per_second == 0 {
            return Err(ConfigError::ZeroTicksPerSecond);
        }
        Ok(())
    }
}
