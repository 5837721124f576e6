use std::{fmt, time::Duration};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_TICKS_PER_SECOND;

/// Elapsed session time, counted in ticks.
///
/// Ticks roll into whole seconds every `ticks_per_second`. Sub-second ticks are
/// not displayed, they only decide when a second is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElapsedTime {
    ticks: u64,
    ticks_per_second: u32,
}

impl Default for ElapsedTime {
    fn default() -> Self {
        Self::new(DEFAULT_TICKS_PER_SECOND)
    }
}

impl ElapsedTime {
    /// `ticks_per_second` of zero is treated as one.
    pub fn new(ticks_per_second: u32) -> Self {
        Self {
            ticks: 0,
            ticks_per_second: ticks_per_second.max(1),
        }
    }

    /// Advances by one tick. Returns true if the tick completed a whole second.
    pub(crate) fn advance(&mut self) -> bool {
        self.ticks += 1;
        self.ticks % self.ticks_per_second as u64 == 0
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }

    pub fn is_zero(&self) -> bool {
        self.ticks == 0
    }

    pub fn whole_seconds(&self) -> u64 {
        self.ticks / self.ticks_per_second as u64
    }

    pub fn hours(&self) -> u64 {
        self.whole_seconds() / 3600
    }

    pub fn minutes(&self) -> u64 {
        self.whole_seconds() / 60 % 60
    }

    pub fn seconds(&self) -> u64 {
        self.whole_seconds() % 60
    }

    pub fn as_duration(&self) -> Duration {
        let sub_second_ticks = (self.ticks % self.ticks_per_second as u64) as u32;
        Duration::from_secs(self.whole_seconds())
            + Duration::from_secs(1) * sub_second_ticks / self.ticks_per_second
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m {}s", self.hours(), self.minutes(), self.seconds())
    }
}
