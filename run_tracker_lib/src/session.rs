use std::fmt;

use geo_types::LineString;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{elapsed_time::ElapsedTime, position::Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SessionState {
    /// Never started, or just reset.
    #[default]
    Idle,
    /// Accepting positions and advancing time.
    Active,
    /// Time and path frozen, prior data kept.
    Paused,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Active => write!(f, "active"),
            SessionState::Paused => write!(f, "paused"),
        }
    }
}

/// A consistent copy of a session, owned by the caller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub path: Vec<Position>,
    pub total_distance_meters: f64,
    pub elapsed: ElapsedTime,
    pub average_speed_mps: f64,
    /// Latest accepted position, the point the map follows.
    pub last_position: Option<Position>,
}

impl SessionSnapshot {
    /// The snapshot of a session that has not recorded anything.
    pub fn empty(ticks_per_second: u32) -> Self {
        Self {
            state: SessionState::Idle,
            path: Vec::new(),
            total_distance_meters: 0.,
            elapsed: ElapsedTime::new(ticks_per_second),
            average_speed_mps: 0.,
            last_position: None,
        }
    }

    pub fn distance_whole_meters(&self) -> u64 {
        self.total_distance_meters.floor() as u64
    }

    pub fn formatted_speed(&self) -> String {
        format!("{:.2} m/s", self.average_speed_mps)
    }

    /// The path as a line for a map overlay.
    pub fn polyline(&self) -> LineString {
        self.path.iter().copied().map(geo_types::Coord::from).collect()
    }
}

impl fmt::Display for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] Distance: {} m | Time: {} | Avg Speed: {}",
            self.state,
            self.distance_whole_meters(),
            self.elapsed,
            self.formatted_speed()
        )
    }
}
