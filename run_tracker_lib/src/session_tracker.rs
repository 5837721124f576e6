use crate::{
    config::{ConfigError, ResumePolicy, TrackerConfig},
    elapsed_time::ElapsedTime,
    geo_util::haversine_distance,
    position::Position,
    session::{SessionSnapshot, SessionState},
};

/// Owns every field of a tracking session and only changes them through its
/// operations.
///
/// ```text
/// Idle   --start()--> Active
/// Active --pause()--> Paused
/// Paused --start()--> Active
/// any    --reset()--> Idle
/// ```
#[derive(Debug, Clone)]
pub struct SessionTracker {
    config: TrackerConfig,
    state: SessionState,
    path: Vec<Position>,
    /// Point the next distance is measured from. `None` means the next
    /// position is a baseline.
    anchor: Option<Position>,
    total_distance_meters: f64,
    elapsed: ElapsedTime,
    average_speed_mps: f64,
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::with_valid_config(TrackerConfig::default())
    }
}

impl SessionTracker {
    pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: TrackerConfig) -> Self {
        let elapsed = ElapsedTime::new(config.ticks_per_second);
        Self {
            config,
            state: SessionState::Idle,
            path: Vec::new(),
            anchor: None,
            total_distance_meters: 0.,
            elapsed,
            average_speed_mps: 0.,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn start(&mut self) {
        match self.state {
            SessionState::Active => return,
            SessionState::Idle => {
                self.anchor = None;
            }
            SessionState::Paused => {
                if self.config.resume_policy == ResumePolicy::Rebaseline {
                    self.anchor = None;
                }
            }
        }
        tracing::debug!("Session {} -> active", self.state);
        self.state = SessionState::Active;
    }

    pub fn pause(&mut self) {
        if self.state != SessionState::Active {
            return;
        }
        tracing::debug!("Session paused at {}", self.elapsed);
        self.state = SessionState::Paused;
    }

    pub fn reset(&mut self) {
        tracing::debug!("Session {} -> idle, reset", self.state);
        *self = Self::with_valid_config(self.config.clone());
    }

    /// Records a position if the session is active. Returns whether it was
    /// accepted.
    pub fn ingest_position(&mut self, position: Position) -> bool {
        if self.state != SessionState::Active {
            tracing::trace!("Ignoring position while {}", self.state);
            return false;
        }

        if let Some(anchor) = self.anchor {
            self.total_distance_meters += haversine_distance(&anchor, &position);
        }
        self.path.push(position);
        self.anchor = Some(position);
        true
    }

    /// Advances elapsed time by one tick if the session is active. Average
    /// speed is recomputed whenever the tick completes a whole second.
    pub fn tick(&mut self) {
        if self.state != SessionState::Active {
            return;
        }
        if self.elapsed.advance() {
            self.recompute_speed();
        }
    }

    fn recompute_speed(&mut self) {
        let seconds = self.elapsed.whole_seconds();
        self.average_speed_mps = if seconds == 0 {
            0.
        } else {
            self.total_distance_meters / seconds as f64
        };
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            path: self.path.clone(),
            total_distance_meters: self.total_distance_meters,
            elapsed: self.elapsed,
            average_speed_mps: self.average_speed_mps,
            last_position: self.path.last().copied(),
        }
    }
}
