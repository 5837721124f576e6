use std::time::Duration;

use chrono::{DateTime, Utc};
use run_tracker_lib::Position;

use crate::{gpx_util::TrackPoint, TrackerError, TrackerHandle};

/// A source of position updates, emitting at its own cadence.
#[async_trait::async_trait]
pub trait LocationProvider: Send {
    /// Waits for the next fix. `None` once the provider has no more fixes.
    async fn next_position(&mut self) -> Option<Position>;
}

/// Forwards every position from `provider` to the tracker until the provider
/// runs dry. Returns the number of positions forwarded.
pub async fn pump<P>(provider: &mut P, handle: &TrackerHandle) -> Result<usize, TrackerError>
where
    P: LocationProvider + ?Sized,
{
    let mut forwarded = 0;
    while let Some(position) = provider.next_position().await {
        handle.ingest_position(position).await?;
        forwarded += 1;
    }
    tracing::info!("Location provider finished after {} positions", forwarded);
    Ok(forwarded)
}

/// Replays a recorded track as if the fixes were arriving live.
///
/// Consecutive timestamped points are spaced by their recorded gap divided by
/// `speedup`. Where either timestamp is missing, `fallback_interval` is used.
/// The first point is emitted immediately.
pub struct GpxReplay {
    points: std::vec::IntoIter<TrackPoint>,
    previous_timestamp: Option<DateTime<Utc>>,
    fallback_interval: Duration,
    speedup: f64,
    started: bool,
}

impl GpxReplay {
    pub fn new(points: Vec<TrackPoint>, fallback_interval: Duration, speedup: f64) -> Result<Self, TrackerError> {
        if !(speedup.is_finite() && speedup > 0.) {
            return Err(TrackerError::Config(format!("replay speedup must be a positive number, got {}", speedup)));
        }

        Ok(Self {
            points: points.into_iter(),
            previous_timestamp: None,
            fallback_interval,
            speedup,
            started: false,
        })
    }

    pub fn remaining(&self) -> usize {
        self.points.len()
    }

    fn delay_before(&self, point: &TrackPoint) -> Duration {
        if !self.started {
            return Duration::ZERO;
        }
        match (self.previous_timestamp, point.timestamp) {
            (Some(previous), Some(current)) => {
                // Out of order timestamps replay without delay.
                let gap = (current - previous).to_std().unwrap_or(Duration::ZERO);
                gap.div_f64(self.speedup)
            }
            _ => self.fallback_interval,
        }
    }
}

#[async_trait::async_trait]
impl LocationProvider for GpxReplay {
    async fn next_position(&mut self) -> Option<Position> {
        let point = self.points.next()?;

        let delay = self.delay_before(&point);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.started = true;
        self.previous_timestamp = point.timestamp;
        Some(point.position)
    }
}
