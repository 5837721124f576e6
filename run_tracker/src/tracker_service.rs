use run_tracker_lib::{Position, SessionSnapshot, SessionTracker, TrackerConfig};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::{Instant, Interval, MissedTickBehavior},
};

use crate::{TrackerError, COMMAND_QUEUE_SIZE};

enum TrackerCommand {
    Start,
    Pause,
    Reset,
    Position(Position),
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Shutdown,
}

/// The task that owns the [`SessionTracker`].
///
/// User commands, location updates and timer ticks all reach the tracker
/// through this task's loop, so no two mutations ever overlap and every
/// snapshot is taken between mutations. The timer only exists while the
/// session is active.
pub struct TrackerService {
    tracker: SessionTracker,
    commands: mpsc::Receiver<TrackerCommand>,
    updates: watch::Sender<SessionSnapshot>,
    ticker: Option<Interval>,
}

impl TrackerService {
    /// Spawns the tracker task. The join handle resolves to the final snapshot
    /// once the task stops, either through [`TrackerHandle::shutdown`] or when
    /// every handle has been dropped.
    pub fn spawn(config: TrackerConfig) -> Result<(TrackerHandle, JoinHandle<SessionSnapshot>), TrackerError> {
        let tracker = SessionTracker::new(config)?;
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_SIZE);
        let (update_tx, update_rx) = watch::channel(tracker.snapshot());

        let service = TrackerService {
            tracker,
            commands: command_rx,
            updates: update_tx,
            ticker: None,
        };
        let task = tokio::spawn(service.run());

        let handle = TrackerHandle {
            commands: command_tx,
            updates: update_rx,
        };

        Ok((handle, task))
    }

    async fn run(mut self) -> SessionSnapshot {
        tracing::info!("Tracker service started");

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        tracing::debug!("All tracker handles dropped");
                        break;
                    };
                    if !self.handle(command) {
                        break;
                    }
                }
                _ = next_tick(&mut self.ticker) => {
                    self.tracker.tick();
                    self.publish();
                }
            }
        }

        tracing::info!("Tracker service stopped");
        self.tracker.snapshot()
    }

    /// Returns false when the service should stop.
    fn handle(&mut self, command: TrackerCommand) -> bool {
        match command {
            TrackerCommand::Start => {
                self.tracker.start();
                self.sync_ticker();
                self.publish();
            }
            TrackerCommand::Pause => {
                self.tracker.pause();
                self.sync_ticker();
                self.publish();
            }
            TrackerCommand::Reset => {
                self.tracker.reset();
                self.sync_ticker();
                self.publish();
            }
            TrackerCommand::Position(position) => {
                if self.tracker.ingest_position(position) {
                    self.publish();
                }
            }
            TrackerCommand::Snapshot(reply) => {
                // The requester may have given up waiting.
                let _ = reply.send(self.tracker.snapshot());
            }
            TrackerCommand::Shutdown => return false,
        }
        true
    }

    fn sync_ticker(&mut self) {
        match (self.tracker.is_active(), self.ticker.is_some()) {
            (true, false) => {
                let period = self.tracker.config().tick_period;
                let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
                self.ticker = Some(ticker);
                tracing::debug!("Timer armed, period {:?}", period);
            }
            (false, true) => {
                self.ticker = None;
                tracing::debug!("Timer stopped");
            }
            _ => {}
        }
    }

    fn publish(&self) {
        self.updates.send_replace(self.tracker.snapshot());
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Cloneable front end of a running [`TrackerService`].
#[derive(Clone)]
pub struct TrackerHandle {
    commands: mpsc::Sender<TrackerCommand>,
    updates: watch::Receiver<SessionSnapshot>,
}

impl TrackerHandle {
    pub async fn start(&self) -> Result<(), TrackerError> {
        self.send(TrackerCommand::Start).await
    }

    pub async fn pause(&self) -> Result<(), TrackerError> {
        self.send(TrackerCommand::Pause).await
    }

    pub async fn reset(&self) -> Result<(), TrackerError> {
        self.send(TrackerCommand::Reset).await
    }

    /// Entry point for location providers. Positions sent while the session
    /// is not active are dropped by the tracker.
    pub async fn ingest_position(&self, position: Position) -> Result<(), TrackerError> {
        self.send(TrackerCommand::Position(position)).await
    }

    /// Snapshot taken after every command sent before this call.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, TrackerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(TrackerCommand::Snapshot(reply_tx)).await?;
        reply_rx.await.map_err(|_| TrackerError::ServiceStopped)
    }

    /// Receiver that sees a fresh snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.clone()
    }

    pub async fn shutdown(&self) -> Result<(), TrackerError> {
        self.send(TrackerCommand::Shutdown).await
    }

    async fn send(&self, command: TrackerCommand) -> Result<(), TrackerError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| TrackerError::ServiceStopped)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use run_tracker_lib::SessionState;

    use super::*;

    const TICK: Duration = Duration::from_millis(79);

    fn spawn_default() -> (TrackerHandle, JoinHandle<SessionSnapshot>) {
        TrackerService::spawn(TrackerConfig::default()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn timer_runs_only_while_active() {
        let (handle, _task) = spawn_default();

        tokio::time::sleep(TICK * 20).await;
        assert!(handle.snapshot().await.unwrap().elapsed.is_zero());

        handle.start().await.unwrap();
        tokio::time::sleep(TICK * 10 + TICK / 2).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.elapsed.ticks(), 10);
        assert_eq!(snapshot.elapsed.whole_seconds(), 1);

        handle.pause().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.state, SessionState::Paused);
        assert_eq!(snapshot.elapsed.ticks(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn positions_accumulate_and_speed_follows_seconds() {
        let (handle, _task) = spawn_default();
        handle.start().await.unwrap();
        handle.ingest_position(Position::new(0., 0.)).await.unwrap();
        handle.ingest_position(Position::new(0.0001, 0.0001)).await.unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert!((snapshot.total_distance_meters - 15.725).abs() < 0.01);
        assert_eq!(snapshot.average_speed_mps, 0.);

        tokio::time::sleep(TICK * 10 + TICK / 2).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.average_speed_mps, snapshot.total_distance_meters);
    }

    #[tokio::test(start_paused = true)]
    async fn positions_are_dropped_unless_active() {
        let (handle, _task) = spawn_default();
        handle.ingest_position(Position::new(1., 1.)).await.unwrap();
        assert!(handle.snapshot().await.unwrap().path.is_empty());

        handle.start().await.unwrap();
        handle.pause().await.unwrap();
        handle.ingest_position(Position::new(1., 1.)).await.unwrap();
        assert!(handle.snapshot().await.unwrap().path.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_and_stops_timer() {
        let (handle, _task) = spawn_default();
        handle.start().await.unwrap();
        handle.ingest_position(Position::new(0., 0.)).await.unwrap();
        handle.ingest_position(Position::new(0., 0.01)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;

        handle.reset().await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(handle.snapshot().await.unwrap(), SessionSnapshot::empty(10));
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_changes() {
        let (handle, _task) = spawn_default();
        let mut updates = handle.subscribe();
        assert_eq!(updates.borrow_and_update().state, SessionState::Idle);

        handle.start().await.unwrap();
        updates.changed().await.unwrap();
        assert_eq!(updates.borrow_and_update().state, SessionState::Active);

        handle.ingest_position(Position::new(3., 3.)).await.unwrap();
        let snapshot = updates
            .wait_for(|snapshot| !snapshot.path.is_empty())
            .await
            .unwrap()
            .clone();
        assert_eq!(snapshot.last_position, Some(Position::new(3., 3.)));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_returns_final_snapshot() {
        let (handle, task) = spawn_default();
        handle.start().await.unwrap();
        handle.ingest_position(Position::new(0., 0.)).await.unwrap();
        handle.shutdown().await.unwrap();

        let last = task.await.unwrap();
        assert_eq!(last.state, SessionState::Active);
        assert_eq!(last.path.len(), 1);

        assert!(matches!(handle.start().await, Err(TrackerError::ServiceStopped)));
        assert!(matches!(handle.snapshot().await, Err(TrackerError::ServiceStopped)));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_handles_are_dropped() {
        let (handle, task) = spawn_default();
        drop(handle);
        let last = task.await.unwrap();
        assert_eq!(last, SessionSnapshot::empty(10));
    }

    #[test]
    fn rejects_invalid_config() {
        let config = TrackerConfig {
            tick_period: Duration::ZERO,
            ..TrackerConfig::default()
        };
        assert!(matches!(TrackerService::spawn(config), Err(TrackerError::Tracker(_))));
    }
}
