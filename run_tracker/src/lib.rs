pub mod config;
pub mod gpx_util;
pub mod location;
pub mod tracker_service;

pub use config::Configuration;
pub use tracker_service::{TrackerHandle, TrackerService};

/// Capacity of the command queue in front of the tracker task.
pub const COMMAND_QUEUE_SIZE: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid tracker configuration: {0}")]
    Tracker(#[from] run_tracker_lib::ConfigError),
    #[error("failed to read GPX data: {0}")]
    Gpx(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("tracker service has stopped")]
    ServiceStopped,
}
