pub mod config;
pub mod elapsed_time;
pub mod geo_util;
pub mod position;
pub mod session;
pub mod session_tracker;

pub use config::{ConfigError, ResumePolicy, TrackerConfig};
pub use elapsed_time::ElapsedTime;
pub use position::Position;
pub use session::{SessionSnapshot, SessionState};
pub use session_tracker::SessionTracker;
