use std::{fmt, path::Path, str::FromStr, time::Duration};

use run_tracker_lib::{ResumePolicy, TrackerConfig};

use crate::TrackerError;

/// Settings for the tracker service and the replay binary.
///
/// Read from a plain `key = value` file, one setting per line, `#` starts a
/// comment line.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub tracker: TrackerConfig,
    /// Delay between replayed points that carry no timestamp.
    pub replay_interval: Duration,
    /// Timestamped points are replayed this many times faster than recorded.
    pub replay_speedup: f64,
    /// How often the replay binary prints the current snapshot.
    pub report_interval: Duration,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            replay_interval: Duration::from_millis(1000),
            replay_speedup: 1.0,
            report_interval: Duration::from_millis(1000),
        }
    }
}

impl Configuration {
    pub fn load(path: &Path) -> Result<Self, TrackerError> {
        let text = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded configuration from {:?}", path);
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, TrackerError> {
        let mut config = Self::default();

        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(TrackerError::Config(format!("line {}: expected 'key = value', got '{}'", number + 1, line)));
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "tick_period_ms" => config.tracker.tick_period = Duration::from_millis(parse_value(key, value)?),
                "ticks_per_second" => config.tracker.ticks_per_second = parse_value(key, value)?,
                "resume_policy" => config.tracker.resume_policy = value.parse::<ResumePolicy>()?,
                "replay_interval_ms" => config.replay_interval = Duration::from_millis(parse_value(key, value)?),
                "replay_speedup" => config.replay_speedup = parse_value(key, value)?,
                "report_interval_ms" => config.report_interval = Duration::from_millis(parse_value(key, value)?),
                _ => {
                    tracing::warn!("Unknown config key: {}", key);
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        self.tracker.validate()?;
        if !(self.replay_speedup.is_finite() && self.replay_speedup > 0.) {
            return Err(TrackerError::Config(format!("replay_speedup must be a positive number, got {}", self.replay_speedup)));
        }
        if self.report_interval.is_zero() {
            return Err(TrackerError::Config("report_interval_ms must be greater than zero".into()));
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, TrackerError> {
    value
        .parse()
        .map_err(|_| TrackerError::Config(format!("invalid value '{}' for {}", value, key)))
}

/// Writes the configuration back in the file format.
impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tick_period_ms = {}", self.tracker.tick_period.as_millis())?;
        writeln!(f, "ticks_per_second = {}", self.tracker.ticks_per_second)?;
        writeln!(f, "resume_policy = {}", self.tracker.resume_policy)?;
        writeln!(f, "replay_interval_ms = {}", self.replay_interval.as_millis())?;
        writeln!(f, "replay_speedup = {}", self.replay_speedup)?;
        writeln!(f, "report_interval_ms = {}", self.report_interval.as_millis())
    }
}
