use std::{fs::File, io::{BufReader, Read}, path::Path, str::FromStr};

use chrono::{DateTime, Utc};
use gpx::Waypoint;
use run_tracker_lib::Position;

use crate::TrackerError;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub position: Position,
    pub timestamp: Option<DateTime<Utc>>,
}

impl TrackPoint {
    pub fn new(position: Position, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            position,
            timestamp,
        }
    }
}

/// A recorded track, flattened to a single sequence of points.
#[derive(Debug, Clone, PartialEq)]
pub struct GpxTrack {
    pub title: String,
    pub points: Vec<TrackPoint>,
}

pub fn read_gpx(path: &Path) -> Result<GpxTrack, TrackerError> {
    let file = File::open(path)?;
    read_gpx_from(BufReader::new(file))
}

/// Reads every track segment point, followed by every route point.
pub fn read_gpx_from<R: Read>(reader: R) -> Result<GpxTrack, TrackerError> {
    let gpx = gpx::read(reader).map_err(|err| TrackerError::Gpx(err.to_string()))?;

    let title = gpx.metadata.as_ref()
        .and_then(|meta| meta.name.clone())
        .or_else(|| gpx.tracks.iter().find_map(|track| track.name.clone()))
        .unwrap_or_else(|| "Unnamed".to_string());

    let mut points = Vec::new();
    for track in &gpx.tracks {
        for segment in &track.segments {
            for waypoint in &segment.points {
                points.push(to_track_point(waypoint)?);
            }
        }
    }
    for route in &gpx.routes {
        for waypoint in &route.points {
            points.push(to_track_point(waypoint)?);
        }
    }

    tracing::debug!("Read {} points from GPX track '{}'", points.len(), title);

    Ok(GpxTrack { title, points })
}

fn to_track_point(waypoint: &Waypoint) -> Result<TrackPoint, TrackerError> {
    let timestamp = match &waypoint.time {
        Some(time) => {
            let formatted = time.format().map_err(|err| TrackerError::Gpx(err.to_string()))?;
            let timestamp = DateTime::from_str(&formatted)
                .map_err(|err| TrackerError::Gpx(format!("invalid timestamp '{}': {}", formatted, err)))?;
            Some(timestamp)
        }
        None => None,
    };

    Ok(TrackPoint::new(waypoint.point().into(), timestamp))
}
