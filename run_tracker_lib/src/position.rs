use geo_types::{Coord, Point};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geo_util::haversine_distance;

/// A single GPS fix in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &Position) -> f64 {
        haversine_distance(self, other)
    }
}

// geo-types uses x = longitude, y = latitude.
impl From<Coord> for Position {
    fn from(coord: Coord) -> Self {
        Self::new(coord.y, coord.x)
    }
}

impl From<Position> for Coord {
    fn from(position: Position) -> Self {
        Coord {
            x: position.longitude,
            y: position.latitude,
        }
    }
}

impl From<Point> for Position {
    fn from(point: Point) -> Self {
        Self::from(point.0)
    }
}

impl From<Position> for Point {
    fn from(position: Position) -> Self {
        Point(position.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coord_axes_are_longitude_then_latitude() {
        let position = Position::new(56.15, 10.21);
        let coord: Coord = position.into();
        assert_eq!(coord.x, 10.21);
        assert_eq!(coord.y, 56.15);
        assert_eq!(Position::from(coord), position);
    }

    #[test]
    fn from_point() {
        let point = Point::new(12.5, -33.0);
        assert_eq!(Position::from(point), Position::new(-33.0, 12.5));
    }
}
