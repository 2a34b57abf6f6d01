//! Station position.

use std::fmt;

// Coordinates stored as integers count units of 1e-5 degrees.
const FIXED_SCALE: f64 = 100_000.0;

/// Latitude and longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coords {
    /// Latitude, north positive.
    pub lat: f64,
    /// Longitude, east positive.
    pub lon: f64,
}

impl Coords {
    /// Coordinates from their integer form, in 1e-5 degrees.
    pub fn from_fixed(lat: i64, lon: i64) -> Self {
        Coords {
            lat: lat as f64 / FIXED_SCALE,
            lon: lon as f64 / FIXED_SCALE,
        }
    }

    /// The integer form, in 1e-5 degrees.
    pub fn to_fixed(self) -> (i64, i64) {
        (
            (self.lat * FIXED_SCALE).round() as i64,
            (self.lon * FIXED_SCALE).round() as i64,
        )
    }
}

impl From<(f64, f64)> for Coords {
    fn from((lat, lon): (f64, f64)) -> Self {
        Coords { lat, lon }
    }
}

impl From<Coords> for (f64, f64) {
    fn from(coords: Coords) -> Self {
        (coords.lat, coords.lon)
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lon)
    }
}
