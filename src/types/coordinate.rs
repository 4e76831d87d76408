use serde::{Deserialize, Serialize};

/// A WGS84 position. Longitude first, matching the engine's wire order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// The single-precision pair the native `add_coordinate` calls take.
    pub(crate) fn to_native(self) -> (f32, f32) {
        (self.longitude as f32, self.latitude as f32)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((longitude, latitude): (f64, f64)) -> Self {
        Self::new(longitude, latitude)
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(c: Coordinate) -> Self {
        (c.longitude, c.latitude)
    }
}
