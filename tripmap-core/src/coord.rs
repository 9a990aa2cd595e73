//! Longitude/latitude positions and ordered coordinate sequences.

use geo::Coord;
use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
///
/// Providers exchange positions in `lng, lat` order, so that is the order the
/// fields, [`LngLat::to_pair`] and the `geo` conversion (`x = lng`,
/// `y = lat`) all follow.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use tripmap_core::LngLat;
///
/// let point = LngLat::new(116.397, 39.908);
/// let coord: Coord<f64> = point.into();
/// assert_eq!(coord, Coord { x: 116.397, y: 39.908 });
/// assert_eq!(point.to_pair(), [116.397, 39.908]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Latitude in decimal degrees.
    pub lat: f64,
}

impl LngLat {
    /// Construct a position from longitude and latitude.
    #[must_use]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Return the position as an ordered `[lng, lat]` pair.
    #[must_use]
    pub const fn to_pair(self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl From<LngLat> for Coord<f64> {
    fn from(value: LngLat) -> Self {
        Self {
            x: value.lng,
            y: value.lat,
        }
    }
}

impl From<Coord<f64>> for LngLat {
    fn from(value: Coord<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

/// Ordered `(lng, lat)` pairs describing a route's geometry.
pub type CoordinateSequence = Vec<LngLat>;
