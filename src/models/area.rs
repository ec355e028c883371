//! Search buffer and the bounding box it produces around a point.

use geo::{coord, Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::GeoPoint;

/// Default buffer, roughly 20 meters at mid latitudes
pub const DEFAULT_BUFFER_DEGREES: f64 = 0.0002;

#[derive(Debug, Error, PartialEq)]
#[error("search buffer must be a positive number of degrees, got {0}")]
pub struct InvalidBuffer(pub f64);

/// Radius in degrees used to expand a point into a query region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SearchBuffer(f64);

impl SearchBuffer {
    pub fn new(degrees: f64) -> Result<Self, InvalidBuffer> {
        if degrees.is_finite() && degrees > 0.0 {
            Ok(Self(degrees))
        } else {
            Err(InvalidBuffer(degrees))
        }
    }

    pub fn degrees(&self) -> f64 {
        self.0
    }

    /// Envelope of the point buffered by this radius
    pub fn around(&self, point: GeoPoint) -> BoundingBox {
        let center = Point::new(point.lon, point.lat);
        let rect = Rect::new(
            coord! { x: center.x() - self.0, y: center.y() - self.0 },
            coord! { x: center.x() + self.0, y: center.y() + self.0 },
        );
        BoundingBox::from_rect(rect)
    }
}

impl Default for SearchBuffer {
    fn default() -> Self {
        Self(DEFAULT_BUFFER_DEGREES)
    }
}

impl TryFrom<f64> for SearchBuffer {
    type Error = InvalidBuffer;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SearchBuffer> for f64 {
    fn from(buffer: SearchBuffer) -> Self {
        buffer.0
    }
}

/// Query region in lon/lat degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn from_rect(rect: Rect<f64>) -> Self {
        Self {
            min_lon: rect.min().x,
            min_lat: rect.min().y,
            max_lon: rect.max().x,
            max_lat: rect.max().y,
        }
    }

    /// `left,bottom,right,top` as the OSM API expects
    pub fn to_query_param(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}
