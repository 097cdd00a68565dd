//! Geographic to screen-pixel projection.
//!
//! The curve builder works in pixel space so that bends look the same at
//! every latitude. The map widget owns the real projection; [`Projection`]
//! abstracts it, and [`WebMercator`] is the standard spherical Mercator used
//! by slippy-map tiles.

use std::f64::consts::PI;

use chronomap_types::LatLng;

/// Latitude limit of the Web Mercator square, in degrees.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_6;

/// A point in screen (layer) pixel space, `y` growing downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    /// Horizontal pixel coordinate.
    pub x: f64,
    /// Vertical pixel coordinate.
    pub y: f64,
}

impl ScreenPoint {
    /// Create a screen point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both components are finite numbers.
    pub const fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Conversion between geographic coordinates and screen pixels.
///
/// Both directions return `None` when the conversion is not possible, for
/// instance because the map is not laid out yet or the input is not finite.
pub trait Projection {
    /// Convert a geographic coordinate to screen pixels.
    fn project(&self, point: LatLng) -> Option<ScreenPoint>;

    /// Convert screen pixels back to a geographic coordinate.
    fn unproject(&self, point: ScreenPoint) -> Option<LatLng>;
}

/// Spherical Web Mercator at a fixed zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercator {
    zoom: f64,
    tile_size: f64,
}

impl WebMercator {
    /// Standard tile edge length in pixels.
    pub const DEFAULT_TILE_SIZE: f64 = 256.0;

    /// Create a projection for the given zoom with 256-pixel tiles.
    pub const fn new(zoom: f64) -> Self {
        Self {
            zoom,
            tile_size: Self::DEFAULT_TILE_SIZE,
        }
    }

    /// Create a projection with a custom tile size.
    pub const fn with_tile_size(zoom: f64, tile_size: f64) -> Self {
        Self { zoom, tile_size }
    }

    /// The zoom level this projection renders at.
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Width (and height) of the whole world in pixels.
    pub fn world_size(&self) -> f64 {
        self.tile_size * self.zoom.exp2()
    }
}

impl Projection for WebMercator {
    fn project(&self, point: LatLng) -> Option<ScreenPoint> {
        if !point.is_finite() {
            return None;
        }
        let scale = self.world_size();
        let lat = point
            .lat
            .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
            .to_radians();
        let sin = lat.sin();
        let x = (point.lng + 180.0) / 360.0 * scale;
        let y = (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)) * scale;
        let projected = ScreenPoint::new(x, y);
        projected.is_finite().then_some(projected)
    }

    fn unproject(&self, point: ScreenPoint) -> Option<LatLng> {
        if !point.is_finite() {
            return None;
        }
        let scale = self.world_size();
        if scale <= 0.0 || !scale.is_finite() {
            return None;
        }
        let lng = point.x / scale * 360.0 - 180.0;
        let n = PI - 2.0 * PI * point.y / scale;
        let lat = n.sinh().atan().to_degrees();
        let unprojected = LatLng::new(lat, lng);
        unprojected.is_finite().then_some(unprojected)
    }
}
