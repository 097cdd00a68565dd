//! Curved route geometry between two geographic points.
//!
//! A route is drawn as a quadratic curve through (A, control, B). The
//! control point sits on the perpendicular bisector of A-B in pixel space,
//! offset by a bend proportional to the pixel distance and clamped to
//! `[min_bend_px, max_bend_px]`. The control point is then converted back
//! to geographic space so the map widget can draw the curve itself.
//!
//! # Fallbacks
//!
//! The builder never produces undefined geometry:
//! - Non-finite endpoints produce no geometry at all (the route is skipped).
//! - A surface without a curve primitive, a missing projection, coincident
//!   pixels, or any non-finite intermediate value yields a straight line.

use chronomap_types::LatLng;
use serde::Deserialize;
use tracing::debug;

use crate::error::GeoError;
use crate::projection::{Projection, ScreenPoint};

/// Tunables for route curvature.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CurveSettings {
    /// Bend as a fraction of the pixel distance between the endpoints.
    #[serde(default = "default_bend_ratio")]
    pub bend_ratio: f64,

    /// Smallest bend in pixels.
    #[serde(default = "default_min_bend_px")]
    pub min_bend_px: f64,

    /// Largest bend in pixels.
    #[serde(default = "default_max_bend_px")]
    pub max_bend_px: f64,

    /// Segments used when a curve has to be flattened into a polyline.
    #[serde(default = "default_samples")]
    pub samples: u32,
}

impl Default for CurveSettings {
    fn default() -> Self {
        Self {
            bend_ratio: default_bend_ratio(),
            min_bend_px: default_min_bend_px(),
            max_bend_px: default_max_bend_px(),
            samples: default_samples(),
        }
    }
}

impl CurveSettings {
    /// Check that the settings describe a usable curve.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidCurveSettings`] for non-finite or negative
    /// values, an inverted bend range, or fewer than two samples.
    pub fn validate(&self) -> Result<(), GeoError> {
        let values = [self.bend_ratio, self.min_bend_px, self.max_bend_px];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(GeoError::InvalidCurveSettings {
                reason: "bend values must be finite and non-negative".to_owned(),
            });
        }
        if self.min_bend_px > self.max_bend_px {
            return Err(GeoError::InvalidCurveSettings {
                reason: format!(
                    "min_bend_px ({}) exceeds max_bend_px ({})",
                    self.min_bend_px, self.max_bend_px
                ),
            });
        }
        if self.samples < 2 {
            return Err(GeoError::InvalidCurveSettings {
                reason: "samples must be at least 2".to_owned(),
            });
        }
        Ok(())
    }
}

/// Renderable geometry of a single route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteGeometry {
    /// Quadratic curve through `start`, `control`, `end`.
    Curve {
        /// Start of the route.
        start: LatLng,
        /// Quadratic control point.
        control: LatLng,
        /// End of the route.
        end: LatLng,
    },
    /// Straight segment.
    Straight {
        /// Start of the route.
        start: LatLng,
        /// End of the route.
        end: LatLng,
    },
}

impl RouteGeometry {
    /// Whether this geometry is the curved variant.
    pub const fn is_curve(&self) -> bool {
        matches!(self, Self::Curve { .. })
    }

    /// Start and end of the route.
    pub const fn endpoints(&self) -> (LatLng, LatLng) {
        match *self {
            Self::Curve { start, end, .. } | Self::Straight { start, end } => (start, end),
        }
    }

    /// Flatten into a polyline.
    ///
    /// Curves are evaluated at `segments + 1` evenly spaced parameters;
    /// straight lines always return their two endpoints.
    pub fn sample(&self, segments: u32) -> Vec<LatLng> {
        match *self {
            Self::Straight { start, end } => vec![start, end],
            Self::Curve {
                start,
                control,
                end,
            } => {
                let segments = segments.max(1);
                let total = f64::from(segments);
                (0..=segments)
                    .map(|i| quadratic_point(start, control, end, f64::from(i) / total))
                    .collect()
            }
        }
    }

    /// Pixel length of the sampled route under a projection.
    ///
    /// Returns `None` if any sampled point cannot be projected.
    pub fn pixel_length(&self, projection: &dyn Projection, segments: u32) -> Option<f64> {
        let projected: Option<Vec<ScreenPoint>> = self
            .sample(segments)
            .into_iter()
            .map(|p| projection.project(p))
            .collect();
        let projected = projected?;
        let length = projected
            .windows(2)
            .filter_map(|pair| match pair {
                [a, b] => Some(a.distance_to(*b)),
                _ => None,
            })
            .sum::<f64>();
        length.is_finite().then_some(length)
    }
}

/// Point on the quadratic Bezier `(p0, p1, p2)` at parameter `t`.
fn quadratic_point(p0: LatLng, p1: LatLng, p2: LatLng, t: f64) -> LatLng {
    let u = 1.0 - t;
    let a = u * u;
    let b = 2.0 * u * t;
    let c = t * t;
    LatLng::new(
        a * p0.lat + b * p1.lat + c * p2.lat,
        a * p0.lng + b * p1.lng + c * p2.lng,
    )
}

/// Builds [`RouteGeometry`] from endpoints and the current map projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveBuilder {
    settings: CurveSettings,
}

impl CurveBuilder {
    /// Create a builder from validated settings.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidCurveSettings`] if the settings do not
    /// pass [`CurveSettings::validate`].
    pub fn new(settings: CurveSettings) -> Result<Self, GeoError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// The settings this builder was created with.
    pub const fn settings(&self) -> &CurveSettings {
        &self.settings
    }

    /// Build the geometry for a route from `from` to `to`.
    ///
    /// `projection` is the map's current projection, if available, and
    /// `curves_supported` reports whether the surface has a curve primitive.
    /// Returns `None` only when an endpoint is not a finite coordinate.
    pub fn build(
        &self,
        from: LatLng,
        to: LatLng,
        projection: Option<&dyn Projection>,
        curves_supported: bool,
    ) -> Option<RouteGeometry> {
        if !from.is_finite() || !to.is_finite() {
            debug!(?from, ?to, "Skipping route with non-finite endpoint");
            return None;
        }

        let straight = RouteGeometry::Straight {
            start: from,
            end: to,
        };

        if !curves_supported {
            return Some(straight);
        }
        let Some(projection) = projection else {
            return Some(straight);
        };

        Some(
            self.control_point(from, to, projection)
                .map_or(straight, |control| RouteGeometry::Curve {
                    start: from,
                    control,
                    end: to,
                }),
        )
    }

    /// Compute the geographic control point, or `None` when any step of
    /// the pixel-space construction is degenerate.
    fn control_point(
        &self,
        from: LatLng,
        to: LatLng,
        projection: &dyn Projection,
    ) -> Option<LatLng> {
        let a = projection.project(from).filter(ScreenPoint::is_finite)?;
        let b = projection.project(to).filter(ScreenPoint::is_finite)?;

        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let distance = dx.hypot(dy);
        if !distance.is_finite() || distance <= f64::EPSILON {
            return None;
        }

        let bend = (distance * self.settings.bend_ratio)
            .clamp(self.settings.min_bend_px, self.settings.max_bend_px);

        // Unit normal to the left of travel direction.
        let nx = -dy / distance;
        let ny = dx / distance;

        let control = ScreenPoint::new(
            (a.x + b.x) / 2.0 + nx * bend,
            (a.y + b.y) / 2.0 + ny * bend,
        );
        if !control.is_finite() {
            return None;
        }

        projection.unproject(control).filter(LatLng::is_finite)
    }
}

const fn default_bend_ratio() -> f64 {
    0.2
}

const fn default_min_bend_px() -> f64 {
    20.0
}

const fn default_max_bend_px() -> f64 {
    120.0
}

const fn default_samples() -> u32 {
    24
}
