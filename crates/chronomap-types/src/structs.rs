//! Core entity structs: geographic points, objects, periods, routes and the
//! transient visual style record.
//!
//! Objects and periods mirror the two static JSON collections one-to-one.
//! Routes are never authored directly; they are derived from the influence
//! links of the objects in a period.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Category, Influence};
use crate::ids::{ObjectId, PeriodId};

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LatLng {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lng: f64,
}

impl LatLng {
    /// Create a coordinate from latitude and longitude in degrees.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite numbers.
    pub const fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Whether the coordinate is finite and inside the usual degree ranges
    /// (`-90..=90` latitude, `-180..=180` longitude).
    pub fn is_valid(&self) -> bool {
        self.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

/// The far end of an influence link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "bindings/")]
pub enum RouteTarget {
    /// Another object in the catalog; the route ends at its location.
    Object {
        /// The target object.
        object: ObjectId,
    },
    /// A bare location that has no object of its own.
    Location {
        /// Where the route ends.
        location: LatLng,
        /// Optional place name shown in the detail panel.
        #[serde(default)]
        name: Option<String>,
    },
}

/// A directed influence from one object to a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InfluenceLink {
    /// Where the influence went.
    pub target: RouteTarget,
    /// What kind of influence it was.
    pub influence: Influence,
    /// Free-form note shown in the detail panel.
    #[serde(default)]
    pub note: Option<String>,
}

/// A dated object plotted as a marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MapObject {
    /// Unique identifier.
    pub id: ObjectId,
    /// Display title.
    pub title: String,
    /// Where the marker is drawn.
    pub location: LatLng,
    /// What kind of object this is.
    pub category: Category,
    /// Periods this object is shown in.
    #[serde(default)]
    pub periods: Vec<PeriodId>,
    /// Representative year; negative values are BCE.
    #[serde(default)]
    pub year: Option<i32>,
    /// Long-form description for the detail panel.
    #[serde(default)]
    pub description: String,
    /// Optional image URL for the detail panel.
    #[serde(default)]
    pub image: Option<String>,
    /// Outgoing influence links; each becomes a route.
    #[serde(default)]
    pub influences: Vec<InfluenceLink>,
}

impl MapObject {
    /// Whether this object is shown in the given period.
    pub fn in_period(&self, period: &PeriodId) -> bool {
        self.periods.contains(period)
    }
}

// ---------------------------------------------------------------------------
// Periods
// ---------------------------------------------------------------------------

/// A historical period selected by the time slider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Period {
    /// Unique identifier.
    pub id: PeriodId,
    /// Display label.
    pub label: String,
    /// First year of the period (inclusive, negative = BCE).
    pub start_year: i32,
    /// Last year of the period (inclusive, negative = BCE).
    pub end_year: i32,
    /// Position on the slider; periods are ordered by this value.
    pub index: u32,
}

impl Period {
    /// Whether `year` falls inside this period's inclusive range.
    pub const fn contains_year(&self, year: i32) -> bool {
        year >= self.start_year && year <= self.end_year
    }
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// A resolved influence route ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// The object the influence starts from.
    pub source: ObjectId,
    /// The target object, when the link points at one.
    pub target: Option<ObjectId>,
    /// Display name of the far end.
    pub target_name: Option<String>,
    /// Start point (the source object's location).
    pub from: LatLng,
    /// End point.
    pub to: LatLng,
    /// Influence kind; determines the stroke color.
    pub influence: Influence,
    /// The period this route was derived for.
    pub period: PeriodId,
    /// Free-form note copied from the link.
    pub note: Option<String>,
}

// ---------------------------------------------------------------------------
// Visual style
// ---------------------------------------------------------------------------

/// A partial visual style for a marker or route layer.
///
/// Numeric fields are interpolated by the style animator. Non-numeric
/// fields are applied as-is. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Style {
    /// Stroke opacity, 0 to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Fill opacity, 0 to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
    /// Stroke width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Marker radius in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Offset into the dash pattern in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_offset: Option<f64>,
    /// Stroke color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Fill color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    /// Dash pattern, e.g. `"8 12"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_array: Option<String>,
}

impl Style {
    /// Return a copy of `self` with every field set in `other` overwritten.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        Self {
            opacity: other.opacity.or(self.opacity),
            fill_opacity: other.fill_opacity.or(self.fill_opacity),
            weight: other.weight.or(self.weight),
            radius: other.radius.or(self.radius),
            dash_offset: other.dash_offset.or(self.dash_offset),
            color: other.color.clone().or_else(|| self.color.clone()),
            fill_color: other.fill_color.clone().or_else(|| self.fill_color.clone()),
            dash_array: other.dash_array.clone().or_else(|| self.dash_array.clone()),
        }
    }

    /// Fully transparent stroke and fill.
    pub const fn hidden() -> Self {
        Self {
            opacity: Some(0.0),
            fill_opacity: Some(0.0),
            weight: None,
            radius: None,
            dash_offset: None,
            color: None,
            fill_color: None,
            dash_array: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn latlng_validation() {
        assert!(LatLng::new(31.2, 29.9).is_valid());
        assert!(!LatLng::new(f64::NAN, 29.9).is_valid());
        assert!(!LatLng::new(95.0, 0.0).is_valid());
        assert!(LatLng::new(95.0, 0.0).is_finite());
    }

    #[test]
    fn route_target_parses_both_shapes() {
        let object: Result<RouteTarget, _> = serde_json::from_str(r#"{"object": "athens"}"#);
        assert_eq!(
            object.ok(),
            Some(RouteTarget::Object {
                object: ObjectId::from("athens"),
            })
        );

        let location: Result<RouteTarget, _> =
            serde_json::from_str(r#"{"location": {"lat": 1.0, "lng": 2.0}, "name": "Port"}"#);
        assert_eq!(
            location.ok(),
            Some(RouteTarget::Location {
                location: LatLng::new(1.0, 2.0),
                name: Some(String::from("Port")),
            })
        );
    }

    #[test]
    fn object_optional_fields_default() {
        let json = r#"{
            "id": "lyre",
            "title": "Lyre of Ur",
            "location": {"lat": 30.96, "lng": 46.1},
            "category": "artifact"
        }"#;
        let object: MapObject = serde_json::from_str(json).unwrap();
        assert!(object.periods.is_empty());
        assert!(object.influences.is_empty());
        assert_eq!(object.year, None);
    }

    #[test]
    fn merged_prefers_other() {
        let base = Style {
            opacity: Some(1.0),
            radius: Some(6.0),
            color: Some(String::from("#000")),
            ..Style::default()
        };
        let merged = base.merged(&Style::hidden());
        assert_eq!(merged.opacity, Some(0.0));
        assert_eq!(merged.radius, Some(6.0));
        assert_eq!(merged.color.as_deref(), Some("#000"));
    }

    #[test]
    fn period_contains_inclusive_range() {
        let period = Period {
            id: PeriodId::from("classical"),
            label: String::from("Classical"),
            start_year: -500,
            end_year: 0,
            index: 1,
        };
        assert!(period.contains_year(-500));
        assert!(period.contains_year(0));
        assert!(!period.contains_year(1));
    }
}
