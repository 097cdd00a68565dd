//! Route derivation: turning influence links into drawable routes.
//!
//! Routes are not stored anywhere; each period's routes are derived from
//! the influence links of the objects shown in that period.
//!
//! # Resolution rules
//!
//! 1. Only objects belonging to the period contribute routes.
//! 2. An object target resolves to the target object's location and title.
//!    The target does not need to be in the same period (influence can
//!    reach back in time).
//! 3. Unknown object targets and links pointing back at their own source
//!    are skipped with a warning.
//! 4. Coordinates are not validated here; the curve builder skips routes
//!    whose endpoints are not finite.

use chronomap_types::{InfluenceLink, LatLng, MapObject, ObjectId, PeriodId, Route, RouteTarget};
use tracing::warn;

use crate::catalog::Catalog;

/// The resolved far end of an influence link.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    /// Where the route ends.
    pub location: LatLng,
    /// The target object, if the link points at one.
    pub object: Option<ObjectId>,
    /// Display name of the far end.
    pub name: Option<String>,
}

/// Resolve the far end of an influence link against the catalog.
///
/// Returns `None` for unknown object targets and self-links.
pub fn resolve_target(
    catalog: &Catalog,
    source: &MapObject,
    link: &InfluenceLink,
) -> Option<ResolvedTarget> {
    match &link.target {
        RouteTarget::Object { object } => {
            if object == &source.id {
                warn!(source = %source.id, "Skipping influence link to itself");
                return None;
            }
            let Some(target) = catalog.object(object) else {
                warn!(source = %source.id, target = %object, "Skipping influence link to unknown object");
                return None;
            };
            Some(ResolvedTarget {
                location: target.location,
                object: Some(target.id.clone()),
                name: Some(target.title.clone()),
            })
        }
        RouteTarget::Location { location, name } => Some(ResolvedTarget {
            location: *location,
            object: None,
            name: name.clone(),
        }),
    }
}

/// Derive every route drawn for `period`, in object load order then link
/// order.
pub fn derive_routes(catalog: &Catalog, period: &PeriodId) -> Vec<Route> {
    catalog
        .objects_in(period)
        .into_iter()
        .flat_map(|source| {
            source.influences.iter().filter_map(move |link| {
                let target = resolve_target(catalog, source, link)?;
                Some(Route {
                    source: source.id.clone(),
                    target: target.object,
                    target_name: target.name,
                    from: source.location,
                    to: target.location,
                    influence: link.influence,
                    period: period.clone(),
                    note: link.note.clone(),
                })
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chronomap_types::Influence;

    use super::*;

    const PERIODS: &str = r#"[
        {"id": "bronze", "label": "Bronze Age", "start_year": -3300, "end_year": -1200, "index": 0},
        {"id": "iron", "label": "Iron Age", "start_year": -1200, "end_year": -550, "index": 1}
    ]"#;

    const OBJECTS: &str = r#"[
        {
            "id": "ugarit",
            "title": "Ugarit",
            "location": {"lat": 35.6, "lng": 35.78},
            "category": "settlement",
            "periods": ["bronze"],
            "influences": [
                {"target": {"object": "knossos"}, "influence": "trade", "note": "Copper and tin"},
                {"target": {"object": "atlantis"}, "influence": "trade"},
                {"target": {"object": "ugarit"}, "influence": "culture"}
            ]
        },
        {
            "id": "knossos",
            "title": "Knossos",
            "location": {"lat": 35.3, "lng": 25.16},
            "category": "settlement",
            "periods": ["bronze"]
        },
        {
            "id": "tyre",
            "title": "Tyre",
            "location": {"lat": 33.27, "lng": 35.2},
            "category": "settlement",
            "periods": ["iron"],
            "influences": [
                {"target": {"object": "ugarit"}, "influence": "culture"},
                {"target": {"location": {"lat": 36.8, "lng": 10.3}, "name": "Carthage"}, "influence": "migration"}
            ]
        }
    ]"#;

    fn catalog() -> Catalog {
        Catalog::from_json(OBJECTS, PERIODS).unwrap()
    }

    #[test]
    fn unknown_and_self_targets_are_skipped() {
        let routes = catalog().routes_for(&PeriodId::from("bronze"));
        assert_eq!(routes.len(), 1);
        let route = routes.first().unwrap();
        assert_eq!(route.target.as_ref().map(ObjectId::as_str), Some("knossos"));
        assert_eq!(route.target_name.as_deref(), Some("Knossos"));
        assert_eq!(route.note.as_deref(), Some("Copper and tin"));
        assert_eq!(route.influence, Influence::Trade);
    }

    #[test]
    fn targets_may_live_in_earlier_periods() {
        let routes = catalog().routes_for(&PeriodId::from("iron"));
        assert_eq!(routes.len(), 2);
        let back_in_time = routes.first().unwrap();
        assert_eq!(back_in_time.to, LatLng::new(35.6, 35.78));
        assert_eq!(back_in_time.period.as_str(), "iron");
    }

    #[test]
    fn location_targets_keep_their_name() {
        let routes = catalog().routes_for(&PeriodId::from("iron"));
        let carthage = routes.get(1).unwrap();
        assert!(carthage.target.is_none());
        assert_eq!(carthage.target_name.as_deref(), Some("Carthage"));
        assert_eq!(carthage.influence, Influence::Migration);
    }

    #[test]
    fn empty_period_has_no_routes() {
        assert!(catalog().routes_for(&PeriodId::from("stone")).is_empty());
    }
}
