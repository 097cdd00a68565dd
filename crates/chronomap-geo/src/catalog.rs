//! The catalog: every object and period loaded from the two static JSON
//! collections.
//!
//! The catalog is built once at startup and never mutated. Periods are kept
//! sorted by their slider index so that a slider position maps directly to
//! a slot in the period list.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chronomap_types::{Influence, LegendEntry, MapObject, ObjectId, Period, PeriodId, Route};
use tracing::{debug, warn};

use crate::error::GeoError;
use crate::route;

/// All objects and periods known to the viewer.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Objects in load order.
    objects: Vec<MapObject>,
    /// Object id -> position in `objects`.
    object_index: BTreeMap<ObjectId, usize>,
    /// Periods sorted by slider index.
    periods: Vec<Period>,
}

impl Catalog {
    /// Build a catalog from already-parsed collections.
    ///
    /// Object memberships that reference unknown periods are dropped with a
    /// warning. Objects with invalid coordinates are kept; they are skipped
    /// when rendering.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::DuplicateObject`], [`GeoError::DuplicatePeriod`],
    /// [`GeoError::DuplicatePeriodIndex`], or [`GeoError::InvertedPeriod`].
    pub fn new(objects: Vec<MapObject>, mut periods: Vec<Period>) -> Result<Self, GeoError> {
        let mut period_ids = BTreeSet::new();
        for period in &periods {
            if period.start_year > period.end_year {
                return Err(GeoError::InvertedPeriod {
                    period: period.id.clone(),
                    start_year: period.start_year,
                    end_year: period.end_year,
                });
            }
            if !period_ids.insert(period.id.clone()) {
                return Err(GeoError::DuplicatePeriod(period.id.clone()));
            }
        }

        periods.sort_by_key(|p| p.index);
        for pair in periods.windows(2) {
            if let [first, second] = pair
                && first.index == second.index
            {
                return Err(GeoError::DuplicatePeriodIndex {
                    index: first.index,
                    first: first.id.clone(),
                    second: second.id.clone(),
                });
            }
        }

        let mut object_index = BTreeMap::new();
        let mut cleaned = Vec::with_capacity(objects.len());
        for mut object in objects {
            if object_index.contains_key(&object.id) {
                return Err(GeoError::DuplicateObject(object.id));
            }
            object.periods.retain(|period| {
                let known = period_ids.contains(period);
                if !known {
                    warn!(object = %object.id, %period, "Object references unknown period");
                }
                known
            });
            if !object.location.is_valid() {
                debug!(object = %object.id, location = ?object.location, "Object has invalid coordinates");
            }
            object_index.insert(object.id.clone(), cleaned.len());
            cleaned.push(object);
        }

        Ok(Self {
            objects: cleaned,
            object_index,
            periods,
        })
    }

    /// Parse both collections from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Json`] if either document does not match its
    /// schema, plus any validation error from [`Catalog::new`].
    pub fn from_json(objects_json: &str, periods_json: &str) -> Result<Self, GeoError> {
        let objects: Vec<MapObject> =
            serde_json::from_str(objects_json).map_err(|source| GeoError::Json {
                collection: "objects",
                source,
            })?;
        let periods: Vec<Period> =
            serde_json::from_str(periods_json).map_err(|source| GeoError::Json {
                collection: "periods",
                source,
            })?;
        Self::new(objects, periods)
    }

    /// Read and parse both collections from disk.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Io`] if a file cannot be read, plus any error
    /// from [`Catalog::from_json`].
    pub fn load(objects_path: &Path, periods_path: &Path) -> Result<Self, GeoError> {
        let objects_json = read(objects_path)?;
        let periods_json = read(periods_path)?;
        Self::from_json(&objects_json, &periods_json)
    }

    // -------------------------------------------------------------------
    // Objects
    // -------------------------------------------------------------------

    /// Look up an object by id.
    pub fn object(&self, id: &ObjectId) -> Option<&MapObject> {
        self.object_index
            .get(id)
            .and_then(|&slot| self.objects.get(slot))
    }

    /// Iterate over all objects in load order.
    pub fn objects(&self) -> impl Iterator<Item = &MapObject> {
        self.objects.iter()
    }

    /// Number of loaded objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Objects shown in the given period, in load order.
    pub fn objects_in(&self, period: &PeriodId) -> Vec<&MapObject> {
        self.objects.iter().filter(|o| o.in_period(period)).collect()
    }

    // -------------------------------------------------------------------
    // Periods
    // -------------------------------------------------------------------

    /// All periods in slider order.
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Number of loaded periods (the slider's step count).
    pub fn period_count(&self) -> usize {
        self.periods.len()
    }

    /// Look up a period by id.
    pub fn period(&self, id: &PeriodId) -> Option<&Period> {
        self.periods.iter().find(|p| &p.id == id)
    }

    /// Slider slot of a period.
    pub fn period_slot(&self, id: &PeriodId) -> Option<usize> {
        self.periods.iter().position(|p| &p.id == id)
    }

    /// The period at a slider position, clamping positions past the end to
    /// the last period. Returns `None` only when there are no periods.
    pub fn period_at_slider(&self, position: usize) -> Option<&Period> {
        let last = self.periods.len().checked_sub(1)?;
        self.periods.get(position.min(last))
    }

    /// The first period (in slider order) whose range contains `year`.
    pub fn period_for_year(&self, year: i32) -> Option<&Period> {
        self.periods.iter().find(|p| p.contains_year(year))
    }

    // -------------------------------------------------------------------
    // Routes and legend
    // -------------------------------------------------------------------

    /// Routes to draw for a period.
    ///
    /// See [`route::derive_routes`] for the resolution rules.
    pub fn routes_for(&self, period: &PeriodId) -> Vec<Route> {
        route::derive_routes(self, period)
    }

    /// Legend rows for every influence kind used anywhere in the catalog,
    /// in legend order.
    pub fn legend(&self) -> Vec<LegendEntry> {
        let used: BTreeSet<Influence> = self
            .objects
            .iter()
            .flat_map(|o| o.influences.iter().map(|link| link.influence))
            .collect();
        Influence::ALL
            .into_iter()
            .filter(|i| used.contains(i))
            .map(LegendEntry::for_influence)
            .collect()
    }
}

fn read(path: &Path) -> Result<String, GeoError> {
    std::fs::read_to_string(path).map_err(|source| GeoError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PERIODS: &str = r#"[
        {"id": "hellenistic", "label": "Hellenistic", "start_year": -323, "end_year": -31, "index": 1},
        {"id": "archaic", "label": "Archaic", "start_year": -800, "end_year": -480, "index": 0},
        {"id": "roman", "label": "Roman", "start_year": -30, "end_year": 476, "index": 2}
    ]"#;

    const OBJECTS: &str = r#"[
        {
            "id": "pharos",
            "title": "Lighthouse of Alexandria",
            "location": {"lat": 31.21, "lng": 29.88},
            "category": "monument",
            "periods": ["hellenistic", "roman", "byzantine"],
            "year": -280,
            "influences": [
                {"target": {"object": "ostia"}, "influence": "trade"},
                {"target": {"location": {"lat": 36.4, "lng": 28.2}, "name": "Rhodes"}, "influence": "technology"}
            ]
        },
        {
            "id": "ostia",
            "title": "Port of Ostia",
            "location": {"lat": 41.75, "lng": 12.29},
            "category": "settlement",
            "periods": ["roman"]
        }
    ]"#;

    fn catalog() -> Catalog {
        Catalog::from_json(OBJECTS, PERIODS).unwrap()
    }

    #[test]
    fn periods_are_sorted_by_index() {
        let catalog = catalog();
        let ids: Vec<&str> = catalog.periods().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["archaic", "hellenistic", "roman"]);
    }

    #[test]
    fn unknown_period_membership_is_dropped() {
        let catalog = catalog();
        let pharos = catalog.object(&ObjectId::from("pharos")).unwrap();
        assert_eq!(pharos.periods.len(), 2);
    }

    #[test]
    fn slider_position_is_clamped() {
        let catalog = catalog();
        assert_eq!(catalog.period_at_slider(0).unwrap().id.as_str(), "archaic");
        assert_eq!(catalog.period_at_slider(99).unwrap().id.as_str(), "roman");
        assert!(Catalog::default().period_at_slider(0).is_none());
    }

    #[test]
    fn period_slot_follows_slider_order() {
        let catalog = catalog();
        assert_eq!(catalog.period_slot(&PeriodId::from("hellenistic")), Some(1));
        assert_eq!(catalog.period_slot(&PeriodId::from("byzantine")), None);
    }

    #[test]
    fn year_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.period_for_year(-100).unwrap().id.as_str(), "hellenistic");
        assert!(catalog.period_for_year(1500).is_none());
    }

    #[test]
    fn objects_in_period() {
        let catalog = catalog();
        assert_eq!(catalog.objects_in(&PeriodId::from("roman")).len(), 2);
        assert_eq!(catalog.objects_in(&PeriodId::from("hellenistic")).len(), 1);
        assert!(catalog.objects_in(&PeriodId::from("archaic")).is_empty());
    }

    #[test]
    fn legend_lists_used_influences_in_order() {
        let legend = catalog().legend();
        let kinds: Vec<Influence> = legend.iter().map(|e| e.influence).collect();
        assert_eq!(kinds, [Influence::Trade, Influence::Technology]);
    }

    #[test]
    fn duplicate_object_is_rejected() {
        let objects = r#"[
            {"id": "a", "title": "A", "location": {"lat": 0.0, "lng": 0.0}, "category": "text"},
            {"id": "a", "title": "A again", "location": {"lat": 1.0, "lng": 1.0}, "category": "text"}
        ]"#;
        let result = Catalog::from_json(objects, "[]");
        assert!(matches!(result, Err(GeoError::DuplicateObject(_))));
    }

    #[test]
    fn duplicate_slider_index_is_rejected() {
        let periods = r#"[
            {"id": "a", "label": "A", "start_year": 0, "end_year": 10, "index": 0},
            {"id": "b", "label": "B", "start_year": 11, "end_year": 20, "index": 0}
        ]"#;
        let result = Catalog::from_json("[]", periods);
        assert!(matches!(result, Err(GeoError::DuplicatePeriodIndex { index: 0, .. })));
    }

    #[test]
    fn inverted_period_is_rejected() {
        let periods = r#"[{"id": "a", "label": "A", "start_year": 10, "end_year": 0, "index": 0}]"#;
        let result = Catalog::from_json("[]", periods);
        assert!(matches!(result, Err(GeoError::InvertedPeriod { .. })));
    }

    #[test]
    fn malformed_json_names_the_collection() {
        let result = Catalog::from_json("{", "[]");
        assert!(matches!(result, Err(GeoError::Json { collection: "objects", .. })));
    }

    #[test]
    fn load_sample_data() {
        let data = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("data");
        let objects = data.join("objects.json");
        let periods = data.join("periods.json");
        if objects.exists() && periods.exists() {
            let catalog = Catalog::load(&objects, &periods);
            assert!(catalog.is_ok(), "Failed to load sample data: {catalog:?}");
            let catalog = catalog.unwrap();
            assert!(catalog
                .periods()
                .iter()
                .all(|p| !catalog.objects_in(&p.id).is_empty()));
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = Catalog::load(
            Path::new("/nonexistent/objects.json"),
            Path::new("/nonexistent/periods.json"),
        );
        assert!(matches!(result, Err(GeoError::Io { .. })));
    }
}
