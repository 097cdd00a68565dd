//! Marker selection and the detail panel payload.

use chronomap_geo::{Catalog, resolve_target};
use chronomap_types::{InfluenceDetail, MapObject, ObjectDetail, ObjectId, Style};
use tracing::debug;

use crate::frame::FrameClock;
use crate::surface::{LayerId, LayerKind, MapSurface};
use crate::view::ViewState;

/// Display label for a year: negative years are BCE.
pub fn format_year(year: i32) -> String {
    if year < 0 {
        format!("{} BCE", year.unsigned_abs())
    } else {
        format!("{year} CE")
    }
}

/// Build the detail panel payload for an object.
pub fn object_detail(catalog: &Catalog, object: &MapObject) -> ObjectDetail {
    let period_labels = catalog
        .periods()
        .iter()
        .filter(|p| object.in_period(&p.id))
        .map(|p| p.label.clone())
        .collect();
    let influences = object
        .influences
        .iter()
        .map(|link| InfluenceDetail {
            influence: link.influence,
            label: link.influence.label().to_owned(),
            color: link.influence.color().to_owned(),
            target_name: resolve_target(catalog, object, link).and_then(|t| t.name),
            note: link.note.clone(),
        })
        .collect();
    ObjectDetail {
        id: object.id.clone(),
        title: object.title.clone(),
        category: object.category,
        category_label: object.category.label().to_owned(),
        year_label: object.year.map(format_year),
        period_labels,
        description: object.description.clone(),
        image: object.image.clone(),
        influences,
    }
}

impl<S: MapSurface, C: FrameClock> ViewState<S, C> {
    /// Select an object, highlighting its marker if one is shown.
    ///
    /// Unknown objects return `None` and leave the selection unchanged.
    pub fn select_object(&self, id: &ObjectId) -> Option<ObjectDetail> {
        let object = self.catalog().object(id)?;
        if self.selected().as_ref() != Some(id) {
            self.clear_selection();
        }
        if let Some(layer) = self.marker_for(id) {
            self.apply_radius(layer, true);
        }
        self.set_selected(Some(id.clone()));
        debug!(object = %id, "Object selected");
        Some(object_detail(self.catalog(), object))
    }

    /// Select the object behind a clicked marker layer.
    pub fn select_layer(&self, layer: LayerId) -> Option<ObjectDetail> {
        let tracked = self.layer(layer)?;
        if tracked.kind != LayerKind::Marker {
            return None;
        }
        self.select_object(&tracked.object)
    }

    /// Clear the selection and restore the marker's normal radius.
    pub fn clear_selection(&self) {
        let Some(previous) = self.selected() else {
            return;
        };
        if let Some(layer) = self.marker_for(&previous) {
            self.apply_radius(layer, false);
        }
        self.set_selected(None);
    }

    fn apply_radius(&self, layer: LayerId, selected: bool) {
        let Some(tracked) = self.layer(layer) else {
            return;
        };
        let Some(object) = self.catalog().object(&tracked.object) else {
            return;
        };
        let style = Style {
            radius: self.marker_style(object, selected).radius,
            ..Style::default()
        };
        self.apply_style(layer, &style);
    }
}
