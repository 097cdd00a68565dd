//! Payloads handed to the browser-side detail panel and legend.
//!
//! These are flat, display-ready records: colors and labels are already
//! resolved so the panel only has to render strings.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Category, Influence};
use crate::ids::ObjectId;

/// One outgoing influence as shown in the detail panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InfluenceDetail {
    /// Influence kind.
    pub influence: Influence,
    /// Display label of the influence kind.
    pub label: String,
    /// Route color, matching the legend.
    pub color: String,
    /// Name of the far end (object title or place name).
    pub target_name: Option<String>,
    /// Note attached to the link.
    pub note: Option<String>,
}

/// Everything the detail panel shows for a selected object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ObjectDetail {
    /// The selected object.
    pub id: ObjectId,
    /// Display title.
    pub title: String,
    /// Category of the object.
    pub category: Category,
    /// Display label of the category.
    pub category_label: String,
    /// Formatted year (`"500 BCE"`, `"1200 CE"`), if the object is dated.
    pub year_label: Option<String>,
    /// Labels of the periods the object belongs to, in slider order.
    pub period_labels: Vec<String>,
    /// Long-form description.
    pub description: String,
    /// Optional image URL.
    pub image: Option<String>,
    /// Outgoing influences.
    pub influences: Vec<InfluenceDetail>,
}

/// One row of the route-color legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LegendEntry {
    /// Influence kind.
    pub influence: Influence,
    /// Display label.
    pub label: String,
    /// Swatch color.
    pub color: String,
}

impl LegendEntry {
    /// Build the legend row for an influence kind.
    pub fn for_influence(influence: Influence) -> Self {
        Self {
            influence,
            label: influence.label().to_owned(),
            color: influence.color().to_owned(),
        }
    }
}
