//! Enumeration types for objects and influence routes.
//!
//! Both enums map to a fixed display color. Unknown strings in the data
//! collections deserialize to the `Other` variant instead of failing the
//! whole load.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Object categories
// ---------------------------------------------------------------------------

/// What kind of thing a map object is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Category {
    /// A portable made object (tablet, coin, vessel).
    Artifact,
    /// A dated happening (battle, council, founding).
    Event,
    /// A standing structure (temple, wall, tomb).
    Monument,
    /// A written work or inscription.
    Text,
    /// A city or settlement.
    Settlement,
    /// Anything the data does not classify.
    #[serde(other)]
    Other,
}

impl Category {
    /// Marker fill color for this category.
    pub const fn color(self) -> &'static str {
        match self {
            Self::Artifact => "#c0392b",
            Self::Event => "#8e44ad",
            Self::Monument => "#d35400",
            Self::Text => "#2c3e50",
            Self::Settlement => "#16a085",
            Self::Other => "#7f8c8d",
        }
    }

    /// Human-readable label used by the detail panel.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Artifact => "Artifact",
            Self::Event => "Event",
            Self::Monument => "Monument",
            Self::Text => "Text",
            Self::Settlement => "Settlement",
            Self::Other => "Other",
        }
    }
}

// ---------------------------------------------------------------------------
// Influence kinds
// ---------------------------------------------------------------------------

/// The kind of influence a route denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Influence {
    /// Exchange of goods.
    Trade,
    /// Spread of belief and ritual.
    Religion,
    /// Military expansion.
    Conquest,
    /// Transfer of techniques and tools.
    Technology,
    /// Artistic and literary influence.
    Culture,
    /// Movement of people.
    Migration,
    /// Treaties, embassies, alliances.
    Diplomacy,
    /// Unclassified influence.
    #[serde(other)]
    Other,
}

impl Influence {
    /// Every influence kind in legend order.
    pub const ALL: [Self; 8] = [
        Self::Trade,
        Self::Religion,
        Self::Conquest,
        Self::Technology,
        Self::Culture,
        Self::Migration,
        Self::Diplomacy,
        Self::Other,
    ];

    /// Route stroke color for this influence kind.
    pub const fn color(self) -> &'static str {
        match self {
            Self::Trade => "#e6a817",
            Self::Religion => "#6c5ce7",
            Self::Conquest => "#d63031",
            Self::Technology => "#0984e3",
            Self::Culture => "#e84393",
            Self::Migration => "#00b894",
            Self::Diplomacy => "#636e72",
            Self::Other => "#b2bec3",
        }
    }

    /// Human-readable label used by the legend and detail panel.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Trade => "Trade",
            Self::Religion => "Religion",
            Self::Conquest => "Conquest",
            Self::Technology => "Technology",
            Self::Culture => "Culture",
            Self::Migration => "Migration",
            Self::Diplomacy => "Diplomacy",
            Self::Other => "Other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_falls_back_to_other() {
        let parsed: Result<Category, _> = serde_json::from_str("\"spaceship\"");
        assert_eq!(parsed.ok(), Some(Category::Other));
    }

    #[test]
    fn influence_parses_snake_case() {
        let parsed: Result<Influence, _> = serde_json::from_str("\"religion\"");
        assert_eq!(parsed.ok(), Some(Influence::Religion));
    }

    #[test]
    fn influence_colors_are_distinct() {
        let mut colors: Vec<&str> = Influence::ALL.iter().map(|i| i.color()).collect();
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors.len(), Influence::ALL.len());
    }
}
