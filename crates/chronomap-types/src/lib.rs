//! Shared type definitions for the Chronomap historical map viewer.
//!
//! This crate is the single source of truth for the data model shared by
//! the geometry, animation and viewer crates. Types that reach the browser
//! detail panel are exported to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe string wrappers for object and period identifiers
//! - [`enums`] -- Object categories and influence kinds with their colors
//! - [`structs`] -- Coordinates, objects, periods, routes and styles
//! - [`panel`] -- Display-ready payloads for the detail panel and legend

pub mod enums;
pub mod ids;
pub mod panel;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Category, Influence};
pub use ids::{ObjectId, PeriodId};
pub use panel::{InfluenceDetail, LegendEntry, ObjectDetail};
pub use structs::{InfluenceLink, LatLng, MapObject, Period, Route, RouteTarget, Style};
