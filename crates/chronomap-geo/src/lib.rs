//! Catalog, route derivation, projection, and curve geometry for the
//! Chronomap viewer.
//!
//! This crate models everything spatial: the loaded objects and periods,
//! the influence routes derived from them, and the pixel-space curve
//! construction used to draw those routes on a slippy map.
//!
//! # Modules
//!
//! - [`catalog`] -- The two static JSON collections, validated and indexed,
//!   with slider and year lookups.
//! - [`curve`] -- Quadratic route curves with straight-line fallbacks.
//! - [`error`] -- Error types for loading and settings validation.
//! - [`projection`] -- The [`Projection`] seam and a Web Mercator
//!   implementation.
//! - [`route`] -- Derivation of per-period routes from influence links.
//!
//! [`Projection`]: projection::Projection

pub mod catalog;
pub mod curve;
pub mod error;
pub mod projection;
pub mod route;

// Re-export primary types at crate root.
pub use catalog::Catalog;
pub use curve::{CurveBuilder, CurveSettings, RouteGeometry};
pub use error::GeoError;
pub use projection::{Projection, ScreenPoint, WebMercator};
pub use route::{ResolvedTarget, derive_routes, resolve_target};
