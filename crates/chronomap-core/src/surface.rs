//! The rendering surface seam.
//!
//! The map widget is an external component that owns layers. The viewer
//! talks to it only through [`MapSurface`]: add a marker, add a route with
//! prepared geometry, restyle a layer, remove a layer, and ask for the
//! projection and curve capability used by the curve builder.
//!
//! [`RecordingSurface`] keeps everything in memory. Tests inspect its
//! operation log, and the headless viewer prints its scene snapshot.

use std::collections::BTreeMap;
use std::fmt;

use chronomap_geo::{Projection, RouteGeometry, WebMercator};
use chronomap_types::{Influence, LatLng, ObjectId, Style};
use serde::Serialize;

/// Surface-assigned handle of one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

/// What a layer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// A circle marker for one object.
    Marker,
    /// A route line or curve.
    Route,
}

/// Everything needed to draw a marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    /// Object the marker represents.
    pub object: ObjectId,
    /// Marker position.
    pub location: LatLng,
    /// Hover text.
    pub tooltip: String,
    /// Initial style.
    pub style: Style,
}

/// Everything needed to draw a route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSpec {
    /// Object the route starts from.
    pub source: ObjectId,
    /// Display name of the far end.
    pub target_name: Option<String>,
    /// Influence kind (drives the color).
    pub influence: Influence,
    /// Prepared geometry.
    pub geometry: RouteGeometry,
    /// Initial style.
    pub style: Style,
}

/// Errors reported by a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// The layer was never added or has already been removed.
    #[error("unknown layer: {0}")]
    UnknownLayer(LayerId),
}

/// A map widget that owns marker and route layers.
pub trait MapSurface {
    /// Add a marker layer.
    fn add_marker(&mut self, spec: MarkerSpec) -> LayerId;

    /// Add a route layer.
    fn add_route(&mut self, spec: RouteSpec) -> LayerId;

    /// Merge `style` into the layer's current style.
    fn set_style(&mut self, layer: LayerId, style: &Style) -> Result<(), SurfaceError>;

    /// Remove a layer.
    fn remove_layer(&mut self, layer: LayerId) -> Result<(), SurfaceError>;

    /// Whether the widget can draw quadratic curves natively.
    fn supports_curves(&self) -> bool;

    /// The widget's current projection, if it exposes one.
    fn projection(&self) -> Option<&dyn Projection>;
}

// ---------------------------------------------------------------------------
// In-memory surface
// ---------------------------------------------------------------------------

/// One entry of the [`RecordingSurface`] operation log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SurfaceOp {
    /// A layer was added.
    Added {
        /// New layer.
        layer: LayerId,
        /// Layer kind.
        kind: LayerKind,
        /// Object the layer belongs to (marker object or route source).
        object: ObjectId,
    },
    /// A layer was removed.
    Removed {
        /// Removed layer.
        layer: LayerId,
    },
}

#[derive(Debug, Clone)]
struct RecordedLayer {
    kind: LayerKind,
    object: ObjectId,
    label: Option<String>,
    points: Vec<LatLng>,
    curved: bool,
    style: Style,
}

/// In-memory [`MapSurface`] with an operation log.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    layers: BTreeMap<LayerId, RecordedLayer>,
    next_layer: u64,
    log: Vec<SurfaceOp>,
    style_updates: u64,
    curves: bool,
    projection: Option<WebMercator>,
}

impl RecordingSurface {
    /// Create an empty surface.
    ///
    /// `projection` of `None` models a widget that has not been laid out
    /// yet; route curves then fall back to straight lines.
    pub const fn new(projection: Option<WebMercator>, curves: bool) -> Self {
        Self {
            layers: BTreeMap::new(),
            next_layer: 0,
            log: Vec::new(),
            style_updates: 0,
            curves,
            projection,
        }
    }

    /// Current style of a layer.
    pub fn style(&self, layer: LayerId) -> Option<&Style> {
        self.layers.get(&layer).map(|l| &l.style)
    }

    /// Whether the layer exists.
    pub fn contains(&self, layer: LayerId) -> bool {
        self.layers.contains_key(&layer)
    }

    /// Number of live layers of `kind`.
    pub fn count(&self, kind: LayerKind) -> usize {
        self.layers.values().filter(|l| l.kind == kind).count()
    }

    /// Objects with a live marker, in layer order.
    pub fn marker_objects(&self) -> Vec<&ObjectId> {
        self.layers
            .values()
            .filter(|l| l.kind == LayerKind::Marker)
            .map(|l| &l.object)
            .collect()
    }

    /// All add/remove operations so far.
    pub fn log(&self) -> &[SurfaceOp] {
        &self.log
    }

    /// Number of `set_style` calls that hit a live layer.
    pub const fn style_updates(&self) -> u64 {
        self.style_updates
    }

    /// Serializable view of the live layers.
    pub fn snapshot(&self) -> SceneSnapshot {
        let layers = self
            .layers
            .iter()
            .map(|(id, layer)| SceneLayer {
                id: *id,
                kind: layer.kind,
                object: layer.object.clone(),
                label: layer.label.clone(),
                curved: layer.curved,
                points: layer.points.clone(),
                style: layer.style.clone(),
            })
            .collect();
        let added = self
            .log
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Added { .. }))
            .count();
        SceneSnapshot {
            layers,
            added,
            removed: self.log.len().saturating_sub(added),
            style_updates: self.style_updates,
        }
    }

    fn insert(&mut self, layer: RecordedLayer) -> LayerId {
        self.next_layer = self.next_layer.saturating_add(1);
        let id = LayerId(self.next_layer);
        self.log.push(SurfaceOp::Added {
            layer: id,
            kind: layer.kind,
            object: layer.object.clone(),
        });
        self.layers.insert(id, layer);
        id
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new(Some(WebMercator::new(4.0)), true)
    }
}

impl MapSurface for RecordingSurface {
    fn add_marker(&mut self, spec: MarkerSpec) -> LayerId {
        self.insert(RecordedLayer {
            kind: LayerKind::Marker,
            object: spec.object,
            label: Some(spec.tooltip),
            points: vec![spec.location],
            curved: false,
            style: spec.style,
        })
    }

    fn add_route(&mut self, spec: RouteSpec) -> LayerId {
        let (points, curved) = match spec.geometry {
            RouteGeometry::Curve {
                start,
                control,
                end,
            } => (vec![start, control, end], true),
            RouteGeometry::Straight { start, end } => (vec![start, end], false),
        };
        self.insert(RecordedLayer {
            kind: LayerKind::Route,
            object: spec.source,
            label: spec.target_name,
            points,
            curved,
            style: spec.style,
        })
    }

    fn set_style(&mut self, layer: LayerId, style: &Style) -> Result<(), SurfaceError> {
        let entry = self
            .layers
            .get_mut(&layer)
            .ok_or(SurfaceError::UnknownLayer(layer))?;
        entry.style = entry.style.merged(style);
        self.style_updates = self.style_updates.saturating_add(1);
        Ok(())
    }

    fn remove_layer(&mut self, layer: LayerId) -> Result<(), SurfaceError> {
        self.layers
            .remove(&layer)
            .ok_or(SurfaceError::UnknownLayer(layer))?;
        self.log.push(SurfaceOp::Removed { layer });
        Ok(())
    }

    fn supports_curves(&self) -> bool {
        self.curves
    }

    fn projection(&self) -> Option<&dyn Projection> {
        self.projection.as_ref().map(|p| p as &dyn Projection)
    }
}

/// Serializable state of a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSnapshot {
    /// Live layers in creation order.
    pub layers: Vec<SceneLayer>,
    /// Layers added over the surface's lifetime.
    pub added: usize,
    /// Layers removed over the surface's lifetime.
    pub removed: usize,
    /// Style updates applied.
    pub style_updates: u64,
}

/// One live layer in a [`SceneSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneLayer {
    /// Layer handle.
    pub id: LayerId,
    /// Layer kind.
    pub kind: LayerKind,
    /// Marker object or route source.
    pub object: ObjectId,
    /// Tooltip (markers) or target name (routes).
    pub label: Option<String>,
    /// Whether a route is drawn as a curve.
    pub curved: bool,
    /// Marker position, or route start/(control)/end.
    pub points: Vec<LatLng>,
    /// Current style.
    pub style: Style,
}
