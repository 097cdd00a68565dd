//! The explicit view state shared by every handler.
//!
//! The map surface, the tracked layers and their current styles, the shown
//! and requested periods, the selected object, and the transition guard all
//! live in one [`ViewState`]. Handlers share it through an `Rc`; interior
//! state is `Cell`/`RefCell` and no borrow is held across an await.
//!
//! Period transitions, the crawl loop, and selection are implemented in
//! [`crate::sequencer`], [`crate::crawl`], and [`crate::panel`].

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use chronomap_geo::{Catalog, CurveBuilder};
use chronomap_types::{LegendEntry, MapObject, ObjectId, PeriodId, Route, Style};
use tracing::debug;

use crate::animator::Timing;
use crate::config::{AnimationConfig, ConfigError, CrawlConfig, StyleConfig, ViewerConfig};
use crate::frame::FrameClock;
use crate::surface::{LayerId, LayerKind, MapSurface, MarkerSpec, RouteSpec};
use crate::ticket::TransitionGuard;

/// A layer the view has added to the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedLayer {
    /// Marker or route.
    pub kind: LayerKind,
    /// Marker object or route source.
    pub object: ObjectId,
    /// Style as last applied.
    pub style: Style,
    /// Generation of the transition that built the layer.
    pub generation: u64,
    /// Whether the crawl loop animates this layer.
    pub crawls: bool,
}

/// All mutable viewer state.
#[derive(Debug)]
pub struct ViewState<S, C> {
    catalog: Rc<Catalog>,
    surface: RefCell<S>,
    clock: C,
    curves: CurveBuilder,
    animation: AnimationConfig,
    crawl: CrawlConfig,
    style: StyleConfig,
    layers: RefCell<BTreeMap<LayerId, TrackedLayer>>,
    shown: RefCell<Option<PeriodId>>,
    requested: RefCell<Option<PeriodId>>,
    selected: RefCell<Option<ObjectId>>,
    guard: TransitionGuard,
}

impl<S: MapSurface, C: FrameClock> ViewState<S, C> {
    /// Create the view state for an empty surface.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the curve settings are unusable.
    pub fn new(
        catalog: Rc<Catalog>,
        surface: S,
        clock: C,
        config: &ViewerConfig,
    ) -> Result<Self, ConfigError> {
        let curves = CurveBuilder::new(config.curve).map_err(|e| ConfigError::Invalid {
            reason: e.to_string(),
        })?;
        Ok(Self {
            catalog,
            surface: RefCell::new(surface),
            clock,
            curves,
            animation: config.animation,
            crawl: config.crawl,
            style: config.style,
            layers: RefCell::new(BTreeMap::new()),
            shown: RefCell::new(None),
            requested: RefCell::new(None),
            selected: RefCell::new(None),
            guard: TransitionGuard::new(),
        })
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// The loaded catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Borrow the surface.
    pub fn surface(&self) -> Ref<'_, S> {
        self.surface.borrow()
    }

    /// The frame clock.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// The transition guard.
    pub const fn guard(&self) -> &TransitionGuard {
        &self.guard
    }

    /// Crawl settings.
    pub const fn crawl_config(&self) -> &CrawlConfig {
        &self.crawl
    }

    /// Period whose layers are fully shown, if any.
    pub fn shown_period(&self) -> Option<PeriodId> {
        self.shown.borrow().clone()
    }

    /// Period of the latest transition request, if any.
    pub fn requested_period(&self) -> Option<PeriodId> {
        self.requested.borrow().clone()
    }

    /// Currently selected object, if any.
    pub fn selected(&self) -> Option<ObjectId> {
        self.selected.borrow().clone()
    }

    /// Snapshot of the tracked layers.
    pub fn layers(&self) -> Vec<(LayerId, TrackedLayer)> {
        self.layers
            .borrow()
            .iter()
            .map(|(id, layer)| (*id, layer.clone()))
            .collect()
    }

    /// Tracked layer by id.
    pub fn layer(&self, id: LayerId) -> Option<TrackedLayer> {
        self.layers.borrow().get(&id).cloned()
    }

    /// Legend rows for the catalog.
    pub fn legend(&self) -> Vec<LegendEntry> {
        self.catalog.legend()
    }

    pub(crate) const fn fade_out_timing(&self) -> Timing {
        Timing::from_millis(self.animation.fade_out_ms, self.animation.easing)
    }

    pub(crate) const fn fade_in_timing(&self) -> Timing {
        Timing::from_millis(self.animation.fade_in_ms, self.animation.easing)
    }

    pub(crate) fn set_shown(&self, period: Option<PeriodId>) {
        *self.shown.borrow_mut() = period;
    }

    pub(crate) fn set_requested(&self, period: Option<PeriodId>) {
        *self.requested.borrow_mut() = period;
    }

    pub(crate) fn set_selected(&self, object: Option<ObjectId>) {
        *self.selected.borrow_mut() = object;
    }

    // -------------------------------------------------------------------
    // Styles
    // -------------------------------------------------------------------

    /// Fully visible marker style for an object.
    pub fn marker_style(&self, object: &MapObject, selected: bool) -> Style {
        let color = object.category.color().to_owned();
        Style {
            opacity: Some(1.0),
            fill_opacity: Some(self.style.marker_fill_opacity),
            weight: Some(self.style.marker_weight),
            radius: Some(if selected {
                self.style.selected_radius
            } else {
                self.style.marker_radius
            }),
            dash_offset: None,
            color: Some(color.clone()),
            fill_color: Some(color),
            dash_array: None,
        }
    }

    /// Fully visible route style. `crawls` adds the dash pattern.
    pub fn route_style(&self, route: &Route, crawls: bool) -> Style {
        Style {
            opacity: Some(self.style.route_opacity),
            weight: Some(self.style.route_weight),
            color: Some(route.influence.color().to_owned()),
            dash_array: crawls.then(|| self.crawl.dash_array()),
            dash_offset: crawls.then_some(0.0),
            ..Style::default()
        }
    }

    /// Opacity fields a layer of `kind` fades in to.
    pub(crate) const fn visible_opacity(&self, kind: LayerKind) -> Style {
        let (opacity, fill_opacity) = match kind {
            LayerKind::Marker => (1.0, Some(self.style.marker_fill_opacity)),
            LayerKind::Route => (self.style.route_opacity, None),
        };
        Style {
            opacity: Some(opacity),
            fill_opacity,
            weight: None,
            radius: None,
            dash_offset: None,
            color: None,
            fill_color: None,
            dash_array: None,
        }
    }

    /// Apply `style` to a layer, tracking the merged result.
    ///
    /// Returns `false`, and forgets the layer, if the surface no longer has
    /// it.
    pub fn apply_style(&self, layer: LayerId, style: &Style) -> bool {
        if let Err(e) = self.surface.borrow_mut().set_style(layer, style) {
            debug!(%layer, error = %e, "Dropping style update for missing layer");
            self.layers.borrow_mut().remove(&layer);
            return false;
        }
        if let Some(tracked) = self.layers.borrow_mut().get_mut(&layer) {
            tracked.style = tracked.style.merged(style);
        }
        true
    }

    // -------------------------------------------------------------------
    // Layer lifecycle
    // -------------------------------------------------------------------

    /// Remove every tracked layer from the surface.
    pub(crate) fn clear_layers(&self) -> usize {
        let layers = std::mem::take(&mut *self.layers.borrow_mut());
        let mut surface = self.surface.borrow_mut();
        for id in layers.keys() {
            if let Err(e) = surface.remove_layer(*id) {
                debug!(layer = %id, error = %e, "Layer already gone");
            }
        }
        layers.len()
    }

    /// Add hidden markers and routes for `period`. Returns the number of
    /// markers and routes added.
    pub(crate) fn build_layers(&self, period: &PeriodId, generation: u64) -> (usize, usize) {
        let selected = self.selected();
        let mut markers = 0_usize;
        for object in self.catalog.objects_in(period) {
            if !object.location.is_valid() {
                debug!(object = %object.id, "Skipping marker with invalid coordinates");
                continue;
            }
            let is_selected = selected.as_ref() == Some(&object.id);
            let full = self.marker_style(object, is_selected);
            let style = full.merged(&Style::hidden());
            let id = self.surface.borrow_mut().add_marker(MarkerSpec {
                object: object.id.clone(),
                location: object.location,
                tooltip: object.title.clone(),
                style: style.clone(),
            });
            self.layers.borrow_mut().insert(
                id,
                TrackedLayer {
                    kind: LayerKind::Marker,
                    object: object.id.clone(),
                    style,
                    generation,
                    crawls: false,
                },
            );
            markers = markers.saturating_add(1);
        }

        let mut routes = 0_usize;
        for route in self.catalog.routes_for(period) {
            if !route.from.is_valid() || !route.to.is_valid() {
                debug!(source = %route.source, "Skipping route with invalid coordinates");
                continue;
            }
            let (geometry, length) = {
                let surface = self.surface.borrow();
                let projection = surface.projection();
                let Some(geometry) =
                    self.curves
                        .build(route.from, route.to, projection, surface.supports_curves())
                else {
                    continue;
                };
                let length = projection
                    .and_then(|p| geometry.pixel_length(p, self.curves.settings().samples));
                (geometry, length)
            };
            let crawls = self.crawl.enabled
                && length.is_none_or(|px| px >= self.crawl.cycle_px());
            let full = self.route_style(&route, crawls);
            let style = full.merged(&Style::hidden());
            let id = self.surface.borrow_mut().add_route(RouteSpec {
                source: route.source.clone(),
                target_name: route.target_name.clone(),
                influence: route.influence,
                geometry,
                style: style.clone(),
            });
            self.layers.borrow_mut().insert(
                id,
                TrackedLayer {
                    kind: LayerKind::Route,
                    object: route.source,
                    style,
                    generation,
                    crawls,
                },
            );
            routes = routes.saturating_add(1);
        }
        (markers, routes)
    }

    /// Marker layer currently showing `object`.
    pub fn marker_for(&self, object: &ObjectId) -> Option<LayerId> {
        self.layers
            .borrow()
            .iter()
            .find(|(_, l)| l.kind == LayerKind::Marker && &l.object == object)
            .map(|(id, _)| *id)
    }
}

/// Opacity-only part of a style: what fades animate.
pub(crate) fn visibility(style: &Style) -> Style {
    Style {
        opacity: style.opacity,
        fill_opacity: style.fill_opacity,
        ..Style::default()
    }
}
