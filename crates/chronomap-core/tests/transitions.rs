//! Integration tests for period transitions under rapid slider input.
//!
//! A wrapping surface records every style update so the tests can check
//! what a superseded transition did (and did not do) after a newer one
//! began. Time runs on the paused tokio clock, so frame timing is exact.

#![allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]

use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Duration;

use chronomap_core::surface::SurfaceOp;
use chronomap_core::{
    IntervalFrameClock, LayerId, LayerKind, MapSurface, MarkerSpec, RecordingSurface, RouteSpec,
    Session, SurfaceError, TransitionOutcome, ViewState, ViewerConfig,
};
use chronomap_geo::{Catalog, Projection};
use chronomap_types::{ObjectId, PeriodId, Style};
use tokio::task::LocalSet;

const PERIODS: &str = r#"[
    {"id": "bronze", "label": "Bronze Age", "start_year": -3300, "end_year": -1200, "index": 0},
    {"id": "iron", "label": "Iron Age", "start_year": -1199, "end_year": -550, "index": 1},
    {"id": "classical", "label": "Classical", "start_year": -549, "end_year": -323, "index": 2}
]"#;

const OBJECTS: &str = r#"[
    {"id": "knossos", "title": "Knossos", "location": {"lat": 35.3, "lng": 25.16},
     "category": "settlement", "periods": ["bronze"],
     "influences": [{"target": {"object": "ugarit"}, "influence": "trade"}]},
    {"id": "ugarit", "title": "Ugarit", "location": {"lat": 35.6, "lng": 35.78},
     "category": "settlement", "periods": ["bronze"]},
    {"id": "tyre", "title": "Tyre", "location": {"lat": 33.27, "lng": 35.2},
     "category": "settlement", "periods": ["iron"],
     "influences": [{"target": {"object": "knossos"}, "influence": "culture"}]},
    {"id": "gadir", "title": "Gadir", "location": {"lat": 36.53, "lng": -6.29},
     "category": "settlement", "periods": ["iron"]},
    {"id": "marathon", "title": "Battle of Marathon", "location": {"lat": 38.15, "lng": 23.96},
     "category": "event", "periods": ["classical"], "year": -490}
]"#;

/// Surface that records every style update on top of a [`RecordingSurface`].
#[derive(Debug, Default)]
struct StyleTrace {
    inner: RecordingSurface,
    updates: Vec<(LayerId, Style)>,
}

impl MapSurface for StyleTrace {
    fn add_marker(&mut self, spec: MarkerSpec) -> LayerId {
        self.inner.add_marker(spec)
    }

    fn add_route(&mut self, spec: RouteSpec) -> LayerId {
        self.inner.add_route(spec)
    }

    fn set_style(&mut self, layer: LayerId, style: &Style) -> Result<(), SurfaceError> {
        self.inner.set_style(layer, style)?;
        self.updates.push((layer, style.clone()));
        Ok(())
    }

    fn remove_layer(&mut self, layer: LayerId) -> Result<(), SurfaceError> {
        self.inner.remove_layer(layer)
    }

    fn supports_curves(&self) -> bool {
        self.inner.supports_curves()
    }

    fn projection(&self) -> Option<&dyn Projection> {
        self.inner.projection()
    }
}

fn session() -> Session<StyleTrace, IntervalFrameClock> {
    let catalog = Rc::new(Catalog::from_json(OBJECTS, PERIODS).unwrap());
    let view = ViewState::new(
        catalog,
        StyleTrace::default(),
        IntervalFrameClock::from_millis(16),
        &ViewerConfig::default(),
    )
    .unwrap();
    Session::new(Rc::new(view))
}

fn added_objects(log: &[SurfaceOp]) -> BTreeSet<String> {
    log.iter()
        .filter_map(|op| match op {
            SurfaceOp::Added { object, .. } => Some(object.as_str().to_owned()),
            SurfaceOp::Removed { .. } => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn superseded_fade_out_never_rebuilds() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let mut session = session();
            session.slide(0);
            session.settle().await;

            // Iron is superseded halfway through fading bronze out.
            session.slide(1);
            tokio::time::sleep(Duration::from_millis(150)).await;
            session.slide(2);
            session.settle().await;

            let view = Rc::clone(session.view());
            let reports = session.finish().await;
            assert!(matches!(
                reports.get(1).unwrap().outcome,
                Some(TransitionOutcome::Superseded { generation: 2 })
            ));

            let surface = view.surface();
            let added = added_objects(surface.inner.log());
            assert!(!added.contains("tyre"));
            assert!(!added.contains("gadir"));
            assert_eq!(
                surface.inner.marker_objects(),
                vec![&ObjectId::from("marathon")]
            );
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn superseded_fade_in_layers_only_fade_out() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let mut session = session();
            session.slide(0);
            session.settle().await;

            // Let iron finish its fade-out and get partway into its fade-in.
            session.slide(1);
            tokio::time::sleep(Duration::from_millis(500)).await;
            let view = Rc::clone(session.view());
            let iron_layers: BTreeSet<LayerId> = view
                .layers()
                .into_iter()
                .filter(|(_, l)| l.kind == LayerKind::Marker)
                .map(|(id, _)| id)
                .collect();
            assert_eq!(iron_layers.len(), 2);
            let partial = view.layer(*iron_layers.first().unwrap()).unwrap();
            let opacity = partial.style.opacity.unwrap();
            assert!(opacity > 0.0 && opacity < 1.0);
            let cutover = view.surface().updates.len();

            session.slide(2);
            session.settle().await;
            session.finish().await;

            let surface = view.surface();
            for layer in &iron_layers {
                let opacities: Vec<f64> = surface
                    .updates
                    .iter()
                    .skip(cutover)
                    .filter(|(id, _)| id == layer)
                    .filter_map(|(_, s)| s.opacity)
                    .collect();
                assert!(!opacities.is_empty());
                assert!(opacities.windows(2).all(|w| w[1] <= w[0]));
                assert_eq!(opacities.last(), Some(&0.0));
                assert!(!surface.inner.contains(*layer));
            }
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn completed_fade_in_lands_on_exact_styles() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let mut session = session();
            session.slide(1);
            session.settle().await;

            let view = Rc::clone(session.view());
            for (id, layer) in view.layers() {
                let surface = view.surface();
                let style = surface.inner.style(id).unwrap();
                assert_eq!(style, &layer.style);
                match layer.kind {
                    LayerKind::Marker => {
                        assert_eq!(style.opacity, Some(1.0));
                        assert_eq!(style.fill_opacity, Some(0.85));
                    }
                    LayerKind::Route => assert_eq!(style.opacity, Some(0.8)),
                }
            }
            session.finish().await;
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn returning_to_a_superseded_period_runs_again() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let mut session = session();
            session.slide(0);
            tokio::time::sleep(Duration::from_millis(40)).await;
            session.slide(1);
            tokio::time::sleep(Duration::from_millis(40)).await;
            session.slide(0);
            session.settle().await;

            let view = Rc::clone(session.view());
            assert_eq!(view.shown_period(), Some(PeriodId::from("bronze")));
            tokio::time::sleep(Duration::from_millis(100)).await;
            let reports = session.finish().await;
            let last = reports.last().unwrap();
            assert!(last.outcome.as_ref().unwrap().is_completed());
            assert!(last.crawl_frames > 0);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn dragging_back_to_the_shown_period_settles_fully_visible() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let mut session = session();
            session.slide(0);
            session.settle().await;

            // Bronze is still on screen, half faded, when the slider returns.
            session.slide(1);
            tokio::time::sleep(Duration::from_millis(40)).await;
            session.slide(0);
            session.settle().await;

            let view = Rc::clone(session.view());
            assert_eq!(view.shown_period(), Some(PeriodId::from("bronze")));
            {
                let surface = view.surface();
                assert_eq!(
                    added_objects(surface.inner.log()),
                    BTreeSet::from(["knossos".to_owned(), "ugarit".to_owned()])
                );
                for (id, layer) in view.layers() {
                    let style = surface.inner.style(id).unwrap();
                    match layer.kind {
                        LayerKind::Marker => assert_eq!(style.opacity, Some(1.0)),
                        LayerKind::Route => assert_eq!(style.opacity, Some(0.8)),
                    }
                }
            }

            let reports = session.finish().await;
            assert!(matches!(
                reports.get(1).unwrap().outcome,
                Some(TransitionOutcome::Superseded { .. })
            ));
            assert!(reports.last().unwrap().outcome.as_ref().unwrap().is_completed());
        })
        .await;
}
