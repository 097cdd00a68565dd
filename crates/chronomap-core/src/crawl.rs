//! Route crawl: dashes travelling from source to target.
//!
//! Once a period's routes are fully shown, every crawling route has its
//! `dash_offset` advanced by `speed × elapsed`, wrapped into one dash
//! cycle. The loop runs until the transition that built the routes is
//! superseded.

use chronomap_types::Style;
use tracing::debug;

use crate::frame::FrameClock;
use crate::surface::{LayerId, LayerKind, MapSurface};
use crate::ticket::TransitionTicket;
use crate::view::ViewState;

/// Dash offset after `elapsed_secs` at `speed_px_per_s`, wrapped into
/// `(-cycle_px, 0]`.
///
/// Offsets decrease so the dashes move along the drawing direction.
pub fn dash_offset(elapsed_secs: f64, speed_px_per_s: f64, cycle_px: f64) -> f64 {
    if cycle_px.is_nan() || cycle_px <= 0.0 || !(elapsed_secs * speed_px_per_s).is_finite() {
        return 0.0;
    }
    let wrapped = (elapsed_secs * speed_px_per_s).rem_euclid(cycle_px);
    if wrapped > 0.0 { -wrapped } else { 0.0 }
}

impl<S: MapSurface, C: FrameClock> ViewState<S, C> {
    /// Run the crawl loop for the routes built under `ticket`.
    ///
    /// Returns the number of frames drawn. Returns immediately when the
    /// crawl is disabled, the ticket is already superseded, or no route
    /// crawls.
    pub async fn crawl_routes(&self, ticket: &TransitionTicket) -> u64 {
        let settings = *self.crawl_config();
        if !settings.enabled || ticket.is_superseded() {
            return 0;
        }

        let mut routes: Vec<LayerId> = self
            .layers()
            .into_iter()
            .filter(|(_, l)| {
                l.kind == LayerKind::Route && l.crawls && l.generation == ticket.generation()
            })
            .map(|(id, _)| id)
            .collect();
        if routes.is_empty() {
            return 0;
        }
        debug!(generation = ticket.generation(), routes = routes.len(), "Crawl started");

        let cycle = settings.cycle_px();
        let start = self.clock().now();
        let mut frames = 0_u64;
        loop {
            let now = tokio::select! {
                biased;
                () = ticket.superseded() => break,
                now = self.clock().next_frame() => now,
            };
            let elapsed = now.saturating_sub(start).as_secs_f64();
            let step = Style {
                dash_offset: Some(dash_offset(elapsed, settings.speed_px_per_s, cycle)),
                ..Style::default()
            };
            routes.retain(|id| self.apply_style(*id, &step));
            frames = frames.saturating_add(1);
            if routes.is_empty() {
                break;
            }
        }
        debug!(generation = ticket.generation(), frames, "Crawl stopped");
        frames
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::unreachable, clippy::float_cmp)]
mod tests {
    use std::rc::Rc;

    use chronomap_geo::Catalog;
    use chronomap_types::PeriodId;

    use super::*;
    use crate::config::ViewerConfig;
    use crate::frame::IntervalFrameClock;
    use crate::sequencer::TransitionOutcome;
    use crate::surface::RecordingSurface;

    const PERIODS: &str = r#"[
        {"id": "classical", "label": "Classical", "start_year": -480, "end_year": -323, "index": 0},
        {"id": "hellenistic", "label": "Hellenistic", "start_year": -322, "end_year": -31, "index": 1}
    ]"#;

    const OBJECTS: &str = r#"[
        {"id": "athens", "title": "Athens", "location": {"lat": 37.97, "lng": 23.72},
         "category": "settlement", "periods": ["classical"],
         "influences": [{"target": {"location": {"lat": 37.07, "lng": 15.29}, "name": "Syracuse"},
                         "influence": "conquest"}]},
        {"id": "alexandria", "title": "Alexandria", "location": {"lat": 31.2, "lng": 29.92},
         "category": "settlement", "periods": ["hellenistic"]}
    ]"#;

    fn view(config: &ViewerConfig) -> Rc<ViewState<RecordingSurface, IntervalFrameClock>> {
        let catalog = Rc::new(Catalog::from_json(OBJECTS, PERIODS).unwrap());
        Rc::new(
            ViewState::new(
                catalog,
                RecordingSurface::default(),
                IntervalFrameClock::from_millis(16),
                config,
            )
            .unwrap(),
        )
    }

    #[test]
    fn offset_wraps_into_cycle() {
        assert_eq!(dash_offset(0.0, 24.0, 20.0), 0.0);
        assert!((dash_offset(0.5, 24.0, 20.0) - -12.0).abs() < 1e-9);
        assert!((dash_offset(1.0, 24.0, 20.0) - -4.0).abs() < 1e-9);
        assert_eq!(dash_offset(1.0, 24.0, 0.0), 0.0);
        assert_eq!(dash_offset(f64::NAN, 24.0, 20.0), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn crawl_stops_when_superseded() {
        let view = view(&ViewerConfig::default());
        let outcome = view.transition_to(&PeriodId::from("classical")).await;
        let TransitionOutcome::Completed { ticket, routes, .. } = outcome else {
            unreachable!("single transition completes");
        };
        assert_eq!(routes, 1);

        let local = tokio::task::LocalSet::new();
        let crawler = Rc::clone(&view);
        let frames = local
            .run_until(async move {
                let handle = tokio::task::spawn_local(async move {
                    crawler.crawl_routes(&ticket).await
                });
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
                view.guard().begin();
                handle.await.unwrap()
            })
            .await;
        assert!(frames >= 10);
    }

    #[tokio::test(start_paused = true)]
    async fn crawl_moves_dash_offset() {
        let view = view(&ViewerConfig::default());
        let outcome = view.transition_to(&PeriodId::from("classical")).await;
        let TransitionOutcome::Completed { ticket, .. } = outcome else {
            unreachable!("single transition completes");
        };
        let (route, _) = view
            .layers()
            .into_iter()
            .find(|(_, l)| l.kind == LayerKind::Route)
            .unwrap();

        let local = tokio::task::LocalSet::new();
        let crawler = Rc::clone(&view);
        local
            .run_until(async {
                let handle = tokio::task::spawn_local(async move {
                    crawler.crawl_routes(&ticket).await
                });
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                let offset = view.surface().style(route).unwrap().dash_offset.unwrap();
                assert!(offset < 0.0);
                view.guard().cancel_all();
                handle.await.unwrap();
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_crawl_returns_immediately() {
        let mut config = ViewerConfig::default();
        config.crawl.enabled = false;
        let view = view(&config);
        let outcome = view.transition_to(&PeriodId::from("classical")).await;
        let TransitionOutcome::Completed { ticket, .. } = outcome else {
            unreachable!("single transition completes");
        };
        assert_eq!(view.crawl_routes(&ticket).await, 0);
    }
}
