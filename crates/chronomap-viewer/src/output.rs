//! The JSON document printed when the session ends.

use chronomap_core::config::MapConfig;
use chronomap_core::{
    FrameClock, RecordingSurface, SceneSnapshot, SlideReport, TransitionOutcome, ViewState,
};
use chronomap_types::{LatLng, LegendEntry, ObjectDetail, PeriodId};
use serde::Serialize;

/// Everything the viewer reports about a finished session.
#[derive(Debug, Serialize)]
pub struct ViewerOutput {
    /// Map widget setup the scene is drawn on.
    pub map: MapSetup,
    /// Period fully shown at the end.
    pub shown_period: Option<PeriodId>,
    /// Slider position of the shown period.
    pub slider_position: Option<usize>,
    /// Legend rows.
    pub legend: Vec<LegendEntry>,
    /// Detail panel of the last selection.
    pub selection: Option<ObjectDetail>,
    /// One row per slider change.
    pub transitions: Vec<TransitionSummary>,
    /// Final surface state.
    pub scene: SceneSnapshot,
}

impl ViewerOutput {
    /// Collect the output from a finished view.
    pub fn new<C: FrameClock>(
        map: &MapConfig,
        view: &ViewState<RecordingSurface, C>,
        selection: Option<ObjectDetail>,
        reports: &[SlideReport],
    ) -> Self {
        let shown_period = view.shown_period();
        Self {
            map: MapSetup::from(map),
            slider_position: shown_period
                .as_ref()
                .and_then(|p| view.catalog().period_slot(p)),
            shown_period,
            legend: view.legend(),
            selection,
            transitions: reports.iter().map(TransitionSummary::from).collect(),
            scene: view.surface().snapshot(),
        }
    }
}

/// Tile layer and viewport of the map widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSetup {
    /// Tile URL template.
    pub tile_url: String,
    /// Tile attribution text.
    pub attribution: String,
    /// Initial map center.
    pub center: LatLng,
    /// Zoom level.
    pub zoom: f64,
    /// Allowed zoom range.
    pub zoom_range: (f64, f64),
}

impl From<&MapConfig> for MapSetup {
    fn from(config: &MapConfig) -> Self {
        Self {
            tile_url: config.tile_url.clone(),
            attribution: config.attribution.clone(),
            center: config.center,
            zoom: config.zoom,
            zoom_range: (config.min_zoom, config.max_zoom),
        }
    }
}

/// Flattened [`SlideReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionSummary {
    /// Slider position requested.
    pub position: usize,
    /// `completed`, `superseded`, `skipped`, or `unknown_period`.
    pub outcome: &'static str,
    /// Transition generation, when one started.
    pub generation: Option<u64>,
    /// Markers built by a completed transition.
    pub markers: usize,
    /// Routes built by a completed transition.
    pub routes: usize,
    /// Crawl frames drawn afterwards.
    pub crawl_frames: u64,
}

impl From<&SlideReport> for TransitionSummary {
    fn from(report: &SlideReport) -> Self {
        let (outcome, generation, markers, routes) = match &report.outcome {
            Some(TransitionOutcome::Completed {
                ticket,
                markers,
                routes,
            }) => ("completed", Some(ticket.generation()), *markers, *routes),
            Some(TransitionOutcome::Superseded { generation }) => {
                ("superseded", Some(*generation), 0, 0)
            }
            Some(TransitionOutcome::UnknownPeriod(_)) => ("unknown_period", None, 0, 0),
            None => ("skipped", None, 0, 0),
        };
        Self {
            position: report.position,
            outcome,
            generation,
            markers,
            routes,
            crawl_frames: report.crawl_frames,
        }
    }
}
