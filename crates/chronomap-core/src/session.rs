//! Slider session: one local task per slider change.
//!
//! Each slider change spawns a local task that runs the period transition
//! and, if the transition completes, the route crawl. Tasks share the
//! [`ViewState`] through an `Rc`, so a [`Session`] must be driven from
//! inside a `tokio::task::LocalSet`.

use std::rc::Rc;

use chronomap_types::{ObjectDetail, ObjectId};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::frame::FrameClock;
use crate::sequencer::TransitionOutcome;
use crate::surface::MapSurface;
use crate::view::ViewState;

/// What one slider change did.
#[derive(Debug, Clone)]
pub struct SlideReport {
    /// Slider position requested.
    pub position: usize,
    /// Transition result; `None` when the request was skipped.
    pub outcome: Option<TransitionOutcome>,
    /// Crawl frames drawn after the transition completed.
    pub crawl_frames: u64,
}

/// Drives slider changes against a shared view.
#[derive(Debug)]
pub struct Session<S, C> {
    view: Rc<ViewState<S, C>>,
    tasks: Vec<JoinHandle<SlideReport>>,
}

impl<S, C> Session<S, C>
where
    S: MapSurface + 'static,
    C: FrameClock + 'static,
{
    /// Create a session over `view`.
    pub const fn new(view: Rc<ViewState<S, C>>) -> Self {
        Self {
            view,
            tasks: Vec::new(),
        }
    }

    /// The shared view.
    pub const fn view(&self) -> &Rc<ViewState<S, C>> {
        &self.view
    }

    /// Handle a slider change. Must be called inside a `LocalSet`.
    pub fn slide(&mut self, position: usize) {
        let view = Rc::clone(&self.view);
        debug!(position, "Slider moved");
        self.tasks.push(tokio::task::spawn_local(async move {
            let outcome = view.request_slider(position).await;
            let crawl_frames = match &outcome {
                Some(TransitionOutcome::Completed { ticket, .. }) => {
                    view.crawl_routes(ticket).await
                }
                _ => 0,
            };
            SlideReport {
                position,
                outcome,
                crawl_frames,
            }
        }));
    }

    /// Handle a marker click on `object`.
    pub fn select(&self, object: &ObjectId) -> Option<ObjectDetail> {
        self.view.select_object(object)
    }

    /// Number of slider tasks still running (including crawls).
    pub fn running(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_finished()).count()
    }

    /// Wait until the latest requested period is fully shown.
    ///
    /// Always waits at least one frame so freshly spawned slider tasks get
    /// to register their request.
    pub async fn settle(&self) {
        loop {
            self.view.clock().next_frame().await;
            if self.view.shown_period() == self.view.requested_period() {
                break;
            }
        }
    }

    /// Stop the crawl and collect every task's report in request order.
    pub async fn finish(self) -> Vec<SlideReport> {
        self.view.guard().cancel_all();
        let mut reports = Vec::with_capacity(self.tasks.len());
        for task in self.tasks {
            match task.await {
                Ok(report) => reports.push(report),
                Err(e) => warn!(error = %e, "Slider task failed"),
            }
        }
        reports
    }
}
