//! Period transitions.
//!
//! A transition fades out every current layer, clears them, rebuilds the
//! markers and routes of the new period, and fades those in. Each
//! transition holds a [`TransitionTicket`]; beginning a newer transition
//! supersedes it. Superseded work stops at its next frame and never clears,
//! rebuilds, or fades layers afterwards. The newer transition picks up
//! whatever half-faded layers it finds and fades them out from their
//! current style.

use chronomap_types::{PeriodId, Style};
use futures::future::join_all;
use tracing::{debug, info};

use crate::animator::{AnimationOutcome, animate};
use crate::frame::FrameClock;
use crate::surface::MapSurface;
use crate::ticket::TransitionTicket;
use crate::view::{ViewState, visibility};

/// How a transition request ended.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    /// The new period is fully shown.
    Completed {
        /// Ticket of the finished transition (used to drive the crawl).
        ticket: TransitionTicket,
        /// Markers built.
        markers: usize,
        /// Routes built.
        routes: usize,
    },
    /// A newer request took over.
    Superseded {
        /// Generation of the abandoned transition.
        generation: u64,
    },
    /// The requested period is not in the catalog.
    UnknownPeriod(PeriodId),
}

impl TransitionOutcome {
    /// Whether the transition ran to completion.
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

impl<S: MapSurface, C: FrameClock> ViewState<S, C> {
    /// Transition the map to `period`.
    pub async fn transition_to(&self, period: &PeriodId) -> TransitionOutcome {
        if self.catalog().period(period).is_none() {
            debug!(%period, "Ignoring transition to unknown period");
            return TransitionOutcome::UnknownPeriod(period.clone());
        }

        self.set_requested(Some(period.clone()));
        let ticket = self.guard().begin();
        let generation = ticket.generation();
        // Nothing is fully shown again until this or a newer transition
        // finishes its fade-in.
        self.set_shown(None);
        info!(generation, %period, "Transition started");

        // --- Fade out whatever is on the map now ---
        let faded = self.fade_all(&ticket, false).await;
        if ticket.is_superseded() {
            debug!(generation, faded, "Transition superseded during fade-out");
            return TransitionOutcome::Superseded { generation };
        }

        // --- Rebuild for the new period ---
        let cleared = self.clear_layers();
        if let Some(selected) = self.selected()
            && self
                .catalog()
                .object(&selected)
                .is_none_or(|o| !o.in_period(period))
        {
            debug!(object = %selected, %period, "Clearing selection outside new period");
            self.set_selected(None);
        }
        let (markers, routes) = self.build_layers(period, generation);
        debug!(generation, cleared, markers, routes, "Layers rebuilt");

        // --- Fade in ---
        self.fade_all(&ticket, true).await;
        if ticket.is_superseded() {
            debug!(generation, "Transition superseded during fade-in");
            return TransitionOutcome::Superseded { generation };
        }

        self.set_shown(Some(period.clone()));
        info!(generation, %period, markers, routes, "Transition completed");
        TransitionOutcome::Completed {
            ticket,
            markers,
            routes,
        }
    }

    /// Map a slider position to a period and transition to it.
    ///
    /// Returns `None` when the catalog has no periods or the period is
    /// already shown or pending.
    pub async fn request_slider(&self, position: usize) -> Option<TransitionOutcome> {
        let period = self.catalog().period_at_slider(position)?.id.clone();
        self.request_period(&period).await
    }

    /// Transition to the first period containing `year`.
    ///
    /// Returns `None` when no period contains `year` or its period is
    /// already shown or pending.
    pub async fn request_year(&self, year: i32) -> Option<TransitionOutcome> {
        let period = self.catalog().period_for_year(year)?.id.clone();
        self.request_period(&period).await
    }

    /// Transition to `period` unless it is already the latest request.
    async fn request_period(&self, period: &PeriodId) -> Option<TransitionOutcome> {
        if self.requested_period().as_ref() == Some(period) {
            debug!(%period, "Period already shown or pending");
            return None;
        }
        Some(self.transition_to(period).await)
    }

    /// Fade every tracked layer in (`visible`) or out concurrently.
    /// Returns the number of fades that completed.
    async fn fade_all(&self, ticket: &TransitionTicket, visible: bool) -> usize {
        let timing = if visible {
            self.fade_in_timing()
        } else {
            self.fade_out_timing()
        };
        let fades = self.layers().into_iter().map(|(id, layer)| {
            let from = visibility(&layer.style);
            let to = if visible {
                self.visible_opacity(layer.kind)
            } else {
                Style::hidden()
            };
            async move {
                animate(self.clock(), &from, &to, timing, Some(ticket), |s| {
                    self.apply_style(id, s)
                })
                .await
            }
        });
        join_all(fades)
            .await
            .into_iter()
            .filter(|o| *o == AnimationOutcome::Completed)
            .count()
    }
}
