//! Transition tickets: last-request-wins cancellation for period changes.
//!
//! Each period change begins a new transition and receives a
//! [`TransitionTicket`]. Beginning a transition cancels the ticket of the
//! previous one, so any animation or rebuild still holding the old ticket
//! observes the cancellation at its next frame and stops.
//!
//! The guard is single-threaded (`Cell`/`RefCell`); tickets are cheap to
//! clone and are moved into local tasks.

use std::cell::{Cell, RefCell};

use tokio_util::sync::CancellationToken;

/// Issues transition tickets and cancels superseded ones.
#[derive(Debug, Default)]
pub struct TransitionGuard {
    /// Generation of the most recently issued ticket (0 = none issued).
    generation: Cell<u64>,
    /// Token shared by every clone of the current ticket.
    current: RefCell<CancellationToken>,
}

impl TransitionGuard {
    /// Create a guard that has not issued any ticket yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new transition, superseding the previous one.
    pub fn begin(&self) -> TransitionTicket {
        let generation = self.generation.get().saturating_add(1);
        self.generation.set(generation);
        let token = CancellationToken::new();
        let previous = self.current.replace(token.clone());
        previous.cancel();
        TransitionTicket { generation, token }
    }

    /// Generation of the most recently issued ticket.
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Whether `ticket` belongs to the most recent transition.
    pub fn is_latest(&self, ticket: &TransitionTicket) -> bool {
        ticket.generation == self.generation.get() && !ticket.token.is_cancelled()
    }

    /// Cancel the current transition without starting a new one.
    pub fn cancel_all(&self) {
        self.current.borrow().cancel();
    }
}

/// Handle for one transition request.
#[derive(Debug, Clone)]
pub struct TransitionTicket {
    /// Monotonically increasing request number.
    generation: u64,
    /// Cancelled when a newer transition begins.
    token: CancellationToken,
}

impl TransitionTicket {
    /// Request number of this transition.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a newer transition has begun.
    pub fn is_superseded(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once a newer transition has begun.
    pub async fn superseded(&self) {
        self.token.cancelled().await;
    }
}
