//! Animation, transition sequencing, and view state for the Chronomap
//! viewer.
//!
//! Everything here runs on a single thread. Animations are driven by a
//! [`FrameClock`], transitions are spawned as local tasks, and shared state
//! lives in one [`ViewState`] behind an `Rc`.
//!
//! # Modules
//!
//! - [`animator`] -- Frame-driven style interpolation with exact completion.
//! - [`config`] -- Typed configuration loaded from `chronomap-config.yaml`.
//! - [`crawl`] -- Dash-offset animation along shown routes.
//! - [`frame`] -- The [`FrameClock`] seam and a `tokio::time` implementation.
//! - [`panel`] -- Marker selection and detail panel payloads.
//! - [`sequencer`] -- Period transitions (fade out, rebuild, fade in).
//! - [`session`] -- One local task per slider change.
//! - [`surface`] -- The [`MapSurface`] seam and an in-memory recorder.
//! - [`ticket`] -- Last-request-wins cancellation tickets.
//! - [`view`] -- The shared [`ViewState`].
//!
//! [`FrameClock`]: frame::FrameClock
//! [`MapSurface`]: surface::MapSurface
//! [`ViewState`]: view::ViewState

pub mod animator;
pub mod config;
pub mod crawl;
pub mod frame;
pub mod panel;
pub mod sequencer;
pub mod session;
pub mod surface;
pub mod ticket;
pub mod view;

// Re-export primary types at crate root.
pub use animator::{AnimationOutcome, Easing, Timing, animate, interpolate};
pub use config::{ConfigError, ViewerConfig};
pub use frame::{FrameClock, IntervalFrameClock};
pub use panel::{format_year, object_detail};
pub use sequencer::TransitionOutcome;
pub use session::{Session, SlideReport};
pub use surface::{
    LayerId, LayerKind, MapSurface, MarkerSpec, RecordingSurface, RouteSpec, SceneSnapshot,
    SurfaceError,
};
pub use ticket::{TransitionGuard, TransitionTicket};
pub use view::{TrackedLayer, ViewState};
