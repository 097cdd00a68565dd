//! Frame-driven style animation.
//!
//! [`animate`] moves a layer from one [`Style`] to another over a fixed
//! duration, applying an interpolated style on every frame of a
//! [`FrameClock`]. The animation completes by applying the exact target
//! values, so repeated fades never accumulate floating-point drift.
//!
//! # Field rules
//!
//! - Numeric fields present in both styles are interpolated.
//! - Fields absent from the target keep the starting value.
//! - Fields present only in the target are applied as-is from the first
//!   frame.
//! - Non-numeric fields (colors, dash pattern) take the target value from
//!   the first frame.

use std::time::Duration;

use chronomap_types::Style;
use serde::Deserialize;
use tracing::trace;

use crate::frame::FrameClock;
use crate::ticket::TransitionTicket;

/// Progress curve applied to the linear time fraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant rate.
    #[default]
    Linear,
    /// Slow start and end (smoothstep).
    EaseInOut,
}

impl Easing {
    /// Map a time fraction to a progress fraction. Input is clamped to
    /// `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::EaseInOut => t * t * (-2.0_f64).mul_add(t, 3.0),
        }
    }
}

/// Duration and easing of one animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Total animation time.
    pub duration: Duration,
    /// Progress curve.
    pub easing: Easing,
}

impl Timing {
    /// Linear timing over `duration_ms` milliseconds.
    pub const fn linear_ms(duration_ms: u64) -> Self {
        Self {
            duration: Duration::from_millis(duration_ms),
            easing: Easing::Linear,
        }
    }

    /// Timing over `duration_ms` milliseconds with the given easing.
    pub const fn from_millis(duration_ms: u64, easing: Easing) -> Self {
        Self {
            duration: Duration::from_millis(duration_ms),
            easing,
        }
    }
}

/// How an animation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationOutcome {
    /// The target style was applied.
    Completed,
    /// The owning transition was superseded; the layer was left as-is.
    Superseded,
    /// The layer disappeared from the surface mid-animation.
    Detached,
}

impl AnimationOutcome {
    /// Whether the animation reached its target.
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Style at progress `t` between `from` and `to`.
///
/// At `t >= 1` the result is exactly `from.merged(to)`.
pub fn interpolate(from: &Style, to: &Style, t: f64) -> Style {
    if t >= 1.0 {
        return from.merged(to);
    }
    let t = t.max(0.0);
    Style {
        opacity: lerp_field(from.opacity, to.opacity, t),
        fill_opacity: lerp_field(from.fill_opacity, to.fill_opacity, t),
        weight: lerp_field(from.weight, to.weight, t),
        radius: lerp_field(from.radius, to.radius, t),
        dash_offset: lerp_field(from.dash_offset, to.dash_offset, t),
        color: to.color.clone().or_else(|| from.color.clone()),
        fill_color: to.fill_color.clone().or_else(|| from.fill_color.clone()),
        dash_array: to.dash_array.clone().or_else(|| from.dash_array.clone()),
    }
}

fn lerp_field(from: Option<f64>, to: Option<f64>, t: f64) -> Option<f64> {
    match (from, to) {
        (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((b - a).mul_add(t, a)),
        (_, Some(b)) => Some(b),
        (a, None) => a,
    }
}

/// Animate a layer from `from` to `to`.
///
/// `apply` is called with the style for every frame and must return
/// `false` once the layer no longer exists. When a `ticket` is given, the
/// animation stops at the next frame after the ticket is superseded,
/// without applying anything further.
///
/// A zero duration applies the target immediately.
pub async fn animate<C, F>(
    clock: &C,
    from: &Style,
    to: &Style,
    timing: Timing,
    ticket: Option<&TransitionTicket>,
    mut apply: F,
) -> AnimationOutcome
where
    C: FrameClock,
    F: FnMut(&Style) -> bool,
{
    if ticket.is_some_and(TransitionTicket::is_superseded) {
        return AnimationOutcome::Superseded;
    }

    let target = from.merged(to);
    if timing.duration.is_zero() {
        return finish(&target, &mut apply);
    }

    let total = timing.duration.as_secs_f64();
    let start = clock.now();
    loop {
        let now = tokio::select! {
            biased;
            () = wait_superseded(ticket) => return AnimationOutcome::Superseded,
            now = clock.next_frame() => now,
        };

        let elapsed = now.saturating_sub(start);
        if elapsed >= timing.duration {
            return finish(&target, &mut apply);
        }

        let progress = timing.easing.apply(elapsed.as_secs_f64() / total);
        let frame = interpolate(from, to, progress);
        trace!(progress, "Animation frame");
        if !apply(&frame) {
            return AnimationOutcome::Detached;
        }
    }
}

fn finish<F: FnMut(&Style) -> bool>(target: &Style, apply: &mut F) -> AnimationOutcome {
    if apply(target) {
        AnimationOutcome::Completed
    } else {
        AnimationOutcome::Detached
    }
}

async fn wait_superseded(ticket: Option<&TransitionTicket>) {
    match ticket {
        Some(ticket) => ticket.superseded().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::frame::IntervalFrameClock;
    use crate::ticket::TransitionGuard;

    fn visible() -> Style {
        Style {
            opacity: Some(0.8),
            fill_opacity: Some(0.7),
            radius: Some(6.0),
            color: Some("#336699".to_owned()),
            ..Style::default()
        }
    }

    #[test]
    fn interpolate_midpoint() {
        let mid = interpolate(&visible(), &Style::hidden(), 0.5);
        assert!((mid.opacity.unwrap() - 0.4).abs() < 1e-12);
        assert!((mid.fill_opacity.unwrap() - 0.35).abs() < 1e-12);
        assert_eq!(mid.radius, Some(6.0));
        assert_eq!(mid.color.as_deref(), Some("#336699"));
    }

    #[test]
    fn target_only_fields_apply_immediately() {
        let from = Style {
            opacity: Some(0.0),
            ..Style::default()
        };
        let to = Style {
            opacity: Some(1.0),
            weight: Some(3.0),
            dash_array: Some("8 12".to_owned()),
            ..Style::default()
        };
        let early = interpolate(&from, &to, 0.1);
        assert_eq!(early.weight, Some(3.0));
        assert_eq!(early.dash_array.as_deref(), Some("8 12"));
    }

    #[test]
    fn interpolate_end_is_exact() {
        let from = Style {
            opacity: Some(0.1),
            ..Style::default()
        };
        let to = Style {
            opacity: Some(0.3),
            ..Style::default()
        };
        assert_eq!(interpolate(&from, &to, 1.0).opacity, Some(0.3));
        assert_eq!(interpolate(&from, &to, 7.0).opacity, Some(0.3));
    }

    #[test]
    fn easing_is_clamped() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::EaseInOut.apply(2.0), 1.0);
        assert_eq!(Easing::EaseInOut.apply(0.5), 0.5);
        assert!(Easing::EaseInOut.apply(0.1) < 0.1);
    }

    #[tokio::test(start_paused = true)]
    async fn animation_converges_exactly() {
        let clock = IntervalFrameClock::from_millis(16);
        let applied = RefCell::new(Vec::new());
        let from = Style {
            opacity: Some(0.1),
            weight: Some(1.0),
            ..Style::default()
        };
        let to = Style {
            opacity: Some(0.7),
            weight: Some(2.5),
            ..Style::default()
        };
        let outcome = animate(&clock, &from, &to, Timing::linear_ms(250), None, |s| {
            applied.borrow_mut().push(s.clone());
            true
        })
        .await;

        assert_eq!(outcome, AnimationOutcome::Completed);
        let applied = applied.into_inner();
        assert!(applied.len() > 10);
        let last = applied.last().unwrap();
        assert_eq!(last.opacity, Some(0.7));
        assert_eq!(last.weight, Some(2.5));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_applies_target_immediately() {
        let clock = IntervalFrameClock::from_millis(16);
        let mut frames = 0_u32;
        let outcome = animate(
            &clock,
            &visible(),
            &Style::hidden(),
            Timing::linear_ms(0),
            None,
            |s| {
                frames = frames.saturating_add(1);
                s.opacity == Some(0.0)
            },
        )
        .await;
        assert_eq!(outcome, AnimationOutcome::Completed);
        assert_eq!(frames, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_layer_detaches() {
        let clock = IntervalFrameClock::from_millis(16);
        let outcome = animate(
            &clock,
            &visible(),
            &Style::hidden(),
            Timing::linear_ms(300),
            None,
            |_| false,
        )
        .await;
        assert_eq!(outcome, AnimationOutcome::Detached);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_ticket_stops_animation() {
        let clock = IntervalFrameClock::from_millis(16);
        let guard = TransitionGuard::new();
        let ticket = guard.begin();
        let mut frames = 0_u32;
        let outcome = animate(
            &clock,
            &visible(),
            &Style::hidden(),
            Timing::linear_ms(1_000),
            Some(&ticket),
            |_| {
                frames = frames.saturating_add(1);
                if frames == 3 {
                    guard.begin();
                }
                true
            },
        )
        .await;
        assert_eq!(outcome, AnimationOutcome::Superseded);
        assert_eq!(frames, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn already_superseded_applies_nothing() {
        let clock = IntervalFrameClock::from_millis(16);
        let guard = TransitionGuard::new();
        let ticket = guard.begin();
        guard.begin();
        let outcome = animate(
            &clock,
            &visible(),
            &Style::hidden(),
            Timing::linear_ms(0),
            Some(&ticket),
            |_| true,
        )
        .await;
        assert_eq!(outcome, AnimationOutcome::Superseded);
    }
}
