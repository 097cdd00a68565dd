//! Scripted slider input for the headless viewer.
//!
//! A script is a list of steps read from the optional `script` section of
//! `chronomap-config.yaml`:
//!
//! ```yaml
//! script:
//!   - slide: 0
//!   - wait: 1200
//!   - select: "knossos"
//! ```
//!
//! Without a `script` section the viewer sweeps every period, then drags
//! the slider back and forth quickly to exercise superseded transitions.

use std::path::Path;
use std::time::Duration;

use chronomap_core::{FrameClock, MapSurface, Session};
use chronomap_geo::Catalog;
use chronomap_types::{ObjectDetail, ObjectId};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ViewerError;

/// Pause after each step of the sweep, long enough for a full transition.
const SWEEP_DWELL_MS: u64 = 1_200;

/// Pause between slider moves during the drag burst.
const DRAG_STEP_MS: u64 = 40;

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Move the slider to a position.
    Slide(usize),
    /// Let time pass (milliseconds).
    Wait(u64),
    /// Wait for the current period to settle, then click a marker.
    Select(ObjectId),
}

/// Read the `script` section from the config file, if present.
pub fn load(config_path: &Path) -> Result<Option<Vec<Step>>, ViewerError> {
    if !config_path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(config_path).map_err(|e| ViewerError::Script {
        message: format!("failed to read config file: {e}"),
    })?;
    let raw: serde_yml::Value =
        serde_yml::from_str(&contents).map_err(|e| ViewerError::Script {
            message: format!("failed to parse config YAML: {e}"),
        })?;
    let Some(section) = raw.get("script") else {
        return Ok(None);
    };
    let steps: Vec<Step> =
        serde_yml::from_value(section.clone()).map_err(|e| ViewerError::Script {
            message: format!("invalid script section: {e}"),
        })?;
    Ok(Some(steps))
}

/// Sweep every period, drag quickly across the slider, then select the
/// first object of the period the drag ends on.
pub fn default_script(catalog: &Catalog) -> Vec<Step> {
    let count = catalog.period_count();
    let mut steps = Vec::new();
    for position in 0..count {
        steps.push(Step::Slide(position));
        steps.push(Step::Wait(SWEEP_DWELL_MS));
    }

    let last = count.saturating_sub(1);
    for position in (0..count).rev().chain(1..count) {
        steps.push(Step::Slide(position));
        steps.push(Step::Wait(DRAG_STEP_MS));
    }

    if let Some(period) = catalog.period_at_slider(last)
        && let Some(object) = catalog.objects_in(&period.id).first()
    {
        steps.push(Step::Select(object.id.clone()));
    }
    steps
}

/// Play `steps` against the session. Returns the last selection's detail.
pub async fn run<S, C>(session: &mut Session<S, C>, steps: &[Step]) -> Option<ObjectDetail>
where
    S: MapSurface + 'static,
    C: FrameClock + 'static,
{
    let mut selection = None;
    for step in steps {
        match step {
            Step::Slide(position) => session.slide(*position),
            Step::Wait(ms) => tokio::time::sleep(Duration::from_millis(*ms)).await,
            Step::Select(object) => {
                session.settle().await;
                selection = session.select(object);
                if selection.is_none() {
                    warn!(%object, "Scripted selection of unknown object");
                } else {
                    info!(%object, "Object selected");
                }
            }
        }
    }
    session.settle().await;
    selection
}
