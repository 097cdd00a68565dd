//! Headless viewer binary for Chronomap.
//!
//! Loads the configuration and the two data collections, drives a scripted
//! slider session against the in-memory map surface, and prints the final
//! scene as JSON on stdout. Logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `CHRONOMAP_CONFIG` or `chronomap-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load and validate the catalog
//! 4. Create the map surface and view state
//! 5. Load the slider script
//! 6. Run the session on a local task set
//! 7. Print the final scene

mod error;
mod output;
mod script;

use std::path::PathBuf;
use std::rc::Rc;

use chronomap_core::config::LoggingConfig;
use chronomap_core::{IntervalFrameClock, RecordingSurface, Session, ViewState, ViewerConfig};
use chronomap_geo::{Catalog, WebMercator};
use tokio::task::LocalSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::ViewerError;
use crate::output::ViewerOutput;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG: &str = "chronomap-config.yaml";

/// Application entry point for the headless viewer.
///
/// # Errors
///
/// Returns an error if configuration, data loading, or output fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ViewerError> {
    // 1. Load configuration.
    let config_path = config_path();
    let config = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(config = %config_path.display(), "chronomap-viewer starting");

    // 3. Load the catalog.
    let catalog = Rc::new(Catalog::load(
        &config.data.objects_path,
        &config.data.periods_path,
    )?);
    info!(
        objects = catalog.object_count(),
        periods = catalog.period_count(),
        "Catalog loaded"
    );

    // 4. Create the surface and view state.
    let surface = RecordingSurface::new(Some(WebMercator::new(config.map.zoom)), config.map.curves);
    let clock = IntervalFrameClock::from_millis(config.animation.frame_interval_ms);
    let view = Rc::new(ViewState::new(Rc::clone(&catalog), surface, clock, &config)?);
    info!(
        zoom = config.map.zoom,
        curves = config.map.curves,
        frame_interval_ms = config.animation.frame_interval_ms,
        "View state initialized"
    );

    // 5. Load the slider script.
    let steps = match script::load(&config_path)? {
        Some(steps) => steps,
        None => {
            let mut steps = vec![script::Step::Slide(config.data.initial_period)];
            steps.extend(script::default_script(&catalog));
            steps
        }
    };
    info!(steps = steps.len(), "Slider script ready");

    // 6. Run the session.
    let local = LocalSet::new();
    let (selection, reports) = local
        .run_until(async {
            let mut session = Session::new(Rc::clone(&view));
            let selection = script::run(&mut session, &steps).await;
            (selection, session.finish().await)
        })
        .await;
    info!(
        transitions = reports.len(),
        shown = ?view.shown_period(),
        "Session finished"
    );

    // 7. Print the final scene.
    let output = ViewerOutput::new(&config.map, &view, selection, &reports);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Config file path from `CHRONOMAP_CONFIG`, or the default.
fn config_path() -> PathBuf {
    std::env::var("CHRONOMAP_CONFIG").map_or_else(|_| PathBuf::from(DEFAULT_CONFIG), PathBuf::from)
}

/// Load configuration, falling back to defaults if the file is absent.
fn load_config(path: &std::path::Path) -> Result<ViewerConfig, ViewerError> {
    if path.exists() {
        Ok(ViewerConfig::from_file(path)?)
    } else {
        let mut config = ViewerConfig::default();
        config.data.apply_env_overrides();
        Ok(config)
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured
/// level.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
