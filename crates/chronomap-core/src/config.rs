//! Configuration loading and typed config structures for the Chronomap
//! viewer.
//!
//! The canonical configuration lives in `chronomap-config.yaml` at the
//! project root. Every field has a default, so an empty file (or no file at
//! all) yields a working viewer.

use std::path::{Path, PathBuf};

use chronomap_geo::CurveSettings;
use chronomap_types::LatLng;
use serde::Deserialize;

use crate::animator::Easing;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an unusable viewer.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level viewer configuration.
///
/// Mirrors the structure of `chronomap-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ViewerConfig {
    /// Locations of the two data collections.
    #[serde(default)]
    pub data: DataConfig,

    /// Map widget settings.
    #[serde(default)]
    pub map: MapConfig,

    /// Fade timings for period transitions.
    #[serde(default)]
    pub animation: AnimationConfig,

    /// Route curvature.
    #[serde(default)]
    pub curve: CurveSettings,

    /// Route crawl effect.
    #[serde(default)]
    pub crawl: CrawlConfig,

    /// Marker and route appearance.
    #[serde(default)]
    pub style: StyleConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ViewerConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override the data paths:
    /// - `CHRONOMAP_OBJECTS` overrides `data.objects_path`
    /// - `CHRONOMAP_PERIODS` overrides `data.periods_path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.data.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.curve.validate().map_err(|e| ConfigError::Invalid {
            reason: e.to_string(),
        })?;
        if self.animation.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "animation.frame_interval_ms must be at least 1".to_owned(),
            });
        }
        if self.map.min_zoom > self.map.max_zoom {
            return Err(ConfigError::Invalid {
                reason: "map.min_zoom exceeds map.max_zoom".to_owned(),
            });
        }
        if !(self.map.min_zoom..=self.map.max_zoom).contains(&self.map.zoom) {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "map.zoom {} is outside {}..={}",
                    self.map.zoom, self.map.min_zoom, self.map.max_zoom
                ),
            });
        }
        let crawl = &self.crawl;
        if crawl.enabled
            && !(crawl.speed_px_per_s.is_finite()
                && crawl.dash_px > 0.0
                && crawl.gap_px >= 0.0)
        {
            return Err(ConfigError::Invalid {
                reason: "crawl needs a finite speed, a positive dash and a non-negative gap"
                    .to_owned(),
            });
        }
        Ok(())
    }
}

/// Locations of the static data collections.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataConfig {
    /// Path to the objects JSON array.
    #[serde(default = "default_objects_path")]
    pub objects_path: PathBuf,

    /// Path to the periods JSON array.
    #[serde(default = "default_periods_path")]
    pub periods_path: PathBuf,

    /// Slider position shown at startup.
    #[serde(default)]
    pub initial_period: usize,
}

impl DataConfig {
    /// Override data paths with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CHRONOMAP_OBJECTS") {
            self.objects_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("CHRONOMAP_PERIODS") {
            self.periods_path = PathBuf::from(val);
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            objects_path: default_objects_path(),
            periods_path: default_periods_path(),
            initial_period: 0,
        }
    }
}

/// Map widget settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapConfig {
    /// Tile URL template.
    #[serde(default = "default_tile_url")]
    pub tile_url: String,

    /// Tile attribution text.
    #[serde(default = "default_attribution")]
    pub attribution: String,

    /// Initial map center.
    #[serde(default = "default_center")]
    pub center: LatLng,

    /// Zoom level the map renders at (and the curve projection uses).
    #[serde(default = "default_zoom")]
    pub zoom: f64,

    /// Lowest zoom the user may reach.
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,

    /// Highest zoom the user may reach.
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,

    /// Whether the map widget provides a curve primitive.
    #[serde(default = "default_true")]
    pub curves: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_url: default_tile_url(),
            attribution: default_attribution(),
            center: default_center(),
            zoom: default_zoom(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            curves: true,
        }
    }
}

/// Fade timings for period transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AnimationConfig {
    /// Duration of the fade-out of the previous period's layers.
    #[serde(default = "default_fade_out_ms")]
    pub fade_out_ms: u64,

    /// Duration of the fade-in of the new period's layers.
    #[serde(default = "default_fade_in_ms")]
    pub fade_in_ms: u64,

    /// Interval between animation frames.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Easing applied to fades.
    #[serde(default)]
    pub easing: Easing,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fade_out_ms: default_fade_out_ms(),
            fade_in_ms: default_fade_in_ms(),
            frame_interval_ms: default_frame_interval_ms(),
            easing: Easing::default(),
        }
    }
}

/// Route crawl effect settings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CrawlConfig {
    /// Whether routes crawl after fading in.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Dash travel speed in pixels per second.
    #[serde(default = "default_crawl_speed")]
    pub speed_px_per_s: f64,

    /// Dash length in pixels.
    #[serde(default = "default_dash_px")]
    pub dash_px: f64,

    /// Gap length in pixels.
    #[serde(default = "default_gap_px")]
    pub gap_px: f64,
}

impl CrawlConfig {
    /// Length of one dash plus one gap.
    pub const fn cycle_px(&self) -> f64 {
        self.dash_px + self.gap_px
    }

    /// Dash pattern string for the surface.
    pub fn dash_array(&self) -> String {
        format!("{} {}", self.dash_px, self.gap_px)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            speed_px_per_s: default_crawl_speed(),
            dash_px: default_dash_px(),
            gap_px: default_gap_px(),
        }
    }
}

/// Marker and route appearance at full visibility.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StyleConfig {
    /// Marker radius in pixels.
    #[serde(default = "default_marker_radius")]
    pub marker_radius: f64,

    /// Marker radius while selected.
    #[serde(default = "default_selected_radius")]
    pub selected_radius: f64,

    /// Marker outline width.
    #[serde(default = "default_marker_weight")]
    pub marker_weight: f64,

    /// Marker fill opacity.
    #[serde(default = "default_marker_fill_opacity")]
    pub marker_fill_opacity: f64,

    /// Route stroke width.
    #[serde(default = "default_route_weight")]
    pub route_weight: f64,

    /// Route stroke opacity.
    #[serde(default = "default_route_opacity")]
    pub route_opacity: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            marker_radius: default_marker_radius(),
            selected_radius: default_selected_radius(),
            marker_weight: default_marker_weight(),
            marker_fill_opacity: default_marker_fill_opacity(),
            route_weight: default_route_weight(),
            route_opacity: default_route_opacity(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) used when `RUST_LOG`
    /// is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_objects_path() -> PathBuf {
    PathBuf::from("data/objects.json")
}

fn default_periods_path() -> PathBuf {
    PathBuf::from("data/periods.json")
}

fn default_tile_url() -> String {
    "https://{s}.basemaps.cartocdn.com/light_nolabels/{z}/{x}/{y}.png".to_owned()
}

fn default_attribution() -> String {
    "&copy; OpenStreetMap contributors &copy; CARTO".to_owned()
}

const fn default_center() -> LatLng {
    LatLng::new(35.0, 25.0)
}

const fn default_zoom() -> f64 {
    4.0
}

const fn default_min_zoom() -> f64 {
    2.0
}

const fn default_max_zoom() -> f64 {
    8.0
}

const fn default_fade_out_ms() -> u64 {
    300
}

const fn default_fade_in_ms() -> u64 {
    450
}

const fn default_frame_interval_ms() -> u64 {
    16
}

const fn default_crawl_speed() -> f64 {
    24.0
}

const fn default_dash_px() -> f64 {
    8.0
}

const fn default_gap_px() -> f64 {
    12.0
}

const fn default_marker_radius() -> f64 {
    6.0
}

const fn default_selected_radius() -> f64 {
    10.0
}

const fn default_marker_weight() -> f64 {
    1.5
}

const fn default_marker_fill_opacity() -> f64 {
    0.85
}

const fn default_route_weight() -> f64 {
    2.5
}

const fn default_route_opacity() -> f64 {
    0.8
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
