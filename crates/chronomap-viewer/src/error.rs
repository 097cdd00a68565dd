//! Error types for the headless viewer binary.
//!
//! [`ViewerError`] is the top-level error type that wraps every failure
//! mode during startup and output.

/// Top-level error for the viewer binary.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: chronomap_core::ConfigError,
    },

    /// Catalog loading or validation failed.
    #[error("catalog error: {source}")]
    Catalog {
        /// The underlying catalog error.
        #[from]
        source: chronomap_geo::GeoError,
    },

    /// The `script` section of the config file is malformed.
    #[error("script error: {message}")]
    Script {
        /// Description of the script problem.
        message: String,
    },

    /// Serializing the final scene failed.
    #[error("output error: {source}")]
    Output {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
