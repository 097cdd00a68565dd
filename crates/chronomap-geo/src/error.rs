//! Error types for the `chronomap-geo` crate.
//!
//! Only loading and configuration can fail. Rendering-time geometry never
//! errors: it degrades to a straight line or skips the route.

use std::path::PathBuf;

use chronomap_types::{ObjectId, PeriodId};

/// Errors that can occur while loading the catalog or validating settings.
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    /// A data collection could not be read from disk.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A data collection is not valid JSON for its schema.
    #[error("failed to parse {collection} collection: {source}")]
    Json {
        /// Which collection failed (`objects` or `periods`).
        collection: &'static str,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// Two objects share an identifier.
    #[error("duplicate object id: {0}")]
    DuplicateObject(ObjectId),

    /// Two periods share an identifier.
    #[error("duplicate period id: {0}")]
    DuplicatePeriod(PeriodId),

    /// Two periods claim the same slider position.
    #[error("periods {first} and {second} share slider index {index}")]
    DuplicatePeriodIndex {
        /// Slider index claimed twice.
        index: u32,
        /// The period that claimed it first.
        first: PeriodId,
        /// The period that claimed it again.
        second: PeriodId,
    },

    /// A period ends before it starts.
    #[error("period {period} ends ({end_year}) before it starts ({start_year})")]
    InvertedPeriod {
        /// The offending period.
        period: PeriodId,
        /// Declared first year.
        start_year: i32,
        /// Declared last year.
        end_year: i32,
    },

    /// Curve settings are unusable.
    #[error("invalid curve settings: {reason}")]
    InvalidCurveSettings {
        /// Explanation of what is wrong.
        reason: String,
    },
}
