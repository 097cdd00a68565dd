//! Type-safe identifier wrappers around the string ids used in the data
//! collections.
//!
//! Objects and periods are authored by hand in static JSON, so their ids are
//! short human-readable strings (`"rosetta-stone"`, `"classical"`). Wrapping
//! them prevents accidentally looking up a period with an object id.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from anything string-like.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the inner [`String`] value.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

define_id! {
    /// Unique identifier for a dated object (artifact, event, site).
    ObjectId
}

define_id! {
    /// Unique identifier for a historical period on the time slider.
    PeriodId
}
