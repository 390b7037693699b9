//! Error types for the localization subsystem.
//!
//! None of these are fatal to the host: lookups never produce them, and a
//! failed load leaves the provider's previous table authoritative.

use thiserror::Error;

/// A locale tag that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    #[error("Locale tag is empty")]
    Empty,

    #[error("Invalid locale tag: '{0}'")]
    Invalid(String),
}

/// Failure to load a string table for a locale.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source has no table for this bundle/locale pair.
    #[error("No string table for bundle '{bundle}' in locale '{locale}'")]
    NotFound { bundle: String, locale: String },

    /// The table exists but could not be decoded.
    #[error("Malformed string table for bundle '{bundle}' in locale '{locale}': {source}")]
    Parse {
        bundle: String,
        locale: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read string table for bundle '{bundle}' in locale '{locale}': {source}")]
    Io {
        bundle: String,
        locale: String,
        #[source]
        source: std::io::Error,
    },

    /// Every locale in the fallback chain failed; holds the last failure.
    #[error("No usable string table for bundle '{bundle}' (tried {tried}): {last}")]
    Exhausted {
        bundle: String,
        tried: String,
        #[source]
        last: Box<LoadError>,
    },
}

impl LoadError {
    /// Whether this error means the table simply does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            LoadError::NotFound { .. } => true,
            LoadError::Exhausted { last, .. } => last.is_not_found(),
            _ => false,
        }
    }
}
