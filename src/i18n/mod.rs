//! Internationalization (i18n): runtime-swappable localized strings.
//!
//! # Architecture
//!
//! - `locale`: validated `language[-REGION]` identifiers and their fallback chain
//! - `source`: backing string-table sources (in-memory, JSON directory)
//! - `provider`: `MessageProvider`, a reloadable table with non-failing lookups
//! - `registry`: `LocaleRegistry`, which broadcasts locale changes to providers
//! - `strings`: built-in host strings
//! - `metrics`: per-provider lookup/load counters
//!
//! # Example
//!
//! ```rust,ignore
//! use locale_relay::i18n::{Locale, LocaleRegistry, MessageProvider};
//!
//! let registry = LocaleRegistry::new();
//! let host = Arc::new(MessageProvider::new("host", source));
//! registry.register(host.clone());
//!
//! registry.broadcast_locale_change(&Locale::parse("es")?);
//! let title = host.get_string("host.title");
//! ```

mod error;
mod locale;
mod metrics;
mod provider;
mod registry;
mod source;
mod strings;

pub use error::{LoadError, LocaleError};
pub use locale::Locale;
pub use metrics::{MetricsReport, ProviderMetrics};
pub use provider::{
    format_placeholders, sentinel, Lookup, MessageProvider, Reloadable, StringTable,
    SENTINEL_MARKER,
};
pub use registry::{BroadcastReport, LocaleRegistry, ProviderFailure};
pub use source::{JsonDirSource, StaticSource, StringSource, Table};
pub use strings::{builtin_source, HOST_BUNDLE, NOTES_BUNDLE};
