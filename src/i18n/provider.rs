//! Message providers: reloadable string tables with non-failing lookups.
//!
//! A provider owns the table for one bundle. `load` builds a complete new
//! table off to the side and swaps the `Arc` in under a short write lock,
//! so a concurrent reader holds either the old table or the new one.

use crate::i18n::{LoadError, Locale, MetricsReport, ProviderMetrics, StringSource};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Marker wrapped around a key when no translation is available.
pub const SENTINEL_MARKER: char = '!';

/// Anything that can reload its localized strings for a new locale.
///
/// This is the only capability the registry needs from a provider.
pub trait Reloadable: Send + Sync {
    /// Name used in logs and broadcast reports.
    fn name(&self) -> &str;

    /// Replace the current strings with those for `locale`.
    ///
    /// On error the previous strings must remain in effect.
    fn load(&self, locale: &Locale) -> Result<(), LoadError>;
}

/// Immutable table for exactly one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTable {
    locale: Locale,
    entries: HashMap<String, String>,
}

impl StringTable {
    /// Wrap `entries` as the table for `locale`.
    pub fn new(locale: Locale, entries: HashMap<String, String>) -> Self {
        Self { locale, entries }
    }

    /// Locale this table was loaded for.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Translation for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of a key lookup. A miss is a value, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Hit(String),
    Miss { key: String },
}

impl Lookup {
    /// Whether the key was found in the current table.
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    /// The translation, or the sentinel (`!key!`) on a miss.
    pub fn into_string(self) -> String {
        match self {
            Lookup::Hit(value) => value,
            Lookup::Miss { key } => sentinel(&key),
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Hit(value) => f.write_str(value),
            Lookup::Miss { key } => f.write_str(&sentinel(key)),
        }
    }
}

/// Placeholder returned for a key with no translation.
pub fn sentinel(key: &str) -> String {
    format!("{0}{1}{0}", SENTINEL_MARKER, key)
}

/// Replace `{name}` placeholders in `template`.
pub fn format_placeholders(template: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("{{{}}}", name), value)
    })
}

/// Facade over one bundle's strings.
pub struct MessageProvider {
    bundle: String,
    source: Arc<dyn StringSource>,

    /// Locale tried after the requested locale's own chain
    fallback: Option<Locale>,

    /// Current table; `None` until the first successful load
    table: RwLock<Option<Arc<StringTable>>>,

    /// Serializes loads on this provider
    reload_guard: Mutex<()>,

    metrics: ProviderMetrics,
}

impl MessageProvider {
    /// Create an unloaded provider for `bundle`.
    pub fn new(bundle: impl Into<String>, source: Arc<dyn StringSource>) -> Self {
        Self {
            bundle: bundle.into(),
            source,
            fallback: None,
            table: RwLock::new(None),
            reload_guard: Mutex::new(()),
            metrics: ProviderMetrics::new(),
        }
    }

    /// Set the base locale used when the requested locale has no table.
    pub fn with_fallback(mut self, fallback: Locale) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Name of the bundle this provider serves.
    pub fn bundle(&self) -> &str {
        &self.bundle
    }

    /// Configured fallback locale, if any.
    pub fn fallback(&self) -> Option<&Locale> {
        self.fallback.as_ref()
    }

    /// Locale of the loaded table. This is the locale actually served,
    /// which differs from the requested one when a fallback was used.
    pub fn locale(&self) -> Option<Locale> {
        self.table.read().as_ref().map(|t| t.locale().clone())
    }

    /// Whether any load has succeeded yet.
    pub fn is_loaded(&self) -> bool {
        self.table.read().is_some()
    }

    /// Current table, shared with any other readers.
    pub fn snapshot(&self) -> Option<Arc<StringTable>> {
        self.table.read().clone()
    }

    /// Locales tried by `load(locale)`, most specific first, no repeats.
    pub fn candidates(&self, locale: &Locale) -> Vec<Locale> {
        let mut candidates = locale.chain();
        if let Some(fallback) = &self.fallback {
            if !candidates.contains(fallback) {
                candidates.push(fallback.clone());
            }
        }
        candidates
    }

    /// Load the table for `locale`, walking the fallback chain.
    ///
    /// The chain only advances past locales with no table. A table that
    /// exists but fails to read or parse stops the load with that error.
    /// The table is swapped only after a complete fetch; on failure the
    /// previous table (or none) stays in place.
    ///
    /// # Returns
    /// * `Ok(())` once a table has been swapped in
    /// * `Err(LoadError::Exhausted)` if no locale in the chain has a table
    /// * `Err(LoadError::Parse | LoadError::Io)` for an unusable table
    pub fn load(&self, locale: &Locale) -> Result<(), LoadError> {
        let _guard = self.reload_guard.lock();

        let candidates = self.candidates(locale);
        let mut last_error = None;

        for candidate in &candidates {
            match self.source.fetch(&self.bundle, candidate) {
                Ok(entries) => {
                    let table = Arc::new(StringTable::new(candidate.clone(), entries));
                    let count = table.len();
                    *self.table.write() = Some(table);
                    self.metrics.record_load();

                    if candidate == locale {
                        info!("Loaded {} strings for '{}' in {}", count, self.bundle, candidate);
                    } else {
                        info!(
                            "Loaded {} strings for '{}' in {} (fallback for {})",
                            count, self.bundle, candidate, locale
                        );
                    }
                    return Ok(());
                }
                Err(e) if e.is_not_found() => {
                    debug!("No table for '{}' in {}: {}", self.bundle, candidate, e);
                    last_error = Some(e);
                }
                Err(e) => {
                    // A table that exists but cannot be read is a failure, not a gap
                    warn!("Unusable table for '{}' in {}: {}", self.bundle, candidate, e);
                    self.metrics.record_load_failure();
                    return Err(e);
                }
            }
        }

        self.metrics.record_load_failure();

        let tried = candidates
            .iter()
            .map(Locale::tag)
            .collect::<Vec<_>>()
            .join(", ");
        let last = last_error.unwrap_or_else(|| LoadError::NotFound {
            bundle: self.bundle.clone(),
            locale: locale.tag(),
        });

        Err(LoadError::Exhausted {
            bundle: self.bundle.clone(),
            tried,
            last: Box::new(last),
        })
    }

    /// Look up `key` in the current table.
    pub fn lookup(&self, key: &str) -> Lookup {
        let table = self.snapshot();

        match table.as_deref().and_then(|t| t.get(key)) {
            Some(value) => {
                self.metrics.record_hit();
                Lookup::Hit(value.to_string())
            }
            None => {
                self.metrics.record_miss();
                Lookup::Miss {
                    key: key.to_string(),
                }
            }
        }
    }

    /// Localized string for `key`, or `!key!` when unavailable.
    pub fn get_string(&self, key: &str) -> String {
        self.lookup(key).into_string()
    }

    /// Like `get_string`, with `{name}` placeholders substituted.
    pub fn get_formatted(&self, key: &str, args: &[(&str, &str)]) -> String {
        format_placeholders(&self.get_string(key), args)
    }

    /// Snapshot of this provider's lookup and load counters.
    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report()
    }
}

impl Reloadable for MessageProvider {
    fn name(&self) -> &str {
        &self.bundle
    }

    fn load(&self, locale: &Locale) -> Result<(), LoadError> {
        MessageProvider::load(self, locale)
    }
}

impl fmt::Debug for MessageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageProvider")
            .field("bundle", &self.bundle)
            .field("fallback", &self.fallback)
            .field("locale", &self.locale())
            .finish()
    }
}
