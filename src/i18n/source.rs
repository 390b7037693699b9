//! Backing string-table sources.
//!
//! A source answers one question: given a bundle name and a locale, what is
//! the full key → string table? Storage and format belong to the source;
//! providers only see the resulting map.

use crate::i18n::{LoadError, Locale};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key → localized string mapping for one bundle in one locale.
pub type Table = HashMap<String, String>;

/// Fetches string tables for `(bundle, locale)` pairs.
///
/// Implementations must be deterministic: the same pair yields the same
/// table for as long as the underlying storage does not change.
pub trait StringSource: Send + Sync {
    fn fetch(&self, bundle: &str, locale: &Locale) -> Result<Table, LoadError>;
}

/// In-memory source.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    tables: HashMap<(String, Locale), Table>,
}

impl StaticSource {
    /// Create a source with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the table for `bundle` in `locale`.
    pub fn with_table<K, V>(
        mut self,
        bundle: &str,
        locale: &Locale,
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let table = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.tables
            .insert((bundle.to_string(), locale.clone()), table);
        self
    }
}

impl StringSource for StaticSource {
    fn fetch(&self, bundle: &str, locale: &Locale) -> Result<Table, LoadError> {
        self.tables
            .get(&(bundle.to_string(), locale.clone()))
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                bundle: bundle.to_string(),
                locale: locale.tag(),
            })
    }
}

/// Reads flat JSON objects from `<root>/<bundle>/<locale>.json`.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    root: PathBuf,
}

impl JsonDirSource {
    /// # Arguments
    /// * `root` - Directory holding one subdirectory per bundle
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory tables are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `(bundle, locale)`.
    pub fn table_path(&self, bundle: &str, locale: &Locale) -> PathBuf {
        self.root.join(bundle).join(format!("{}.json", locale))
    }
}

impl StringSource for JsonDirSource {
    fn fetch(&self, bundle: &str, locale: &Locale) -> Result<Table, LoadError> {
        let path = self.table_path(bundle, locale);
        debug!("Reading string table from {}", path.display());

        let content = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound {
                    bundle: bundle.to_string(),
                    locale: locale.tag(),
                }
            } else {
                LoadError::Io {
                    bundle: bundle.to_string(),
                    locale: locale.tag(),
                    source: e,
                }
            }
        })?;

        serde_json::from_str(&content).map_err(|e| LoadError::Parse {
            bundle: bundle.to_string(),
            locale: locale.tag(),
            source: e,
        })
    }
}
