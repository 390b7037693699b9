//! Locale type: validated `language[-REGION]` identifier.
//!
//! Tags are normalized on construction (`ES_pe` becomes `es-PE`), so two
//! locales compare equal exactly when they select the same string tables.

use crate::i18n::LocaleError;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

/// A validated locale identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    /// ISO 639 language code, lowercase (e.g., "en", "es")
    language: String,

    /// ISO 3166 region or UN M.49 area code, uppercase (e.g., "US", "419")
    region: Option<String>,
}

impl Locale {
    /// Parse a locale tag such as `en`, `es-PE` or `pt_BR`.
    ///
    /// # Returns
    /// * `Ok(Locale)` with normalized casing
    /// * `Err(LocaleError)` if the tag is empty or malformed
    pub fn parse(tag: &str) -> Result<Locale, LocaleError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(LocaleError::Empty);
        }

        let regex = TAG_REGEX.get_or_init(|| {
            Regex::new(r"^([A-Za-z]{2,3})(?:[-_]([A-Za-z]{2}|[0-9]{3}))?$")
                .expect("locale tag pattern is valid")
        });

        let captures = regex
            .captures(tag)
            .ok_or_else(|| LocaleError::Invalid(tag.to_string()))?;

        Ok(Locale {
            language: captures[1].to_ascii_lowercase(),
            region: captures.get(2).map(|m| m.as_str().to_ascii_uppercase()),
        })
    }

    /// The language subtag (e.g., "es").
    pub fn language(&self) -> &str {
        &self.language
    }

    /// The region subtag, if any (e.g., "PE").
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// The language-only locale for a regional locale; `None` otherwise.
    pub fn parent(&self) -> Option<Locale> {
        self.region.as_ref().map(|_| Locale {
            language: self.language.clone(),
            region: None,
        })
    }

    /// This locale followed by its parent, most specific first.
    pub fn chain(&self) -> Vec<Locale> {
        let mut chain = vec![self.clone()];
        chain.extend(self.parent());
        chain
    }

    /// Canonical tag form (e.g., "es-PE").
    pub fn tag(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}-{}", self.language, region),
            None => f.write_str(&self.language),
        }
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::parse(s)
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
