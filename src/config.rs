use crate::i18n::Locale;
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Locale selection
    pub locale: Locale,
    pub secondary_locale: Option<Locale>,
    pub fallback_locale: Locale,

    // String tables; built-in strings when unset
    pub strings_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            locale: parse_locale_var("HOST_LOCALE")?.unwrap_or_else(default_locale),
            secondary_locale: parse_locale_var("HOST_SECONDARY_LOCALE")?,
            fallback_locale: parse_locale_var("FALLBACK_LOCALE")?.unwrap_or_else(default_locale),

            strings_dir: std::env::var("STRINGS_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn default_locale() -> Locale {
    Locale::parse("en").expect("default locale tag is valid")
}

/// Read an optional locale tag from `name`; a set but invalid tag is an error.
fn parse_locale_var(name: &str) -> Result<Option<Locale>> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Locale::parse(&value)
            .map(Some)
            .with_context(|| format!("{} is not a valid locale tag: '{}'", name, value)),
        _ => Ok(None),
    }
}
