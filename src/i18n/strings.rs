//! Built-in strings for the host shell.
//!
//! Used when no strings directory is configured, so the host always has a
//! complete English and Spanish table for its own chrome.

use crate::i18n::{Locale, StaticSource};

/// Bundle name for host chrome strings.
pub const HOST_BUNDLE: &str = "host";

/// Bundle name for the notes module.
pub const NOTES_BUNDLE: &str = "notes";

// ==================== English Strings ====================

const HOST_EN: &[(&str, &str)] = &[
    ("host.title", "Module Host"),
    ("host.module.default_title", "Untitled module"),
    ("host.locale.changed", "Language changed to {locale}"),
    ("host.modules.active", "{count} modules active"),
    ("host.shutdown", "Shutting down"),
    ("clock.title", "Clock"),
];

const NOTES_EN: &[(&str, &str)] = &[
    ("notes.title", "Notes"),
    ("notes.empty", "No notes yet"),
    ("notes.count", "{count} notes"),
];

// ==================== Spanish Strings ====================

const HOST_ES: &[(&str, &str)] = &[
    ("host.title", "Anfitrión de módulos"),
    ("host.module.default_title", "Módulo sin título"),
    ("host.locale.changed", "Idioma cambiado a {locale}"),
    ("host.modules.active", "{count} módulos activos"),
    ("host.shutdown", "Cerrando"),
    ("clock.title", "Reloj"),
];

const NOTES_ES: &[(&str, &str)] = &[
    ("notes.title", "Notas"),
    ("notes.empty", "Todavía no hay notas"),
    ("notes.count", "{count} notas"),
];

/// Source holding every built-in table.
pub fn builtin_source() -> StaticSource {
    let en = Locale::parse("en").expect("built-in locale tag is valid");
    let es = Locale::parse("es").expect("built-in locale tag is valid");

    StaticSource::new()
        .with_table(HOST_BUNDLE, &en, HOST_EN.iter().copied())
        .with_table(HOST_BUNDLE, &es, HOST_ES.iter().copied())
        .with_table(NOTES_BUNDLE, &en, NOTES_EN.iter().copied())
        .with_table(NOTES_BUNDLE, &es, NOTES_ES.iter().copied())
}
