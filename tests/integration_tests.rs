//! Integration tests for locale-relay
//!
//! These tests exercise the registry, providers and module host together,
//! including concurrent readers and broadcasts.

use locale_relay::i18n::{
    JsonDirSource, LoadError, Locale, LocaleRegistry, MessageProvider, Reloadable, StaticSource,
    StringSource, Table,
};
use locale_relay::module::{Icon, LocalizedModuleFactory, ModuleContext, ModuleHost};
use parking_lot::Mutex;
use proptest::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

// ==================== Test Helpers ====================

fn locale(tag: &str) -> Locale {
    Locale::parse(tag).expect("test locale tag is valid")
}

fn write_table(root: &Path, bundle: &str, tag: &str, entries: &[(&str, &str)]) {
    let dir = root.join(bundle);
    std::fs::create_dir_all(&dir).expect("Failed to create bundle dir");
    let map: HashMap<_, _> = entries.iter().copied().collect();
    let json = serde_json::to_string_pretty(&map).expect("Failed to encode table");
    std::fs::write(dir.join(format!("{}.json", tag)), json).expect("Failed to write table");
}

/// Blocks `fetch` for one locale until released, signalling when it is entered.
struct GatedSource {
    inner: StaticSource,
    gated: Locale,
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl StringSource for GatedSource {
    fn fetch(&self, bundle: &str, locale: &Locale) -> Result<Table, LoadError> {
        if *locale == self.gated {
            let _ = self.entered.lock().send(());
            let _ = self.release.lock().recv();
        }
        self.inner.fetch(bundle, locale)
    }
}

// ==================== Broadcast Tests ====================

#[test]
fn test_broadcast_from_json_tables() {
    let temp_dir = TempDir::new().unwrap();
    write_table(temp_dir.path(), "host", "en", &[("host.title", "Module Host")]);
    write_table(temp_dir.path(), "host", "es", &[("host.title", "Anfitrión")]);
    write_table(temp_dir.path(), "notes", "en", &[("notes.title", "Notes")]);
    write_table(temp_dir.path(), "notes", "es", &[("notes.title", "Notas")]);

    let source: Arc<dyn StringSource> = Arc::new(JsonDirSource::new(temp_dir.path()));
    let host = Arc::new(MessageProvider::new("host", source.clone()));
    let notes = Arc::new(MessageProvider::new("notes", source));

    let registry = LocaleRegistry::new();
    registry.register(host.clone());
    registry.register(notes.clone());

    let report = registry.broadcast_locale_change(&locale("es"));
    assert!(report.is_complete_success());
    assert_eq!(report.reloaded, vec!["host", "notes"]);
    assert_eq!(host.get_string("host.title"), "Anfitrión");
    assert_eq!(notes.get_string("notes.title"), "Notas");

    registry.broadcast_locale_change(&locale("en"));
    assert_eq!(host.get_string("host.title"), "Module Host");
    assert_eq!(notes.get_string("notes.title"), "Notes");
}

#[test]
fn test_failure_isolated_between_providers() {
    let temp_dir = TempDir::new().unwrap();
    write_table(temp_dir.path(), "a", "en", &[("k", "A en")]);
    write_table(temp_dir.path(), "b", "en", &[("k", "B en")]);
    write_table(temp_dir.path(), "b", "fr", &[("k", "B fr")]);

    let source: Arc<dyn StringSource> = Arc::new(JsonDirSource::new(temp_dir.path()));
    let a = Arc::new(MessageProvider::new("a", source.clone()));
    let b = Arc::new(MessageProvider::new("b", source));

    let registry = LocaleRegistry::new();
    registry.register(a.clone());
    registry.register(b.clone());

    registry.broadcast_locale_change(&locale("en"));
    let report = registry.broadcast_locale_change(&locale("fr"));

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].provider, "a");
    assert_eq!(a.get_string("k"), "A en");
    assert_eq!(a.locale(), Some(locale("en")));
    assert_eq!(b.get_string("k"), "B fr");
    assert_eq!(b.locale(), Some(locale("fr")));
}

#[test]
fn test_failure_on_first_broadcast_leaves_provider_unset() {
    let temp_dir = TempDir::new().unwrap();
    write_table(temp_dir.path(), "b", "fr", &[("k", "B fr")]);

    let source: Arc<dyn StringSource> = Arc::new(JsonDirSource::new(temp_dir.path()));
    let a = Arc::new(MessageProvider::new("a", source.clone()));
    let b = Arc::new(MessageProvider::new("b", source));

    let registry = LocaleRegistry::new();
    registry.register(a.clone());
    registry.register(b.clone());
    registry.broadcast_locale_change(&locale("fr"));

    assert!(!a.is_loaded());
    assert_eq!(a.get_string("k"), "!k!");
    assert_eq!(b.get_string("k"), "B fr");
}

#[test]
fn test_malformed_table_keeps_previous_strings() {
    let temp_dir = TempDir::new().unwrap();
    write_table(temp_dir.path(), "host", "en", &[("k", "hello")]);
    std::fs::write(temp_dir.path().join("host").join("de.json"), "{ \"k\": ").unwrap();

    let provider = Arc::new(MessageProvider::new(
        "host",
        Arc::new(JsonDirSource::new(temp_dir.path())),
    ));
    let registry = LocaleRegistry::new();
    registry.register(provider.clone());

    registry.broadcast_locale_change(&locale("en"));
    let report = registry.broadcast_locale_change(&locale("de"));

    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.contains("Malformed"));
    assert_eq!(provider.get_string("k"), "hello");
}

#[test]
fn test_malformed_table_is_reported_instead_of_falling_back() {
    let temp_dir = TempDir::new().unwrap();
    write_table(temp_dir.path(), "host", "en", &[("k", "en")]);
    write_table(temp_dir.path(), "host", "es", &[("k", "es")]);
    std::fs::write(temp_dir.path().join("host").join("de.json"), "{ \"k\": ").unwrap();

    let source = JsonDirSource::new(temp_dir.path());
    assert_eq!(source.root(), temp_dir.path());
    let provider = Arc::new(
        MessageProvider::new("host", Arc::new(source)).with_fallback(locale("en")),
    );
    let registry = LocaleRegistry::new();
    registry.register(provider.clone());

    registry.broadcast_locale_change(&locale("es"));
    let report = registry.broadcast_locale_change(&locale("de"));

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].provider, "host");
    assert!(report.failures[0].error.contains("Malformed"));
    assert!(report.reloaded.is_empty());
    assert_eq!(provider.locale(), Some(locale("es")));
    assert_eq!(provider.get_string("k"), "es");
}

#[test]
fn test_regional_locale_falls_back_through_broadcast() {
    let temp_dir = TempDir::new().unwrap();
    write_table(temp_dir.path(), "host", "en", &[("k", "color")]);
    write_table(temp_dir.path(), "host", "en-GB", &[("k", "colour")]);

    let source: Arc<dyn StringSource> = Arc::new(JsonDirSource::new(temp_dir.path()));
    let provider = Arc::new(MessageProvider::new("host", source).with_fallback(locale("en")));
    let registry = LocaleRegistry::new();
    registry.register(provider.clone());

    registry.broadcast_locale_change(&locale("en-GB"));
    assert_eq!(provider.get_string("k"), "colour");

    registry.broadcast_locale_change(&locale("en-AU"));
    assert_eq!(provider.get_string("k"), "color");

    registry.broadcast_locale_change(&locale("ja"));
    assert_eq!(provider.get_string("k"), "color");
    assert_eq!(registry.current_locale(), Some(locale("ja")));
}

// ==================== Concurrency Tests ====================

#[test]
fn test_reader_sees_old_table_during_load() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();

    let source = GatedSource {
        inner: StaticSource::new()
            .with_table("host", &locale("en"), [("a", "1feb")])
            .with_table("host", &locale("es"), [("a", "2feb"), ("b", "3feb")]),
        gated: locale("es"),
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    };
    let provider = Arc::new(MessageProvider::new("host", Arc::new(source)));
    provider.load(&locale("en")).unwrap();

    let loader = {
        let provider = provider.clone();
        thread::spawn(move || provider.load(&locale("es")))
    };

    entered_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("load should reach the source");

    // Load in progress: the whole old table is still served
    assert_eq!(provider.get_string("a"), "1feb");
    assert_eq!(provider.get_string("b"), "!b!");

    release_tx.send(()).unwrap();
    loader.join().unwrap().expect("load should succeed");

    assert_eq!(provider.get_string("a"), "2feb");
    assert_eq!(provider.get_string("b"), "3feb");
}

#[test]
fn test_concurrent_reads_never_see_mixed_table() {
    let source = StaticSource::new()
        .with_table("host", &locale("en"), [("a", "1feb")])
        .with_table("host", &locale("es"), [("a", "2feb"), ("b", "3feb")]);
    let provider = Arc::new(MessageProvider::new("host", Arc::new(source)));
    provider.load(&locale("en")).unwrap();

    let stop = Arc::new(AtomicBool::new(false));

    let writer = {
        let provider = provider.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            let mut i = 0usize;
            while !stop.load(Ordering::Relaxed) {
                let tag = if i % 2 == 0 { "es" } else { "en" };
                provider.load(&locale(tag)).unwrap();
                i += 1;
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let provider = provider.clone();
            thread::spawn(move || {
                for _ in 0..2_000 {
                    let value = provider.get_string("a");
                    assert!(value == "1feb" || value == "2feb", "unexpected value {}", value);

                    let table = provider.snapshot().expect("table stays loaded");
                    match table.locale().tag().as_str() {
                        "en" => assert_eq!(table.get("b"), None),
                        "es" => assert_eq!(table.get("b"), Some("3feb")),
                        other => panic!("unexpected locale {}", other),
                    }
                }
            })
        })
        .collect();

    for reader in readers {
        reader.join().expect("reader panicked");
    }
    stop.store(true, Ordering::Relaxed);
    writer.join().expect("writer panicked");
}

/// Fails the test if two loads on the same instance overlap.
struct OverlapDetector {
    in_load: AtomicBool,
    overlaps: AtomicUsize,
    loads: AtomicUsize,
}

impl Reloadable for OverlapDetector {
    fn name(&self) -> &str {
        "overlap-detector"
    }

    fn load(&self, _locale: &Locale) -> Result<(), LoadError> {
        if self.in_load.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        thread::sleep(Duration::from_millis(1));
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.in_load.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_concurrent_broadcasts_serialize_provider_loads() {
    let detector = Arc::new(OverlapDetector {
        in_load: AtomicBool::new(false),
        overlaps: AtomicUsize::new(0),
        loads: AtomicUsize::new(0),
    });
    let registry = Arc::new(LocaleRegistry::new());
    registry.register(detector.clone());

    let threads: Vec<_> = ["en", "es", "fr", "de"]
        .iter()
        .map(|tag| {
            let registry = registry.clone();
            let target = locale(tag);
            thread::spawn(move || {
                for _ in 0..10 {
                    registry.broadcast_locale_change(&target);
                }
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }

    assert_eq!(detector.overlaps.load(Ordering::SeqCst), 0);
    assert_eq!(detector.loads.load(Ordering::SeqCst), 40);
    assert_eq!(registry.broadcast_count(), 40);
}

// ==================== Module Host Tests ====================

#[test]
fn test_module_titles_follow_broadcast() {
    let source: Arc<dyn StringSource> = Arc::new(
        StaticSource::new()
            .with_table("notes", &locale("en"), [("notes.title", "Notes")])
            .with_table("notes", &locale("es"), [("notes.title", "Notas")]),
    );
    let notes = Arc::new(MessageProvider::new("notes", source));
    let registry = LocaleRegistry::new();
    registry.register(notes.clone());
    registry.broadcast_locale_change(&locale("en"));

    let ctx = ModuleContext::new().with_provider(notes.clone());
    let mut host = ModuleHost::new();
    let id = host
        .activate(
            &LocalizedModuleFactory::new("notes", "notes", "notes.title")
                .with_icon(Icon::named("note")),
            &ctx,
        )
        .expect("Should activate");
    let surface = host.display_surface(id);

    assert_eq!(host.title(id), Some("Notes".to_string()));
    assert_eq!(host.title(id), Some("Notes".to_string()));

    registry.broadcast_locale_change(&locale("es"));
    assert_eq!(host.title(id), Some("Notas".to_string()));
    assert_eq!(host.display_surface(id), surface);
    assert_eq!(host.icon(id), Some(Some(Icon::named("note"))));

    assert!(host.deactivate(id));
    assert!(!host.deactivate(id));
    assert_eq!(host.title(id), None);
}

#[test]
fn test_module_without_bundle_fails_to_activate() {
    let mut host = ModuleHost::new();
    let result = host.activate(
        &LocalizedModuleFactory::new("clock", "clock", "clock.title"),
        &ModuleContext::new(),
    );
    assert!(result.is_err());
    assert!(host.is_empty());
}

// ==================== Property Tests ====================

proptest! {
    #[test]
    fn prop_lookup_is_total(
        entries in prop::collection::hash_map("[a-z][a-z0-9_.]{0,12}", "[^!]{1,20}", 0..20),
        keys in prop::collection::vec("[a-z][a-z0-9_.]{0,12}", 1..20),
        loaded in any::<bool>(),
    ) {
        let en = locale("en");
        let source = StaticSource::new().with_table("p", &en, entries.clone());
        let provider = MessageProvider::new("p", Arc::new(source));
        if loaded {
            provider.load(&en).unwrap();
        }

        for key in &keys {
            let value = provider.get_string(key);
            match entries.get(key) {
                Some(expected) if loaded => prop_assert_eq!(&value, expected),
                _ => prop_assert_eq!(value, format!("!{}!", key)),
            }
        }
    }

    #[test]
    fn prop_registration_is_idempotent(copies in 1usize..20, others in 0usize..5) {
        let source: Arc<dyn StringSource> = Arc::new(
            StaticSource::new().with_table("p", &locale("en"), [("k", "v")]),
        );
        let registry = LocaleRegistry::new();
        let provider = Arc::new(MessageProvider::new("p", source.clone()));

        for _ in 0..copies {
            registry.register(provider.clone());
        }
        let extra: Vec<_> = (0..others)
            .map(|_| Arc::new(MessageProvider::new("p", source.clone())))
            .collect();
        for p in &extra {
            registry.register(p.clone());
        }

        let report = registry.broadcast_locale_change(&locale("en"));
        prop_assert_eq!(registry.len(), 1 + others);
        prop_assert_eq!(report.attempted, 1 + others);
        prop_assert_eq!(provider.metrics().loads, 1);
        for p in &extra {
            prop_assert_eq!(p.metrics().loads, 1);
        }
    }
}
