use anyhow::Result;
use locale_relay::config::Config;
use locale_relay::i18n::{
    builtin_source, JsonDirSource, Locale, LocaleRegistry, MessageProvider, StringSource,
    HOST_BUNDLE, NOTES_BUNDLE,
};
use locale_relay::module::{Icon, LocalizedModuleFactory, ModuleContext, ModuleHost};
use std::sync::Arc;
use tracing::{info, warn};

fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_relay=info".parse()?),
        )
        .init();

    info!("Starting module host");

    let config = Config::from_env()?;

    let source: Arc<dyn StringSource> = match &config.strings_dir {
        Some(dir) => {
            info!("Loading string tables from {}", dir.display());
            Arc::new(JsonDirSource::new(dir))
        }
        None => {
            info!("No STRINGS_DIR set, using built-in strings");
            Arc::new(builtin_source())
        }
    };

    // Step 1: Providers, registered with the registry that owns locale changes
    let registry = LocaleRegistry::new();
    let host_strings = Arc::new(
        MessageProvider::new(HOST_BUNDLE, source.clone())
            .with_fallback(config.fallback_locale.clone()),
    );
    let notes_strings = Arc::new(
        MessageProvider::new(NOTES_BUNDLE, source).with_fallback(config.fallback_locale.clone()),
    );
    registry.register(host_strings.clone());
    registry.register(notes_strings.clone());

    // Step 2: Initial locale
    apply_locale(&registry, &host_strings, &config.locale);

    // Step 3: Modules
    let ctx = ModuleContext::new()
        .with_provider(host_strings.clone())
        .with_provider(notes_strings.clone());
    let factories = [
        LocalizedModuleFactory::new("notes", NOTES_BUNDLE, "notes.title")
            .with_icon(Icon::named("note")),
        LocalizedModuleFactory::new("clock", HOST_BUNDLE, "clock.title"),
    ];

    let mut host = ModuleHost::new();
    for factory in &factories {
        if let Err(e) = host.activate(factory, &ctx) {
            warn!("{:#}", e);
        }
    }

    let count = host.len().to_string();
    info!(
        "{}: {}",
        host_strings.get_string("host.title"),
        host_strings.get_formatted("host.modules.active", &[("count", count.as_str())])
    );
    log_titles(&host);

    // Step 4: Runtime switch, if configured
    if let Some(secondary) = &config.secondary_locale {
        apply_locale(&registry, &host_strings, secondary);
        log_titles(&host);
    }

    info!("{}", host_strings.get_string("host.shutdown"));
    host.shutdown();

    info!("host strings: {}", serde_json::to_string(&host_strings.metrics())?);
    info!("notes strings: {}", serde_json::to_string(&notes_strings.metrics())?);
    Ok(())
}

fn apply_locale(registry: &LocaleRegistry, host_strings: &MessageProvider, locale: &Locale) {
    let report = registry.broadcast_locale_change(locale);
    for failure in &report.failures {
        warn!("'{}' kept its previous strings: {}", failure.provider, failure.error);
    }
    info!(
        "{}",
        host_strings.get_formatted("host.locale.changed", &[("locale", locale.tag().as_str())])
    );
}

fn log_titles(host: &ModuleHost) {
    for id in host.active_ids() {
        let title = host.title(id).unwrap_or_default();
        let icon = host
            .icon(id)
            .flatten()
            .map(|icon| icon.name)
            .unwrap_or_else(|| "default".to_string());
        info!("  {} \"{}\" (icon: {})", id, title, icon);
    }
}
