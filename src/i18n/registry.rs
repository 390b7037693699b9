//! Locale registry: tracks every reloadable provider and broadcasts locale
//! changes to them.
//!
//! The registry is an ordinary owned value. Whoever decides the active
//! locale holds it (or an `Arc` of it) and calls
//! [`LocaleRegistry::broadcast_locale_change`]; providers never see it.

use crate::i18n::{Locale, Reloadable};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registry of reloadable providers, in registration order.
#[derive(Default)]
pub struct LocaleRegistry {
    providers: RwLock<Vec<Arc<dyn Reloadable>>>,

    /// Held for the whole of a broadcast
    broadcast_lock: Mutex<()>,

    current_locale: RwLock<Option<Locale>>,
    broadcasts: AtomicUsize,
}

/// One provider's failed reload.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: String,
}

/// Outcome of a broadcast.
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastReport {
    pub locale: Locale,

    /// Providers that were sent this broadcast
    pub attempted: usize,

    /// Names of providers that reloaded
    pub reloaded: Vec<String>,

    pub failures: Vec<ProviderFailure>,
    pub completed_at: DateTime<Utc>,
}

impl BroadcastReport {
    /// Whether every provider sent this broadcast reloaded.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

fn same_provider(a: &Arc<dyn Reloadable>, b: &Arc<dyn Reloadable>) -> bool {
    // Compare data pointers only; vtable pointers for one type may differ
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

impl LocaleRegistry {
    /// Create a registry with no providers and no locale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Registering the same provider again is a no-op.
    ///
    /// # Returns
    /// `true` if the provider was newly added.
    pub fn register(&self, provider: Arc<dyn Reloadable>) -> bool {
        let mut providers = self.providers.write();

        if providers.iter().any(|p| same_provider(p, &provider)) {
            debug!("Provider '{}' already registered", provider.name());
            return false;
        }

        debug!("Registered provider '{}'", provider.name());
        providers.push(provider);
        true
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }

    /// Locale of the most recent broadcast, if any.
    pub fn current_locale(&self) -> Option<Locale> {
        self.current_locale.read().clone()
    }

    /// Number of broadcasts completed so far.
    ///
    /// # Returns
    /// Count of calls to `broadcast_locale_change` that have finished,
    /// whether or not every provider reloaded.
    pub fn broadcast_count(&self) -> usize {
        self.broadcasts.load(Ordering::Relaxed)
    }

    /// Reload every registered provider for `locale`, in registration order.
    ///
    /// The provider list is snapshotted when the broadcast starts; a
    /// provider registered while it runs receives the next broadcast.
    /// A provider that fails keeps its previous strings and does not stop
    /// the others.
    pub fn broadcast_locale_change(&self, locale: &Locale) -> BroadcastReport {
        let _guard = self.broadcast_lock.lock();

        let providers: Vec<Arc<dyn Reloadable>> = self.providers.read().clone();
        info!("Broadcasting locale change to {} ({} providers)", locale, providers.len());

        let mut reloaded = Vec::new();
        let mut failures = Vec::new();

        for provider in &providers {
            match provider.load(locale) {
                Ok(()) => reloaded.push(provider.name().to_string()),
                Err(e) => {
                    warn!(
                        "Provider '{}' failed to reload for {}: {}",
                        provider.name(),
                        locale,
                        e
                    );
                    failures.push(ProviderFailure {
                        provider: provider.name().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        *self.current_locale.write() = Some(locale.clone());
        self.broadcasts.fetch_add(1, Ordering::Relaxed);

        if failures.is_empty() {
            info!("✓ Locale {} applied to all {} providers", locale, reloaded.len());
        } else {
            warn!(
                "Locale {} applied to {} of {} providers",
                locale,
                reloaded.len(),
                providers.len()
            );
        }

        BroadcastReport {
            locale: locale.clone(),
            attempted: providers.len(),
            reloaded,
            failures,
            completed_at: Utc::now(),
        }
    }
}
