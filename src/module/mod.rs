//! Pluggable module contract.
//!
//! A module is constructed by a [`ModuleFactory`], answers `title`, `icon`
//! and `display_surface` from the moment it exists, and is disposed exactly
//! once by its host. Lifecycle: `Constructed → Active → Disposed`; there is
//! no explicit activation step.

mod host;
mod localized;

pub use host::{ModuleHost, ModuleId};
pub use localized::{LocalizedModule, LocalizedModuleFactory};

use crate::i18n::MessageProvider;
use anyhow::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SURFACE: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of the UI region a module owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u64);

impl SurfaceId {
    /// Allocate a surface identity unique within this process.
    pub fn allocate() -> Self {
        SurfaceId(NEXT_SURFACE.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, for hosts that key surfaces by integer.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Named icon handle; rendering is the host's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub name: String,
}

impl Icon {
    /// Icon resolved by the host from `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    Active,
    Disposed,
}

/// A pluggable unit of functionality with a display surface.
pub trait Module: Send {
    /// Short, non-empty display label.
    fn title(&self) -> String;

    /// `None` means the host renders its default icon.
    fn icon(&self) -> Option<Icon>;

    /// Same value for the whole life of the instance.
    fn display_surface(&self) -> SurfaceId;

    /// Release held resources. A second call is a no-op.
    fn dispose(&mut self);
}

/// Constructs modules. Construction failures are reported through `Result`.
pub trait ModuleFactory: Send + Sync {
    fn name(&self) -> &str;

    fn create(&self, ctx: &ModuleContext) -> Result<Box<dyn Module>>;
}

/// What a host hands to factories: the message providers, by bundle name.
#[derive(Debug, Clone, Default)]
pub struct ModuleContext {
    providers: HashMap<String, Arc<MessageProvider>>,
}

impl ModuleContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer `provider` to factories under its bundle name. A later
    /// provider for the same bundle replaces the earlier one.
    pub fn with_provider(mut self, provider: Arc<MessageProvider>) -> Self {
        self.providers
            .insert(provider.bundle().to_string(), provider);
        self
    }

    /// Provider for `bundle`, if the host supplies one.
    ///
    /// # Arguments
    /// * `bundle` - Bundle name, as passed to `MessageProvider::new`
    pub fn provider(&self, bundle: &str) -> Option<Arc<MessageProvider>> {
        self.providers.get(bundle).cloned()
    }
}
