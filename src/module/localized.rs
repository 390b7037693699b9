//! A module whose title is a localized string.

use crate::i18n::{sentinel, MessageProvider};
use crate::module::{Icon, Module, ModuleContext, ModuleFactory, ModuleState, SurfaceId};
use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::debug;

/// Module that resolves its title through a message provider, so the title
/// follows locale changes broadcast to that provider.
#[derive(Debug)]
pub struct LocalizedModule {
    title_key: String,
    icon: Option<Icon>,
    surface: SurfaceId,

    /// Released on dispose
    provider: Option<Arc<MessageProvider>>,
    state: ModuleState,
}

impl LocalizedModule {
    /// Create an active module bound to `provider`.
    ///
    /// # Arguments
    /// * `provider` - Provider the title is resolved through on every call
    /// * `title_key` - Message key of the title
    /// * `icon` - Optional icon; `None` means the host's default
    pub fn new(
        provider: Arc<MessageProvider>,
        title_key: impl Into<String>,
        icon: Option<Icon>,
    ) -> Self {
        Self {
            title_key: title_key.into(),
            icon,
            surface: SurfaceId::allocate(),
            provider: Some(provider),
            state: ModuleState::Active,
        }
    }

    /// Whether the module has been disposed.
    pub fn state(&self) -> ModuleState {
        self.state
    }

    /// Message key the title is looked up under.
    pub fn title_key(&self) -> &str {
        &self.title_key
    }
}

impl Module for LocalizedModule {
    fn title(&self) -> String {
        let title = self
            .provider
            .as_ref()
            .map(|p| p.get_string(&self.title_key))
            .unwrap_or_else(|| sentinel(&self.title_key));

        if title.is_empty() {
            sentinel(&self.title_key)
        } else {
            title
        }
    }

    fn icon(&self) -> Option<Icon> {
        self.icon.clone()
    }

    fn display_surface(&self) -> SurfaceId {
        self.surface
    }

    fn dispose(&mut self) {
        if self.state == ModuleState::Disposed {
            return;
        }
        self.provider = None;
        self.state = ModuleState::Disposed;
        debug!("Disposed module '{}' ({})", self.title_key, self.surface);
    }
}

/// Builds [`LocalizedModule`]s bound to one bundle's provider.
#[derive(Debug, Clone)]
pub struct LocalizedModuleFactory {
    name: String,
    bundle: String,
    title_key: String,
    icon: Option<Icon>,
}

impl LocalizedModuleFactory {
    /// # Arguments
    /// * `name` - Factory name, used in host logs and errors
    /// * `bundle` - Bundle whose provider the module needs from the context
    /// * `title_key` - Message key of the module's title
    pub fn new(
        name: impl Into<String>,
        bundle: impl Into<String>,
        title_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            bundle: bundle.into(),
            title_key: title_key.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }
}

impl ModuleFactory for LocalizedModuleFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self, ctx: &ModuleContext) -> Result<Box<dyn Module>> {
        let provider = ctx.provider(&self.bundle).ok_or_else(|| {
            anyhow!(
                "Module '{}' needs message bundle '{}', which the host does not provide",
                self.name,
                self.bundle
            )
        })?;

        Ok(Box::new(LocalizedModule::new(
            provider,
            self.title_key.clone(),
            self.icon.clone(),
        )))
    }
}
