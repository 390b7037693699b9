//! Reference host lifecycle manager.
//!
//! The host owns every active module, guards access after disposal, and
//! guarantees `dispose` runs exactly once per module.

use crate::module::{Icon, Module, ModuleContext, ModuleFactory, SurfaceId};
use anyhow::{Context, Result};
use std::fmt;
use tracing::{info, warn};

/// Host-assigned handle for an activated module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(u64);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module#{}", self.0)
    }
}

struct ActiveModule {
    id: ModuleId,
    factory: String,
    module: Box<dyn Module>,
}

/// Activates modules and disposes them on deactivation or shutdown.
#[derive(Default)]
pub struct ModuleHost {
    /// In activation order
    active: Vec<ActiveModule>,
    next_id: u64,
}

impl ModuleHost {
    /// Create a host with no active modules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a module from `factory` and take ownership of it.
    pub fn activate(
        &mut self,
        factory: &dyn ModuleFactory,
        ctx: &ModuleContext,
    ) -> Result<ModuleId> {
        let module = factory
            .create(ctx)
            .with_context(|| format!("Failed to construct module '{}'", factory.name()))?;

        self.next_id += 1;
        let id = ModuleId(self.next_id);

        info!(
            "Activated {} from '{}': \"{}\" on {}",
            id,
            factory.name(),
            module.title(),
            module.display_surface()
        );

        self.active.push(ActiveModule {
            id,
            factory: factory.name().to_string(),
            module,
        });
        Ok(id)
    }

    fn find(&self, id: ModuleId) -> Option<&dyn Module> {
        self.active
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.module.as_ref())
    }

    /// Title of an active module; `None` once deactivated.
    pub fn title(&self, id: ModuleId) -> Option<String> {
        self.find(id).map(|m| m.title())
    }

    /// Icon of an active module. The outer `None` means unknown module,
    /// the inner one means "use the default icon".
    pub fn icon(&self, id: ModuleId) -> Option<Option<Icon>> {
        self.find(id).map(|m| m.icon())
    }

    /// Surface an active module renders on; `None` once deactivated.
    pub fn display_surface(&self, id: ModuleId) -> Option<SurfaceId> {
        self.find(id).map(|m| m.display_surface())
    }

    pub fn is_active(&self, id: ModuleId) -> bool {
        self.find(id).is_some()
    }

    /// Handles of every active module, in activation order.
    pub fn active_ids(&self) -> Vec<ModuleId> {
        self.active.iter().map(|m| m.id).collect()
    }

    /// Number of active modules.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Dispose one module and forget it.
    ///
    /// # Returns
    /// `false` if the module was not active.
    pub fn deactivate(&mut self, id: ModuleId) -> bool {
        let Some(index) = self.active.iter().position(|m| m.id == id) else {
            warn!("Deactivation requested for unknown {}", id);
            return false;
        };

        let mut entry = self.active.remove(index);
        entry.module.dispose();
        info!("Deactivated {} ('{}')", entry.id, entry.factory);
        true
    }

    /// Dispose every active module, most recently activated first.
    ///
    /// # Returns
    /// Number of modules disposed.
    pub fn shutdown(&mut self) -> usize {
        let count = self.active.len();
        while let Some(mut entry) = self.active.pop() {
            entry.module.dispose();
            info!("Deactivated {} ('{}')", entry.id, entry.factory);
        }
        if count > 0 {
            info!("✓ Host shut down {} modules", count);
        }
        count
    }
}

impl Drop for ModuleHost {
    fn drop(&mut self) {
        self.shutdown();
    }
}
