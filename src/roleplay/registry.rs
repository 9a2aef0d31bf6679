//! Item catalog, use-handler table and job catalog.
//!
//! All three tables are filled through a [`RegistryBuilder`] during startup and then
//! frozen into an immutable [`Registry`] that is shared by `Arc`. Nothing can be
//! registered after [`RegistryBuilder::build`], so dispatch never races registration.

use std::collections::HashMap;
use std::sync::Arc;

use log::warn;

use super::effects::UseEffect;
use super::errors::{RoleplayError, RoleplayResult};
use super::types::{ItemDefinition, JobDefinition};

/// How a second registration under an existing key is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationMode {
    /// Later registration wins; a warning is logged
    #[default]
    Lenient,
    /// Duplicate registration is a startup error
    Strict,
}

impl RegistrationMode {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            RegistrationMode::Strict
        } else {
            RegistrationMode::Lenient
        }
    }
}

// ============================================================================
// Item Catalog
// ============================================================================

/// Item id → definition, iterable in insertion order.
#[derive(Debug, Default)]
pub struct ItemCatalog {
    order: Vec<String>,
    items: HashMap<String, ItemDefinition>,
}

impl ItemCatalog {
    /// Insert or overwrite by id. Returns the replaced definition, if any.
    pub fn register(&mut self, definition: ItemDefinition) -> RoleplayResult<Option<ItemDefinition>> {
        if definition.id.trim().is_empty() || definition.name.trim().is_empty() {
            return Err(RoleplayError::InvalidArgument(
                "item id and name must not be empty".to_string(),
            ));
        }
        let id = definition.id.clone();
        let previous = self.items.insert(id.clone(), definition);
        match &previous {
            Some(old) => warn!("item {} re-registered; replacing '{}'", id, old.name),
            None => self.order.push(id),
        }
        Ok(previous)
    }

    pub fn lookup(&self, id: &str) -> Option<&ItemDefinition> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn list_all(&self) -> Vec<&ItemDefinition> {
        self.order.iter().filter_map(|id| self.items.get(id)).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// Use-Handler Table
// ============================================================================

/// Item display name → use effect.
#[derive(Default)]
pub struct UseHandlerTable {
    handlers: HashMap<String, Arc<dyn UseEffect>>,
}

impl UseHandlerTable {
    /// Insert or overwrite by item name. Returns true when an effect was replaced.
    pub fn register(&mut self, item_name: &str, effect: Arc<dyn UseEffect>) -> bool {
        let replaced = self.handlers.insert(item_name.to_string(), effect).is_some();
        if replaced {
            warn!("use handler for '{}' re-registered; last registration wins", item_name);
        }
        replaced
    }

    pub fn lookup(&self, item_name: &str) -> Option<Arc<dyn UseEffect>> {
        self.handlers.get(item_name).cloned()
    }

    pub fn contains(&self, item_name: &str) -> bool {
        self.handlers.contains_key(item_name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

// ============================================================================
// Job Catalog
// ============================================================================

#[derive(Debug, Default)]
pub struct JobCatalog {
    order: Vec<String>,
    jobs: HashMap<String, JobDefinition>,
}

impl JobCatalog {
    pub fn register(&mut self, job: JobDefinition) -> RoleplayResult<bool> {
        if job.name.trim().is_empty() {
            return Err(RoleplayError::InvalidArgument(
                "job name must not be empty".to_string(),
            ));
        }
        let name = job.name.clone();
        let replaced = self.jobs.insert(name.clone(), job).is_some();
        if replaced {
            warn!("job {} re-registered; ranks replaced", name);
        } else {
            self.order.push(name);
        }
        Ok(replaced)
    }

    pub fn lookup(&self, name: &str) -> Option<&JobDefinition> {
        self.jobs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.jobs.contains_key(name)
    }

    pub fn list_all(&self) -> Vec<&JobDefinition> {
        self.order.iter().filter_map(|n| self.jobs.get(n)).collect()
    }
}

// ============================================================================
// Builder / frozen registry
// ============================================================================

/// Mutable registration phase.
#[derive(Default)]
pub struct RegistryBuilder {
    mode: RegistrationMode,
    items: ItemCatalog,
    handlers: UseHandlerTable,
    jobs: JobCatalog,
}

impl RegistryBuilder {
    pub fn new(mode: RegistrationMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> RegistrationMode {
        self.mode
    }

    /// Register a catalog entry without a use effect.
    pub fn register_item(&mut self, definition: ItemDefinition) -> RoleplayResult<()> {
        if self.mode == RegistrationMode::Strict && self.items.contains(&definition.id) {
            return Err(RoleplayError::DuplicateRegistration(format!(
                "item {}",
                definition.id
            )));
        }
        self.items.register(definition)?;
        Ok(())
    }

    /// Register a catalog entry and the effect used for it, keyed by display name.
    pub fn register_item_use(
        &mut self,
        definition: ItemDefinition,
        effect: impl UseEffect + 'static,
    ) -> RoleplayResult<()> {
        let name = definition.name.clone();
        if self.mode == RegistrationMode::Strict && self.handlers.contains(&name) {
            return Err(RoleplayError::DuplicateRegistration(format!(
                "use handler {}",
                name
            )));
        }
        self.register_item(definition)?;
        self.handlers.register(&name, Arc::new(effect));
        Ok(())
    }

    pub fn register_job(&mut self, job: JobDefinition) -> RoleplayResult<()> {
        if self.mode == RegistrationMode::Strict && self.jobs.contains(&job.name) {
            return Err(RoleplayError::DuplicateRegistration(format!("job {}", job.name)));
        }
        self.jobs.register(job)?;
        Ok(())
    }

    /// Freeze registration.
    pub fn build(self) -> Registry {
        log::info!(
            "registry frozen: {} items, {} use handlers, {} jobs",
            self.items.len(),
            self.handlers.len(),
            self.jobs.order.len()
        );
        Registry {
            items: self.items,
            handlers: self.handlers,
            jobs: self.jobs,
        }
    }
}

/// Read-only registry consulted by the dispatcher and ledger services.
pub struct Registry {
    items: ItemCatalog,
    handlers: UseHandlerTable,
    jobs: JobCatalog,
}

impl Registry {
    pub fn item(&self, id: &str) -> Option<&ItemDefinition> {
        self.items.lookup(id)
    }

    pub fn items(&self) -> Vec<&ItemDefinition> {
        self.items.list_all()
    }

    pub fn use_handler(&self, item_name: &str) -> Option<Arc<dyn UseEffect>> {
        self.handlers.lookup(item_name)
    }

    pub fn job(&self, name: &str) -> Option<&JobDefinition> {
        self.jobs.lookup(name)
    }

    pub fn jobs(&self) -> Vec<&JobDefinition> {
        self.jobs.list_all()
    }
}
