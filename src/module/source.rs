//! Factory-backed Module Source
//!
//! A module source built from an explicit, ordered list of factories. Used
//! by embedders that assemble their module set in code, and by tests.

use crate::module::error::ModuleResult;
use crate::module::traits::{Module, ModuleSource};
use std::sync::Arc;

/// Factory producing a fresh module instance
pub type ModuleFactory = Arc<dyn Fn() -> Arc<dyn Module> + Send + Sync>;

/// Module source that calls each factory on every reload
#[derive(Default, Clone)]
pub struct FactoryModuleSource {
    factories: Vec<ModuleFactory>,
}

impl FactoryModuleSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a factory; modules are produced in insertion order
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Module> + Send + Sync + 'static,
    {
        self.factories.push(Arc::new(factory));
        self
    }

    /// Number of registered factories
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no factories are registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    fn build(&self) -> Vec<Arc<dyn Module>> {
        self.factories.iter().map(|factory| factory()).collect()
    }
}

impl std::fmt::Debug for FactoryModuleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryModuleSource")
            .field("factories", &self.factories.len())
            .finish()
    }
}

#[async_trait::async_trait]
impl ModuleSource for FactoryModuleSource {
    async fn reload(&self) -> ModuleResult<Vec<Arc<dyn Module>>> {
        let modules = self.build();
        log::debug!("Factory source produced {} modules", modules.len());
        Ok(modules)
    }

    fn available_modules(&self) -> Vec<Arc<dyn Module>> {
        self.build()
    }
}
