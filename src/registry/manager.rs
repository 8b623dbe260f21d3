//! Service Registry
//!
//! Central coordinator for the module set and the services its modules
//! provide and consume. Owns the active-module table, the provider table and
//! the consumer waitlist, and drives reload and teardown transitions.

use crate::module::api::{Module, ModuleSource};
use crate::registry::config::RegistryConfig;
use crate::registry::context::{RegistryShared, ServiceContext};
use crate::registry::error::{RegistryError, RegistryResult};
use crate::registry::state::TransitionPhase;
use crate::registry::transition::{run_transition, TransitionKind, TransitionSummary};
use crate::service::api::{ServiceHandle, ServiceInstance};
use std::sync::Arc;

/// Coordinator for module activation and service wiring
///
/// The registry is shared by reference; transitions take `&self` and are
/// serialized by the registry itself. Requesting a transition while one is
/// running returns [`RegistryError::TransitionInProgress`].
pub struct ServiceRegistry {
    shared: Arc<RegistryShared>,
    source: Arc<dyn ModuleSource>,
    config: RegistryConfig,
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("phase", &self.phase())
            .field("epoch", &self.epoch())
            .field("active_modules", &self.active_modules())
            .field("config", &self.config)
            .finish()
    }
}

impl ServiceRegistry {
    /// Create a registry with default configuration
    pub fn new(source: Arc<dyn ModuleSource>) -> Self {
        Self::with_config(source, RegistryConfig::default())
    }

    /// Create a registry with explicit configuration
    pub fn with_config(source: Arc<dyn ModuleSource>, config: RegistryConfig) -> Self {
        Self {
            shared: Arc::new(RegistryShared::new()),
            source,
            config,
        }
    }

    /// Registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Replace the active module set with a fresh one from the module source
    ///
    /// If the source fails, nothing is deactivated and the error is returned.
    pub async fn reload_modules(&self) -> RegistryResult<TransitionSummary> {
        self.ensure_idle()?;
        let modules = self.source.reload().await.map_err(RegistryError::Source)?;
        log::debug!("Module source supplied {} modules", modules.len());
        self.run(modules, TransitionKind::Reload).await
    }

    /// Deactivate every module, leaving the registry empty and idle
    ///
    /// Normally the last transition of a process. A later `reload_modules`
    /// is still accepted and starts from empty tables.
    pub async fn teardown(&self) -> RegistryResult<TransitionSummary> {
        self.run(Vec::new(), TransitionKind::Teardown).await
    }

    /// Replace the active module set with the given modules
    pub async fn transition(
        &self,
        modules: Vec<Arc<dyn Module>>,
    ) -> RegistryResult<TransitionSummary> {
        self.run(modules, TransitionKind::Reload).await
    }

    async fn run(
        &self,
        modules: Vec<Arc<dyn Module>>,
        kind: TransitionKind,
    ) -> RegistryResult<TransitionSummary> {
        run_transition(&self.shared, &self.config, modules, kind).await
    }

    fn ensure_idle(&self) -> RegistryResult<()> {
        match self.phase() {
            TransitionPhase::Idle => Ok(()),
            phase => Err(RegistryError::TransitionInProgress { phase }),
        }
    }

    /// Registry interface for a caller outside the module set
    ///
    /// The context belongs to the current epoch. Between transitions it can
    /// look up providers; subscriptions resolve immediately.
    pub fn context(&self, owner: &str) -> ServiceContext {
        let epoch = self.epoch();
        ServiceContext::new(Arc::clone(&self.shared), epoch, owner)
    }

    /// Modules the source currently offers
    pub fn available_modules(&self) -> Vec<Arc<dyn Module>> {
        self.source.available_modules()
    }

    /// Names of the active modules, sorted
    pub fn active_modules(&self) -> Vec<String> {
        let mut names: Vec<String> = self.shared.lock_unpoisoned().active.keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether a module with this name is active
    pub fn is_module_active(&self, name: &str) -> bool {
        self.shared.lock_unpoisoned().active.contains_key(name)
    }

    /// Handles with a recorded provider, sorted
    pub fn provided_services(&self) -> Vec<ServiceHandle> {
        let mut handles: Vec<ServiceHandle> = self
            .shared
            .lock_unpoisoned()
            .providers
            .keys()
            .cloned()
            .collect();
        handles.sort();
        handles
    }

    /// Handles with consumers still waiting, and how many, sorted by handle
    pub fn pending_consumers(&self) -> Vec<(ServiceHandle, usize)> {
        self.shared
            .lock_unpoisoned()
            .waiting_modules()
            .into_iter()
            .map(|(handle, modules)| (handle, modules.len()))
            .collect()
    }

    /// Current provider of a service
    pub fn lookup(&self, handle: &ServiceHandle) -> Option<ServiceInstance> {
        self.shared.lock_unpoisoned().providers.get(handle).cloned()
    }

    /// Current transition phase
    pub fn phase(&self) -> TransitionPhase {
        self.shared.lock_unpoisoned().phase
    }

    /// Epoch of the most recent transition; 0 before the first one
    pub fn epoch(&self) -> u64 {
        self.shared.lock_unpoisoned().epoch
    }
}
