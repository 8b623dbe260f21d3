//! Service Context
//!
//! The registry interface handed to modules during activation. Each context
//! is stamped with the epoch of the transition that created it; calls made
//! through a context from an earlier epoch are ignored, so nothing a module
//! registers in one transition is ever visible in the next.

use crate::core::sync::handle_mutex_poison;
use crate::registry::error::{RegistryError, RegistryResult};
use crate::registry::state::{PendingConsumer, RegistryState, Subscription};
use crate::registry::waiter::ServiceWaiter;
use crate::service::api::{ServiceHandle, ServiceInstance};
use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

/// Registry tables shared between the coordinator and every context
pub(crate) struct RegistryShared {
    state: Mutex<RegistryState>,
}

impl RegistryShared {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::new()),
        }
    }

    /// Lock the tables for mutation
    pub(crate) fn lock(&self) -> RegistryResult<MutexGuard<'_, RegistryState>> {
        handle_mutex_poison(self.state.lock(), |message| RegistryError::Internal {
            message,
        })
    }

    /// Lock the tables, recovering the guard if a previous holder panicked
    pub(crate) fn lock_unpoisoned(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registry interface for one module within one transition
#[derive(Clone)]
pub struct ServiceContext {
    shared: Arc<RegistryShared>,
    epoch: u64,
    module: Arc<str>,
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("module", &self.module)
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl ServiceContext {
    pub(crate) fn new(shared: Arc<RegistryShared>, epoch: u64, module: &str) -> Self {
        Self {
            shared,
            epoch,
            module: Arc::from(module),
        }
    }

    /// Name of the module this context belongs to
    pub fn module_name(&self) -> &str {
        &self.module
    }

    /// Epoch of the transition this context was created for
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether this context still belongs to the registry's current epoch
    pub fn is_current(&self) -> bool {
        self.shared.lock_unpoisoned().epoch == self.epoch
    }

    /// Subscribe to a service
    ///
    /// If a provider is already recorded the handler runs before this call
    /// returns. Otherwise it runs once, later: with the provider when one is
    /// registered in this transition, or with `None` when the transition ends
    /// without one. The handler may call back into the registry.
    pub fn consume_service<F>(&self, handle: ServiceHandle, handler: F) -> RegistryResult<()>
    where
        F: FnOnce(Option<ServiceInstance>) + Send + 'static,
    {
        let consumer = PendingConsumer::new(Arc::clone(&self.module), Box::new(handler));

        let outcome = {
            let mut state = self.shared.lock()?;
            if state.epoch != self.epoch {
                log::debug!(
                    "Ignoring subscription to '{}' from module '{}' (epoch {} has ended)",
                    handle,
                    self.module,
                    self.epoch
                );
                return Ok(());
            }
            state.subscribe(handle, consumer)
        };

        if let Subscription::Resolved(consumer, service) = outcome {
            consumer.notify(service);
        }
        Ok(())
    }

    /// Subscribe to a service and receive the result through a future
    ///
    /// The waiter resolves to the provider, to `None` when the transition
    /// ends without one, or to [`RegistryError::SubscriptionDiscarded`] when
    /// the subscription was dropped (for instance because this context's
    /// epoch has already ended).
    ///
    /// Awaiting the waiter inside `Module::activate` for a service nobody
    /// provides does not resolve until activation has finished; spawn a task
    /// to await it instead.
    pub fn await_service(&self, handle: ServiceHandle) -> RegistryResult<ServiceWaiter> {
        let (tx, rx) = oneshot::channel();
        self.consume_service(handle.clone(), move |service| {
            let _ = tx.send(service);
        })?;
        Ok(ServiceWaiter::new(handle, rx))
    }

    /// Register a value as the provider of a service
    ///
    /// Returns `true` if the value was recorded. The first provider wins;
    /// later providers for the same handle are ignored.
    pub fn provide_service<T: Any + Send + Sync>(
        &self,
        handle: ServiceHandle,
        value: T,
    ) -> RegistryResult<bool> {
        let instance = ServiceInstance::new(Arc::clone(&self.module), value);
        self.provide_instance(handle, instance)
    }

    /// Register an existing instance as the provider of a service
    pub fn provide_instance(
        &self,
        handle: ServiceHandle,
        instance: ServiceInstance,
    ) -> RegistryResult<bool> {
        let waiting = {
            let mut state = self.shared.lock()?;
            if state.epoch != self.epoch {
                log::debug!(
                    "Ignoring provider for '{}' from module '{}' (epoch {} has ended)",
                    handle,
                    self.module,
                    self.epoch
                );
                return Ok(false);
            }
            match state.provide(handle.clone(), instance.clone()) {
                Some(waiting) => waiting,
                None => {
                    log::debug!(
                        "Ignoring provider for '{}' from module '{}'; service already provided or transition complete",
                        handle,
                        self.module
                    );
                    return Ok(false);
                }
            }
        };

        log::trace!(
            "Module '{}' provides '{}' ({} waiting)",
            self.module,
            handle,
            waiting.len()
        );
        for consumer in waiting {
            consumer.notify(Some(instance.clone()));
        }
        Ok(true)
    }

    /// Current provider of a service, if any
    pub fn lookup(&self, handle: &ServiceHandle) -> Option<ServiceInstance> {
        let state = self.shared.lock_unpoisoned();
        if state.epoch != self.epoch {
            return None;
        }
        state.providers.get(handle).cloned()
    }
}
