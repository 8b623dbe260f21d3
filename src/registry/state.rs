//! Registry State
//!
//! The tables owned by the registry: active modules, the provider table and
//! the consumer waitlist, plus the transition phase and epoch. Everything
//! here is plain table manipulation; consumer handlers are handed back to
//! the caller and invoked only after the registry lock has been released.

use crate::module::api::Module;
use crate::service::api::{ServiceHandle, ServiceInstance};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Phase of the registry's transition state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TransitionPhase {
    /// No transition running
    Idle,
    /// Previously active modules are being deactivated
    Deactivating,
    /// The incoming module set is being activated
    Activating,
}

/// Handler invoked exactly once with the provider, or `None` when absent
pub(crate) type ConsumerHandler = Box<dyn FnOnce(Option<ServiceInstance>) + Send + 'static>;

/// A consumer waiting for a provider
pub(crate) struct PendingConsumer {
    module: Arc<str>,
    handler: ConsumerHandler,
}

impl PendingConsumer {
    pub(crate) fn new(module: Arc<str>, handler: ConsumerHandler) -> Self {
        Self { module, handler }
    }

    /// Module that registered the subscription
    pub(crate) fn module(&self) -> &str {
        &self.module
    }

    /// Resolve the subscription, consuming it
    ///
    /// A panic in the handler is logged against the subscribing module and
    /// contained, so the caller goes on to notify the remaining consumers.
    pub(crate) fn notify(self, service: Option<ServiceInstance>) {
        let PendingConsumer { module, handler } = self;
        if let Err(payload) = catch_unwind(AssertUnwindSafe(move || handler(service))) {
            log::error!(
                "Service handler registered by module '{}' panicked: {}",
                module,
                panic_message(payload.as_ref())
            );
        }
    }
}

/// Text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Outcome of subscribing to a handle
pub(crate) enum Subscription {
    /// A provider is known (or the epoch is sealed); invoke the consumer now
    Resolved(PendingConsumer, Option<ServiceInstance>),
    /// The consumer was appended to the waitlist
    Queued,
}

/// All registry tables, guarded together by one lock
pub(crate) struct RegistryState {
    pub(crate) phase: TransitionPhase,
    /// Incremented at the start of every transition
    pub(crate) epoch: u64,
    /// Set once the epoch's final waitlist sweep has run
    pub(crate) sealed: bool,
    pub(crate) active: HashMap<String, Arc<dyn Module>>,
    pub(crate) providers: HashMap<ServiceHandle, ServiceInstance>,
    pub(crate) waitlist: HashMap<ServiceHandle, Vec<PendingConsumer>>,
}

impl Default for RegistryState {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryState {
    pub(crate) fn new() -> Self {
        Self {
            phase: TransitionPhase::Idle,
            epoch: 0,
            sealed: true,
            active: HashMap::new(),
            providers: HashMap::new(),
            waitlist: HashMap::new(),
        }
    }

    /// Record a consumer, or hand it back for immediate resolution
    pub(crate) fn subscribe(
        &mut self,
        handle: ServiceHandle,
        consumer: PendingConsumer,
    ) -> Subscription {
        if let Some(provider) = self.providers.get(&handle) {
            return Subscription::Resolved(consumer, Some(provider.clone()));
        }
        if self.sealed {
            return Subscription::Resolved(consumer, None);
        }
        log::trace!(
            "Module '{}' waiting for service '{}'",
            consumer.module(),
            handle
        );
        self.waitlist.entry(handle).or_default().push(consumer);
        Subscription::Queued
    }

    /// Test-and-set a provider
    ///
    /// Returns the consumers waiting on `handle`, in subscription order, when
    /// the provider was recorded. Returns `None` when a provider already
    /// exists or the epoch is sealed.
    pub(crate) fn provide(
        &mut self,
        handle: ServiceHandle,
        provider: ServiceInstance,
    ) -> Option<Vec<PendingConsumer>> {
        if self.sealed || self.providers.contains_key(&handle) {
            return None;
        }
        let waiting = self.waitlist.remove(&handle).unwrap_or_default();
        self.providers.insert(handle, provider);
        Some(waiting)
    }

    /// Start a new epoch with empty tables
    ///
    /// Unresolved consumers from the previous epoch are dropped without
    /// notification; the number dropped is returned.
    pub(crate) fn open_epoch(&mut self) -> usize {
        let discarded = self.waitlist.values().map(Vec::len).sum();
        self.providers.clear();
        self.waitlist.clear();
        self.sealed = false;
        discarded
    }

    /// Remove every unresolved subscription and seal the epoch
    ///
    /// Handles are returned in sorted order, consumers in subscription order.
    pub(crate) fn seal_epoch(&mut self) -> Vec<(ServiceHandle, Vec<PendingConsumer>)> {
        self.sealed = true;
        let mut unmet: Vec<_> = self.waitlist.drain().collect();
        unmet.sort_by(|a, b| a.0.cmp(&b.0));
        unmet
    }

    /// Handles with consumers still waiting, and the modules waiting on each
    ///
    /// Sorted by handle; module names in subscription order.
    pub(crate) fn waiting_modules(&self) -> Vec<(ServiceHandle, Vec<String>)> {
        let mut waiting: Vec<(ServiceHandle, Vec<String>)> = self
            .waitlist
            .iter()
            .map(|(handle, consumers)| {
                let modules = consumers.iter().map(|c| c.module().to_string()).collect();
                (handle.clone(), modules)
            })
            .collect();
        waiting.sort_by(|a, b| a.0.cmp(&b.0));
        waiting
    }
}
