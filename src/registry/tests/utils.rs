//! Shared helpers for registry tests

use crate::module::api::{FactoryModuleSource, Module, ModuleError, ModuleResult};
use crate::registry::api::{RegistryConfig, ServiceContext, ServiceRegistry};
use crate::service::api::{ServiceHandle, ServiceInstance};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(super) const CONNECTION: ServiceHandle = ServiceHandle::named("connection");
pub(super) const WINDOW: ServiceHandle = ServiceHandle::named("window");

/// Value provided by test modules
#[derive(Debug, PartialEq)]
pub(super) struct Payload(pub u32);

/// Notifications received by a consuming test module
pub(super) type Received = Arc<Mutex<Vec<(ServiceHandle, Option<ServiceInstance>)>>>;

/// Lifecycle counters, shareable across fresh instances
#[derive(Debug, Default)]
pub(super) struct Counters {
    pub activations: AtomicUsize,
    pub deactivations: AtomicUsize,
}

impl Counters {
    pub(super) fn activations(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }

    pub(super) fn deactivations(&self) -> usize {
        self.deactivations.load(Ordering::SeqCst)
    }
}

/// Configurable module for exercising the registry
pub(super) struct TestModule {
    name: String,
    provides: Vec<(ServiceHandle, u32)>,
    consumes: Vec<ServiceHandle>,
    delay: Duration,
    failure: Option<String>,
    panics: bool,
    pub(super) received: Received,
    pub(super) counters: Arc<Counters>,
    pub(super) context: Mutex<Option<ServiceContext>>,
}

impl TestModule {
    pub(super) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            provides: Vec::new(),
            consumes: Vec::new(),
            delay: Duration::ZERO,
            failure: None,
            panics: false,
            received: Arc::new(Mutex::new(Vec::new())),
            counters: Arc::new(Counters::default()),
            context: Mutex::new(None),
        }
    }

    pub(super) fn providing(mut self, handle: ServiceHandle, value: u32) -> Self {
        self.provides.push((handle, value));
        self
    }

    pub(super) fn consuming(mut self, handle: ServiceHandle) -> Self {
        self.consumes.push(handle);
        self
    }

    /// Sleep before subscribing or providing
    pub(super) fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(super) fn failing(mut self, cause: &str) -> Self {
        self.failure = Some(cause.to_string());
        self
    }

    pub(super) fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    pub(super) fn with_counters(mut self, counters: Arc<Counters>) -> Self {
        self.counters = counters;
        self
    }

    pub(super) fn build(self) -> Arc<TestModule> {
        Arc::new(self)
    }

    /// Snapshot of received notifications
    pub(super) fn received(&self) -> Vec<(ServiceHandle, Option<ServiceInstance>)> {
        self.received.lock().unwrap().clone()
    }

    /// The context this module was last activated with
    pub(super) fn last_context(&self) -> ServiceContext {
        self.context
            .lock()
            .unwrap()
            .clone()
            .expect("module was never activated")
    }
}

#[async_trait::async_trait]
impl Module for TestModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn activate(&self, services: ServiceContext) -> ModuleResult<()> {
        self.counters.activations.fetch_add(1, Ordering::SeqCst);
        *self.context.lock().unwrap() = Some(services.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        for handle in &self.consumes {
            let received = Arc::clone(&self.received);
            let key = handle.clone();
            services.consume_service(handle.clone(), move |service| {
                received.lock().unwrap().push((key, service));
            })?;
        }

        for (handle, value) in &self.provides {
            services.provide_service(handle.clone(), Payload(*value))?;
        }

        if self.panics {
            panic!("module '{}' exploded", self.name);
        }
        if let Some(cause) = &self.failure {
            return Err(ModuleError::activation(&self.name, cause));
        }
        Ok(())
    }

    fn deactivate(&self) {
        self.counters.deactivations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Upcast a list of test modules for `ServiceRegistry::transition`
pub(super) fn modules(list: &[&Arc<TestModule>]) -> Vec<Arc<dyn Module>> {
    list.iter()
        .map(|m| Arc::clone(*m) as Arc<dyn Module>)
        .collect()
}

/// Registry with an empty module source and a short watchdog
pub(super) fn test_registry() -> ServiceRegistry {
    registry_with_source(FactoryModuleSource::new())
}

pub(super) fn registry_with_source(source: FactoryModuleSource) -> ServiceRegistry {
    ServiceRegistry::with_config(
        Arc::new(source),
        RegistryConfig::default().with_watchdog_delay(Duration::from_millis(50)),
    )
}

/// Provided payload value of a notification, if present
pub(super) fn payload(service: &Option<ServiceInstance>) -> Option<u32> {
    service
        .as_ref()
        .and_then(|s| s.downcast::<Payload>())
        .map(|p| p.0)
}
