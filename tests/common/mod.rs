//! Common test utilities and helpers

#![allow(dead_code)]

use hotmod::module::api::{ClockModule, FactoryModuleSource, HeartbeatModule, Module};
use hotmod::registry::api::{RegistryConfig, ServiceRegistry};
use std::sync::Arc;
use std::time::Duration;

/// Registry tunables suited to tests
pub fn test_registry_config() -> RegistryConfig {
    RegistryConfig::default().with_watchdog_delay(Duration::from_millis(100))
}

/// Registry over an explicit module source
pub fn registry_with(source: FactoryModuleSource) -> ServiceRegistry {
    ServiceRegistry::with_config(Arc::new(source), test_registry_config())
}

/// Source producing a fresh clock and a fast heartbeat on every reload
pub fn clock_and_heartbeat_source() -> FactoryModuleSource {
    FactoryModuleSource::new()
        .with_factory(|| Arc::new(ClockModule::new()) as Arc<dyn Module>)
        .with_factory(|| {
            Arc::new(HeartbeatModule::with_interval(Duration::from_millis(20))) as Arc<dyn Module>
        })
}

/// Poll `condition` until it holds or `limit` elapses
pub async fn wait_until<F: Fn() -> bool>(condition: F, limit: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
