//! Builtin module integration tests

use crate::common::{clock_and_heartbeat_source, registry_with, test_registry_config, wait_until};
use hotmod::module::api::{BuiltinModuleSource, Clock, ClockModule, HeartbeatModule, Module, CLOCK};
use hotmod::registry::api::{ServiceRegistry, TransitionPhase};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_builtin_source_activates_clock_and_heartbeat() {
    let registry = ServiceRegistry::with_config(
        Arc::new(BuiltinModuleSource::new()),
        test_registry_config(),
    );

    let mut available: Vec<String> = registry
        .available_modules()
        .iter()
        .map(|m| m.name().to_string())
        .collect();
    available.sort();
    assert_eq!(available, vec!["clock", "heartbeat"]);

    let summary = registry.reload_modules().await.unwrap();
    assert_eq!(summary.activated, vec!["clock", "heartbeat"]);
    assert!(summary.unmet.is_empty());
    assert_eq!(registry.provided_services(), vec![CLOCK]);

    let clock = registry
        .lookup(&CLOCK)
        .and_then(|s| s.downcast::<Clock>())
        .expect("clock should be provided");
    assert_eq!(clock.epoch(), summary.epoch);

    registry.teardown().await.unwrap();
    assert_eq!(registry.phase(), TransitionPhase::Idle);
}

#[tokio::test]
async fn test_excluded_builtin_is_not_activated() {
    let registry = ServiceRegistry::with_config(
        Arc::new(BuiltinModuleSource::with_excludes(&["clock"])),
        test_registry_config(),
    );

    let summary = registry.reload_modules().await.unwrap();
    assert_eq!(summary.activated, vec!["heartbeat"]);
    assert_eq!(summary.unmet, vec![CLOCK]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_heartbeat_runs_while_clock_present() {
    let registry = registry_with(Default::default());
    let heartbeat = Arc::new(HeartbeatModule::with_interval(Duration::from_millis(10)));
    let modules: Vec<Arc<dyn Module>> = vec![
        Arc::new(ClockModule::new()),
        Arc::clone(&heartbeat) as Arc<dyn Module>,
    ];

    registry.transition(modules).await.unwrap();
    assert!(heartbeat.is_beating());

    // Stays up across several ticks
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(heartbeat.is_beating());

    registry.teardown().await.unwrap();
    assert!(!heartbeat.is_beating());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_heartbeat_stops_without_clock() {
    let registry = registry_with(Default::default());
    let heartbeat = Arc::new(HeartbeatModule::with_interval(Duration::from_millis(10)));

    let summary = registry
        .transition(vec![Arc::clone(&heartbeat) as Arc<dyn Module>])
        .await
        .unwrap();

    assert_eq!(summary.unmet, vec![CLOCK]);
    assert!(wait_until(|| !heartbeat.is_beating(), Duration::from_secs(1)).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reload_provides_fresh_clock() {
    let registry = registry_with(clock_and_heartbeat_source());

    registry.reload_modules().await.unwrap();
    let first = registry.lookup(&CLOCK).unwrap();

    let summary = registry.reload_modules().await.unwrap();
    let second = registry.lookup(&CLOCK).unwrap();

    assert!(!first.same_instance(&second));
    assert_eq!(summary.deactivated, vec!["clock", "heartbeat"]);
    assert_eq!(
        second.downcast::<Clock>().map(|c| c.epoch()),
        Some(summary.epoch)
    );
}
