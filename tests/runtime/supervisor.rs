//! Supervisor integration tests

use crate::common::{clock_and_heartbeat_source, registry_with};
use hotmod::app::supervisor::Supervisor;
use hotmod::core::signals::TriggerRequest;
use hotmod::module::api::CLOCK;
use hotmod::registry::api::TransitionPhase;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_supervisor_serves_requests_from_another_task() {
    let supervisor = Supervisor::new(registry_with(clock_and_heartbeat_source()));
    let handle = supervisor.handle();
    let registry = supervisor.registry();

    let running = tokio::spawn(supervisor.run());

    // Requests are queued while the initial reload runs
    handle.send(TriggerRequest::Reload).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(registry.epoch(), 2);
    assert_eq!(registry.active_modules(), vec!["clock", "heartbeat"]);
    assert!(registry.lookup(&CLOCK).is_some());

    handle.send(TriggerRequest::Teardown).await.unwrap();
    let summary = tokio::time::timeout(Duration::from_secs(2), running)
        .await
        .expect("supervisor should stop after teardown")
        .unwrap()
        .unwrap();

    assert_eq!(summary.epoch, 3);
    assert_eq!(registry.phase(), TransitionPhase::Idle);
    assert!(registry.active_modules().is_empty());
}
