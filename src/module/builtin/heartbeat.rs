//! Heartbeat module: periodically logs uptime from the clock service

use crate::module::builtin::clock::Clock;
use crate::module::builtin::CLOCK;
use crate::module::error::ModuleResult;
use crate::module::traits::Module;
use crate::registry::api::ServiceContext;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

pub struct HeartbeatModule {
    interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl HeartbeatModule {
    pub fn new() -> Self {
        Self::with_interval(HEARTBEAT_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            task: Mutex::new(None),
        }
    }

    /// Whether the heartbeat task is currently running
    pub fn is_beating(&self) -> bool {
        match self.task.lock() {
            Ok(task) => task.as_ref().is_some_and(|t| !t.is_finished()),
            Err(_) => false,
        }
    }
}

impl Default for HeartbeatModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Module for HeartbeatModule {
    fn name(&self) -> &str {
        "heartbeat"
    }

    async fn activate(&self, services: ServiceContext) -> ModuleResult<()> {
        // The clock may be provided later in this transition, or never; the
        // waiter resolves either way once activation has finished.
        let waiter = services.await_service(CLOCK)?;
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            let clock = match waiter.await {
                Ok(Some(instance)) => match instance.downcast::<Clock>() {
                    Some(clock) => clock,
                    None => {
                        log::warn!("Clock service has an unexpected type; heartbeat disabled");
                        return;
                    }
                },
                Ok(None) => {
                    log::info!("No clock service available; heartbeat disabled");
                    return;
                }
                Err(e) => {
                    log::debug!("Heartbeat subscription ended: {}", e);
                    return;
                }
            };

            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                log::info!(
                    "Heartbeat: up {}s (epoch {})",
                    clock.uptime().as_secs(),
                    clock.epoch()
                );
            }
        });

        if let Ok(mut task) = self.task.lock() {
            if let Some(previous) = task.replace(handle) {
                previous.abort();
            }
        }
        Ok(())
    }

    fn deactivate(&self) {
        if let Ok(mut task) = self.task.lock() {
            if let Some(handle) = task.take() {
                handle.abort();
            }
        }
    }
}

fn heartbeat_factory() -> Arc<dyn Module> {
    Arc::new(HeartbeatModule::new())
}

crate::module!(heartbeat_factory);
