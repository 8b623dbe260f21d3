//! Clock module: provides the process clock service

use crate::module::builtin::CLOCK;
use crate::module::error::ModuleResult;
use crate::module::traits::Module;
use crate::registry::api::ServiceContext;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Value provided under the `clock` service handle
#[derive(Debug, Clone)]
pub struct Clock {
    started: Instant,
    epoch: u64,
}

impl Clock {
    /// Time since the clock was provided
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Transition epoch in which the clock was provided
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

pub struct ClockModule;

impl ClockModule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClockModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Module for ClockModule {
    fn name(&self) -> &str {
        "clock"
    }

    async fn activate(&self, services: ServiceContext) -> ModuleResult<()> {
        let clock = Clock {
            started: Instant::now(),
            epoch: services.epoch(),
        };
        services.provide_service(CLOCK, clock)?;
        Ok(())
    }

    fn deactivate(&self) {
        log::debug!("Clock module deactivated");
    }
}

fn clock_factory() -> Arc<dyn Module> {
    Arc::new(ClockModule::new())
}

crate::module!(clock_factory);
