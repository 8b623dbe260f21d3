//! Registry configuration

use std::time::Duration;

/// Default delay before the activation watchdog reports unmet services
pub const DEFAULT_WATCHDOG_DELAY: Duration = Duration::from_secs(1);

/// Tunables for the service registry's transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// How long activation may run before outstanding modules and unmet
    /// services are reported
    pub watchdog_delay: Duration,

    /// Deactivate the modules activated by a failed transition before
    /// returning its error
    pub rollback_on_failure: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            watchdog_delay: DEFAULT_WATCHDOG_DELAY,
            rollback_on_failure: false,
        }
    }
}

impl RegistryConfig {
    pub fn with_watchdog_delay(mut self, delay: Duration) -> Self {
        self.watchdog_delay = delay;
        self
    }

    pub fn with_rollback(mut self, rollback_on_failure: bool) -> Self {
        self.rollback_on_failure = rollback_on_failure;
        self
    }
}
