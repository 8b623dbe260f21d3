//! Transition Supervisor
//!
//! Owns the service registry and is the single caller of its transitions.
//! Requests arrive on a channel (from signal handlers or embedders) and are
//! handled one at a time, so transitions never overlap.

use crate::app::cli::Args;
use crate::app::config::RuntimeConfig;
use crate::core::logging::reconfigure_logging;
use crate::core::signals::TriggerRequest;
use crate::registry::api::{RegistryResult, ServiceRegistry, TransitionSummary};
use std::sync::Arc;
use tokio::sync::mpsc;

const REQUEST_QUEUE_DEPTH: usize = 16;

/// Serializes reload and teardown requests against one registry
pub struct Supervisor {
    registry: Arc<ServiceRegistry>,
    tx: mpsc::Sender<TriggerRequest>,
    rx: mpsc::Receiver<TriggerRequest>,
    reload_args: Option<Args>,
}

impl Supervisor {
    pub fn new(registry: ServiceRegistry) -> Self {
        let (tx, rx) = mpsc::channel(REQUEST_QUEUE_DEPTH);
        Self {
            registry: Arc::new(registry),
            tx,
            rx,
            reload_args: None,
        }
    }

    /// Re-read the configuration file before every requested reload
    ///
    /// Only the log level is applied at runtime; registry tunables are fixed
    /// when the registry is built.
    pub fn with_config_reload(mut self, args: Args) -> Self {
        self.reload_args = Some(args);
        self
    }

    /// The supervised registry
    pub fn registry(&self) -> Arc<ServiceRegistry> {
        Arc::clone(&self.registry)
    }

    /// Sender for injecting transition requests
    pub fn handle(&self) -> mpsc::Sender<TriggerRequest> {
        self.tx.clone()
    }

    /// Activate the initial module set, then serve requests until teardown
    ///
    /// Failed reloads are logged and the previous outcome stands; the
    /// supervisor keeps running. Returns the teardown summary.
    pub async fn run(mut self) -> RegistryResult<TransitionSummary> {
        self.reload().await;

        while let Some(request) = self.rx.recv().await {
            log::debug!("Handling {} request", request);
            match request {
                TriggerRequest::Reload => {
                    self.refresh_config().await;
                    self.reload().await;
                }
                TriggerRequest::Teardown => break,
            }
        }

        self.registry.teardown().await
    }

    async fn reload(&self) {
        match self.registry.reload_modules().await {
            Ok(summary) => {
                for handle in &summary.unmet {
                    log::debug!("Service '{}' has no provider in this module set", handle);
                }
            }
            Err(e) => {
                log::warn!("Reload failed: {}", e);
                let failed = e.failed_modules();
                if !failed.is_empty() {
                    log::warn!("Modules failing activation: {}", failed.join(", "));
                }
            }
        }
    }

    async fn refresh_config(&self) {
        let Some(args) = &self.reload_args else {
            return;
        };
        match RuntimeConfig::resolve(args).await {
            Ok(config) => {
                if let Err(e) = reconfigure_logging(&config.log.level) {
                    log::debug!("Log level not changed: {}", e);
                } else {
                    log::debug!("Log level set to '{}'", config.log.level);
                }
            }
            Err(e) => log::warn!("Keeping previous configuration: {}", e),
        }
    }
}
