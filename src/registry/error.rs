//! Registry Error Handling
//!
//! Errors surfaced by the service registry to modules and transition callers.

use crate::module::api::ModuleError;
use crate::registry::state::TransitionPhase;
use crate::service::api::ServiceHandle;

/// Result type alias for registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Error types for the service registry
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    /// At least one module failed to activate; the transition as a whole failed
    #[error("Transition failed: {source}")]
    ActivationFailed {
        module: String,
        source: ModuleError,
        /// Other modules that also failed in the same transition
        others: Vec<String>,
    },

    /// A transition was requested while another is running
    #[error("Cannot start a transition while the registry is {phase}")]
    TransitionInProgress { phase: TransitionPhase },

    /// A pending subscription was dropped without being resolved
    #[error("Subscription to service '{handle}' was discarded")]
    SubscriptionDiscarded { handle: ServiceHandle },

    /// The module source failed to supply modules
    #[error("Module source failed: {0}")]
    Source(#[source] ModuleError),

    /// Internal synchronisation failure
    #[error("Internal registry error: {message}")]
    Internal { message: String },
}

impl RegistryError {
    /// Names of every module whose activation failed, if this is an activation failure
    pub fn failed_modules(&self) -> Vec<&str> {
        match self {
            RegistryError::ActivationFailed { module, others, .. } => {
                std::iter::once(module.as_str())
                    .chain(others.iter().map(String::as_str))
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}
