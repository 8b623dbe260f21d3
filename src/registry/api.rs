//! Public API for the service registry
//!
//! This module provides the complete public API for the registry. External
//! modules should import from here rather than directly from internal modules.

// Core coordinator
pub use crate::registry::manager::ServiceRegistry;

// Registry interface handed to modules
pub use crate::registry::context::ServiceContext;
pub use crate::registry::waiter::ServiceWaiter;

// Configuration
pub use crate::registry::config::{RegistryConfig, DEFAULT_WATCHDOG_DELAY};

// Transitions
pub use crate::registry::state::TransitionPhase;
pub use crate::registry::transition::{TransitionKind, TransitionSummary};

// Error handling
pub use crate::registry::error::{RegistryError, RegistryResult};
