//! Module Trait System
//!
//! Core traits for hot-swappable modules and the sources that supply them.
//!
//! # Module Lifecycle
//!
//! A module instance is constructed by a [`ModuleSource`], activated once by
//! the registry's transition, and deactivated once when the next transition
//! (a reload or teardown) supersedes it. Instances are never reused: every
//! reload asks the source for fresh ones.
//!
//! During activation a module may provide services and consume services of
//! other modules through the [`ServiceContext`] it is given. Subscriptions
//! are scoped to the transition, so a module re-subscribes on every activation.

use crate::module::error::ModuleResult;
use crate::registry::api::ServiceContext;
use std::sync::Arc;

/// Base trait every module implements
#[async_trait::async_trait]
pub trait Module: Send + Sync {
    /// Module name, unique among the active modules
    fn name(&self) -> &str;

    /// Module API version the module was built against
    ///
    /// Builtin modules report the host's version. Sources use this to skip
    /// modules from a different major version.
    fn api_version(&self) -> u32 {
        crate::core::version::get_api_version()
    }

    /// Activate the module
    ///
    /// Runs concurrently with the activation of every other module in the
    /// same transition. Returning an error fails the whole transition.
    async fn activate(&self, services: ServiceContext) -> ModuleResult<()>;

    /// Deactivate the module, releasing anything started by `activate`
    fn deactivate(&self);
}

/// Supplies the current collection of available modules
#[async_trait::async_trait]
pub trait ModuleSource: Send + Sync {
    /// Construct a fresh set of module instances for the next transition
    async fn reload(&self) -> ModuleResult<Vec<Arc<dyn Module>>>;

    /// Enumerate the modules currently available, without side effects
    fn available_modules(&self) -> Vec<Arc<dyn Module>>;
}
