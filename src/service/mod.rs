//! Service Identity Module
//!
//! Handles that name services and the type-erased instances providers register.

// Internal modules - all access should go through api module
pub(crate) mod handle;
pub(crate) mod instance;

// Public API module - the only public interface for service identity
pub mod api;
