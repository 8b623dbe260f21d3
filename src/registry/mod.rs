//! Service Registry and Reload Coordinator
//!
//! Tracks the active modules, the provider of each service and the consumers
//! waiting for one, and swaps the whole module set atomically on reload or
//! teardown.

// Internal modules - all access should go through api module
pub(crate) mod config;
pub(crate) mod context;
pub(crate) mod error;
pub(crate) mod manager;
pub(crate) mod state;
pub(crate) mod transition;
pub(crate) mod waiter;

// Public API module - the only public interface for the registry
pub mod api;

#[cfg(test)]
mod tests;
