//! Module System
//!
//! Hot-swappable modules, the sources that construct them, and the modules
//! built into the binary.

// Internal modules - all access should go through api module
pub(crate) mod builtin;
pub(crate) mod discovery;
pub(crate) mod error;
pub(crate) mod source;
pub(crate) mod traits;

// Public API module - the only public interface for the module system
pub mod api;
