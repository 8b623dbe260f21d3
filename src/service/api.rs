//! Public API for service identity
//!
//! External modules should import from here rather than directly from internal modules.

pub use crate::service::handle::ServiceHandle;
pub use crate::service::instance::ServiceInstance;
