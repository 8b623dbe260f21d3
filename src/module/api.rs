//! Public API for the module system
//!
//! External modules should import from here rather than directly from internal modules.

// Module and source traits
pub use crate::module::traits::{Module, ModuleSource};

// Error handling
pub use crate::module::error::{ModuleError, ModuleResult};

// Module sources
pub use crate::module::discovery::{
    check_compatibility, major_version, BuiltinModuleEntry, BuiltinModuleSource,
};
pub use crate::module::source::{FactoryModuleSource, ModuleFactory};

// Builtin modules and the services they provide
pub use crate::module::builtin::clock::{Clock, ClockModule};
pub use crate::module::builtin::heartbeat::HeartbeatModule;
pub use crate::module::builtin::CLOCK;
