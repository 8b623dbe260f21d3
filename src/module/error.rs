//! Module Error Handling
//!
//! Error types raised by modules during activation and by module sources
//! during discovery.

use crate::registry::api::RegistryError;

/// Result type alias for module operations
pub type ModuleResult<T> = std::result::Result<T, ModuleError>;

/// Errors raised by modules and module sources
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModuleError {
    /// Module activation failed
    #[error("Module '{module}' failed to activate: {cause}")]
    ActivationFailed { module: String, cause: String },

    /// Module activation panicked
    #[error("Module '{module}' panicked during activation: {message}")]
    Panicked { module: String, message: String },

    /// Module was built against an incompatible API version
    #[error("Module '{module}' has incompatible API version {api_version} (expected major version {expected})")]
    Incompatible {
        module: String,
        api_version: u32,
        expected: u32,
    },

    /// Module source could not enumerate modules
    #[error("Module discovery failed: {message}")]
    Discovery { message: String },

    /// The service registry rejected an operation
    #[error("Service registry error: {message}")]
    Registry { message: String },
}

impl From<RegistryError> for ModuleError {
    fn from(err: RegistryError) -> Self {
        ModuleError::Registry {
            message: err.to_string(),
        }
    }
}

impl ModuleError {
    /// Convenience constructor for activation failures
    pub fn activation(module: impl Into<String>, cause: impl ToString) -> Self {
        ModuleError::ActivationFailed {
            module: module.into(),
            cause: cause.to_string(),
        }
    }

    /// Name of the module the error relates to, if any
    pub fn module_name(&self) -> Option<&str> {
        match self {
            ModuleError::ActivationFailed { module, .. }
            | ModuleError::Panicked { module, .. }
            | ModuleError::Incompatible { module, .. } => Some(module),
            ModuleError::Discovery { .. } | ModuleError::Registry { .. } => None,
        }
    }
}
