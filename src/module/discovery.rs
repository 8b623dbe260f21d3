//! Builtin Module Discovery
//!
//! Modules compiled into the binary register a factory with the `module!`
//! macro. The builtin source collects those factories through `inventory`,
//! applies the configured exclusions and drops modules built against a
//! different major API version.

use crate::module::error::{ModuleError, ModuleResult};
use crate::module::traits::{Module, ModuleSource};
use std::sync::Arc;

/// Entry for a builtin module in the compile-time registry
pub struct BuiltinModuleEntry {
    pub factory: fn() -> Arc<dyn Module>,
}

// Collect all builtin module entries
inventory::collect!(BuiltinModuleEntry);

/// Macro for registering builtin modules
///
/// ```ignore
/// fn my_module_factory() -> Arc<dyn Module> {
///     Arc::new(MyModule::new())
/// }
///
/// hotmod::module!(my_module_factory);
/// ```
#[macro_export]
macro_rules! module {
    ($factory_expr:expr) => {
        inventory::submit!($crate::module::api::BuiltinModuleEntry {
            factory: $factory_expr
        });
    };
}

/// Major version (year) of a module API version
pub fn major_version(api_version: u32) -> u32 {
    api_version / 10000
}

/// Check a module's API version against the host's
pub fn check_compatibility(module: &dyn Module, host_api_version: u32) -> ModuleResult<()> {
    let api_version = module.api_version();
    if major_version(api_version) != major_version(host_api_version) {
        return Err(ModuleError::Incompatible {
            module: module.name().to_string(),
            api_version,
            expected: major_version(host_api_version),
        });
    }
    Ok(())
}

/// Module source backed by the compile-time registry
#[derive(Debug, Clone)]
pub struct BuiltinModuleSource {
    excluded_modules: Vec<String>,
    api_version: u32,
}

impl Default for BuiltinModuleSource {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinModuleSource {
    /// Create a source that exposes every registered module
    pub fn new() -> Self {
        Self {
            excluded_modules: Vec::new(),
            api_version: crate::core::version::get_api_version(),
        }
    }

    /// Create a source that skips the named modules
    pub fn with_excludes<S: AsRef<str>>(excludes: &[S]) -> Self {
        let mut source = Self::new();
        source.excluded_modules = excludes.iter().map(|s| s.as_ref().to_string()).collect();
        source
    }

    /// Override the host API version used for compatibility checks
    pub fn with_api_version(mut self, api_version: u32) -> Self {
        self.api_version = api_version;
        self
    }

    fn discover(&self) -> Vec<Arc<dyn Module>> {
        let mut modules: Vec<Arc<dyn Module>> = inventory::iter::<BuiltinModuleEntry>
            .into_iter()
            .map(|entry| (entry.factory)())
            .collect();
        log::debug!("Found {} builtin modules", modules.len());

        let before_exclusions = modules.len();
        modules.retain(|module| !self.excluded_modules.iter().any(|n| n == module.name()));
        log::debug!(
            "After exclusions: {} modules (was {})",
            modules.len(),
            before_exclusions
        );

        modules.retain(|module| match check_compatibility(module.as_ref(), self.api_version) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Skipping module: {}", e);
                false
            }
        });

        modules
    }
}

#[async_trait::async_trait]
impl ModuleSource for BuiltinModuleSource {
    async fn reload(&self) -> ModuleResult<Vec<Arc<dyn Module>>> {
        Ok(self.discover())
    }

    fn available_modules(&self) -> Vec<Arc<dyn Module>> {
        self.discover()
    }
}
