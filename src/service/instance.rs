//! Service Instances
//!
//! Type-erased, shared values registered by providing modules.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A provided service value
///
/// Cloning is cheap: every clone shares the same underlying value. Consumers
/// recover the concrete type with [`ServiceInstance::downcast`].
#[derive(Clone)]
pub struct ServiceInstance {
    provider: Arc<str>,
    value: Arc<dyn Any + Send + Sync>,
}

impl ServiceInstance {
    /// Wrap a value provided by the named module
    pub fn new<T: Any + Send + Sync>(provider: impl Into<Arc<str>>, value: T) -> Self {
        Self::from_arc(provider, Arc::new(value))
    }

    /// Wrap an already shared value
    pub fn from_arc<T: Any + Send + Sync>(provider: impl Into<Arc<str>>, value: Arc<T>) -> Self {
        Self {
            provider: provider.into(),
            value,
        }
    }

    /// Name of the module that provided this instance
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Typed access to the value, `None` if `T` is not the provided type
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    /// Whether both instances share the same underlying value
    pub fn same_instance(&self, other: &ServiceInstance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for ServiceInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceInstance")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}
