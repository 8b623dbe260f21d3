//! Synchronization utilities for mutex handling
//!
//! Registry tables live behind a single mutex. A module that panics inside a
//! consumer handler can poison it; these helpers turn that into a typed error
//! instead of a second panic.

use std::sync::LockResult;

/// Convert a poisoned lock result into an application error
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use hotmod::core::sync::handle_mutex_poison;
/// use hotmod::registry::api::RegistryError;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(mutex.lock(), |message| RegistryError::Internal { message })
///     .unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (mutex poisoned). A panic occurred while holding a lock. PoisonError: {:?}",
            poison_err
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[derive(Debug, PartialEq)]
    struct TestError {
        message: String,
    }

    #[test]
    fn test_handle_mutex_poison_success() {
        let mutex = Mutex::new(vec!["clock"]);
        let guard = handle_mutex_poison(mutex.lock(), |msg| TestError { message: msg }).unwrap();
        assert_eq!(guard.as_slice(), &["clock"]);
    }

    #[test]
    fn test_handle_mutex_poison_reports_panic() {
        let mutex = Arc::new(Mutex::new(0u32));
        let holder = Arc::clone(&mutex);

        let _ = thread::spawn(move || {
            let _guard = holder.lock().unwrap();
            panic!("handler panicked while the registry was locked");
        })
        .join();

        let error = handle_mutex_poison(mutex.lock(), |msg| TestError { message: msg }).unwrap_err();
        assert!(error.message.contains("mutex poisoned"));
        assert!(error.message.contains("panic occurred"));
    }
}
