//! Service Handles
//!
//! Identifiers used to match service providers with service consumers.
//! Handles are plain interned names rather than type objects, so a set of
//! handles can be logged, sorted and serialized for diagnostics.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Opaque identifier for a service
///
/// Two handles are the same service if and only if their names are equal.
/// Static handles can be declared as constants:
///
/// ```
/// use hotmod::service::api::ServiceHandle;
///
/// const CONNECTION: ServiceHandle = ServiceHandle::named("connection");
/// assert_eq!(CONNECTION.as_str(), "connection");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceHandle(Cow<'static, str>);

impl ServiceHandle {
    /// Handle backed by a static name
    pub const fn named(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Handle built from a runtime string
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// The handle's name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ServiceHandle {
    fn from(name: &'static str) -> Self {
        Self::named(name)
    }
}

impl From<String> for ServiceHandle {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const WINDOW: ServiceHandle = ServiceHandle::named("window");

    #[test]
    fn test_static_and_owned_handles_are_equal() {
        let owned = ServiceHandle::new(String::from("window"));
        assert_eq!(WINDOW, owned);

        let mut map = HashMap::new();
        map.insert(WINDOW, 1);
        assert_eq!(map.get(&owned), Some(&1));
    }

    #[test]
    fn test_handle_serializes_as_plain_string() {
        let json = serde_json::to_string(&WINDOW).unwrap();
        assert_eq!(json, "\"window\"");

        let back: ServiceHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, WINDOW);
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(format!("{}", ServiceHandle::new("connection")), "connection");
    }
}
