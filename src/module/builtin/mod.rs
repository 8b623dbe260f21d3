//! Built-in Module Implementations
//!
//! Modules that ship with the binary. They are registered with the `module!`
//! macro and discovered by the builtin module source.

use crate::service::api::ServiceHandle;

pub mod clock;
pub mod heartbeat;

/// Process clock provided by the `clock` module
pub const CLOCK: ServiceHandle = ServiceHandle::named("clock");
