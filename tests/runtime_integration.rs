//! Runtime integration tests
//!
//! Exercises the public API end to end:
//! - `runtime::builtin` - builtin module discovery and the clock/heartbeat pair
//! - `runtime::supervisor` - request-driven reloads and teardown

mod common;
mod runtime;
