//! Runtime integration test modules

pub mod builtin;
pub mod supervisor;
