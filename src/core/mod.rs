//! Core services and infrastructure

pub mod logging;
pub mod signals;
pub mod sync;
pub mod version;
