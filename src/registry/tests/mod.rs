//! Test suites for the service registry
//!
//! Covers the consume/provide protocol, full transitions (reload, teardown,
//! failure and the watchdog), and isolation between epochs.

mod utils;
