pub mod app;
pub mod core;
pub mod module;
pub mod registry;
pub mod service;
