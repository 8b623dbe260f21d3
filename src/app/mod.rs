//! Application layer: command line, configuration and the transition supervisor

pub mod cli;
pub mod config;
pub mod startup;
pub mod supervisor;
