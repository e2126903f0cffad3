//! loom-config: layered configuration for the loom log server
//!
//! Merges a defaults file, environment variables, override files and
//! command-line flags into a single memoized configuration tree.

pub mod cli;
pub mod config;

pub use config::{ConfigLoader, ConfigTree, LoadError};
