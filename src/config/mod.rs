//! Configuration module.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Defaults for every option
//! - Configuration validation

pub mod loader;
pub mod validation;

pub use loader::{CaptionsConfig, Config, NetworkConfig, OptionsConfig};
pub use validation::validate_config;
