//! Configuration management for Padel Overlay.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//!
//! # Example
//!
//! ```no_run
//! use overlay_core::config::{default_config_path, ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(default_config_path());
//! config.load_or_create().unwrap();
//!
//! println!("Default output: {}", config.settings().paths.default_output);
//!
//! config.settings_mut().paths.xml_path = "/data/match.xml".to_string();
//! config.update_section(ConfigSection::Paths).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{default_config_path, ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, LoggingSettings, PathSettings, Settings, UpdateSettings, WorkerSettings,
};
