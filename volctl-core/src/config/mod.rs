//! Configuration for the volctl dispatcher
//!
//! A single [`VolumeConfig`] is resolved once per run by [`ConfigBuilder`]
//! and passed by reference to logging setup, discovery, and handlers.

mod paths;
mod settings;

pub use paths::{default_config_path, default_log_path, default_plugin_dir};
pub use settings::{
    ConfigBuilder, VolumeConfig, DEFAULT_CATEGORY, ENV_CONFIG, ENV_LOG, ENV_LOG_PATH,
    ENV_PLUGIN_PATH, ENV_PREFIX,
};
