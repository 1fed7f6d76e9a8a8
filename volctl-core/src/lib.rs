//! volctl Core Library
//!
//! Shared types, handler contracts, and configuration for the volctl
//! dispatcher. Plugin crates depend on this crate to implement
//! [`Handler`] and [`Provider`].

pub mod config;
pub mod error;
pub mod handler;
pub mod types;

// Re-export commonly used types
pub use config::{
    default_config_path, default_log_path, default_plugin_dir, ConfigBuilder, VolumeConfig,
};
pub use error::*;
pub use handler::*;
pub use types::*;
