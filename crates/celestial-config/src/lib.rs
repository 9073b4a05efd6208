//! Configuration system for Celestial.
//!
//! Settings are read from a RON file in the platform config directory and can
//! be overridden from the command line. Missing files and missing fields fall
//! back to defaults; nothing is ever written back.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, GatewayConfig, RenderConfig, SceneConfig, WindowConfig,
    default_config_dir,
};
pub use error::ConfigError;
