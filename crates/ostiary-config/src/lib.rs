//! Configuration system for ostiary.
//!
//! Provides TOML-based configuration with:
//! - `[server]`, `[engine]`, `[session]` and `[directory]` sections
//! - Config file layering (user config dir + project-local overrides)
//! - Secret overrides from environment variables
//! - Load warnings for plaintext secrets and weak cookie keys

pub mod discovery;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config, load_config_file, load_config_from,
    load_config_with_options, user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use secrets::{EnvOverride, apply_env_overrides, apply_overrides_from};
pub use types::*;
