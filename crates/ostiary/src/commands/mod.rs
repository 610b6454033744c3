//! CLI command handlers.

pub mod config;
pub mod start;
pub mod users;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use ostiary_config::{DirectoryConfig, LoadedConfig};
use ostiary_identity::UserDirectory;
use tracing::{debug, warn};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit config file, bypassing discovery.
    pub config_path: Option<PathBuf>,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Load configuration from `--config` or by discovery, logging warnings.
    pub fn load_config(&self) -> Result<LoadedConfig> {
        let loaded = match &self.config_path {
            Some(path) => ostiary_config::load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => ostiary_config::load_config(None)?,
        };

        for warning in &loaded.warnings {
            warn!("{}", warning);
        }
        for source in loaded.loaded_from() {
            debug!(path = %source.display(), "Loaded config file");
        }
        for applied in &loaded.overrides {
            debug!(%applied, "Config override");
        }

        Ok(loaded)
    }
}

/// The configured users file, or the built-in demo users.
pub fn load_directory(config: &DirectoryConfig) -> Result<UserDirectory> {
    match &config.users_file {
        Some(path) => UserDirectory::from_json_file(path)
            .with_context(|| format!("failed to load users from {}", path.display())),
        None => {
            warn!("No directory.users_file configured; using the built-in demo users");
            Ok(UserDirectory::demo())
        }
    }
}
