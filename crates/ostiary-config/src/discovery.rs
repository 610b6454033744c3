//! Config file discovery and layered merging.
//!
//! Resolution order (later overrides earlier):
//! 1. `~/.config/ostiary/config.toml` (user config, or `$OSTIARY_CONFIG_DIR/config.toml`)
//! 2. `./ostiary.toml` (project-local)
//! 3. Environment variable overrides for secrets
//! 4. CLI arguments (handled externally)
//!
//! An explicit `--config` file replaces steps 1 and 2.

use std::path::{Path, PathBuf};

use crate::secrets::{EnvOverride, apply_overrides_from};
use crate::{ConfigError, OstiaryConfig, Result};

/// Default config filename for project-local config.
const PROJECT_CONFIG_FILE: &str = "ostiary.toml";

/// Default config filename within the user config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for config directory resolution.
const APP_NAME: &str = "ostiary";

/// Environment variable to override the config directory.
const CONFIG_DIR_ENV: &str = "OSTIARY_CONFIG_DIR";

/// Tracks where each config layer was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the config file.
    pub path: PathBuf,
    /// Whether the file was found and loaded.
    pub loaded: bool,
}

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration.
    pub config: OstiaryConfig,
    /// Sources that were checked, in order of precedence (lowest first).
    pub sources: Vec<ConfigSource>,
    /// Fields taken from environment variables.
    pub overrides: Vec<EnvOverride>,
    /// Warnings generated during loading (e.g., plaintext secrets).
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Get paths of sources that were actually loaded.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Load configuration by discovering and merging all config layers.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(project_dir, None)
}

/// Load configuration with explicit control over the user config directory.
///
/// `config_dir` overrides both `OSTIARY_CONFIG_DIR` and the platform default.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    discover(project_dir, config_dir, |var| std::env::var(var).ok())
}

/// Load configuration from one explicit file, skipping discovery.
///
/// Unlike discovered layers, a missing or malformed file is an error.
pub fn load_config_from(path: &Path) -> Result<LoadedConfig> {
    let config = load_config_file(path)?;
    let sources = vec![ConfigSource {
        path: path.to_path_buf(),
        loaded: true,
    }];
    Ok(finish(config, sources, Vec::new(), |var| std::env::var(var).ok()))
}

/// Load config from a specific file path (no discovery, no overrides).
pub fn load_config_file(path: &Path) -> Result<OstiaryConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    OstiaryConfig::from_toml(&contents)
}

/// Get the user config file path.
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// Get the user config directory for ostiary.
///
/// Checks `OSTIARY_CONFIG_DIR` first, then falls back to the platform default.
pub fn user_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

fn discover<F>(project_dir: Option<&Path>, config_dir: Option<&Path>, lookup: F) -> Result<LoadedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = OstiaryConfig::new();
    let mut sources = Vec::new();
    let mut warnings = Vec::new();

    // 1. User config
    let user_path = match config_dir {
        Some(dir) => Some(dir.join(USER_CONFIG_FILE)),
        None => user_config_path(),
    };
    if let Some(path) = user_path {
        sources.push(load_layer(&mut config, &path, &mut warnings));
    }

    // 2. Project-local config
    let project_path = project_dir
        .map(|d| d.join(PROJECT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
    sources.push(load_layer(&mut config, &project_path, &mut warnings));

    Ok(finish(config, sources, warnings, lookup))
}

/// Check file-borne secrets, then apply environment overrides.
fn finish<F>(
    mut config: OstiaryConfig,
    sources: Vec<ConfigSource>,
    mut warnings: Vec<String>,
    lookup: F,
) -> LoadedConfig
where
    F: Fn(&str) -> Option<String>,
{
    check_plaintext_secrets(&config, &mut warnings);

    let overrides = apply_overrides_from(&mut config, lookup);

    if config.session().has_short_cookie_key() {
        warnings.push(format!(
            "session.cookie_key is shorter than {} bytes and will be ignored; \
             an ephemeral key is used instead, so sessions will not survive a restart.",
            crate::defaults::MIN_COOKIE_KEY_LEN
        ));
    }

    LoadedConfig {
        config,
        sources,
        overrides,
        warnings,
    }
}

/// Try to load a config file and merge it into the existing config.
fn load_layer(config: &mut OstiaryConfig, path: &Path, warnings: &mut Vec<String>) -> ConfigSource {
    if !path.is_file() {
        return ConfigSource {
            path: path.to_path_buf(),
            loaded: false,
        };
    }

    match load_config_file(path) {
        Ok(layer) => {
            config.merge(layer);
            ConfigSource {
                path: path.to_path_buf(),
                loaded: true,
            }
        }
        Err(e) => {
            warnings.push(format!("Failed to load {}: {}", path.display(), e));
            ConfigSource {
                path: path.to_path_buf(),
                loaded: false,
            }
        }
    }
}

fn check_plaintext_secrets(config: &OstiaryConfig, warnings: &mut Vec<String>) {
    if config.engine.as_ref().is_some_and(|e| e.has_plaintext_secret()) {
        warnings.push(
            "[engine] contains a plaintext api_secret. \
             Consider setting OSTIARY_ENGINE_API_SECRET instead."
                .to_string(),
        );
    }

    if config
        .session
        .as_ref()
        .is_some_and(|s| s.cookie_key.as_deref().is_some_and(|k| !k.is_empty()))
    {
        warnings.push(
            "[session] contains a plaintext cookie_key. \
             Consider setting OSTIARY_COOKIE_KEY instead."
                .to_string(),
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_user_config_path_shape() {
        if let Some(p) = user_config_path() {
            assert!(p.ends_with("config.toml"));
        }
    }

    #[test]
    fn test_load_config_file_not_found() {
        let err = load_config_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is not valid toml {{{{").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_no_files() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();

        let loaded = discover(Some(project.path()), Some(user.path()), no_env).unwrap();

        assert!(loaded.config.server.is_none());
        assert!(loaded.loaded_from().is_empty());
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_project_overrides_user_config() {
        let user = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::write(
            user.path().join("config.toml"),
            "[server]\nport = 8081\n\n[session]\nttl_secs = 60\n",
        )
        .unwrap();
        fs::write(project.path().join("ostiary.toml"), "[server]\nport = 3000\n").unwrap();

        let loaded = discover(Some(project.path()), Some(user.path()), no_env).unwrap();

        assert_eq!(loaded.config.server().port, 3000);
        assert_eq!(loaded.config.session().ttl_secs, 60);
        assert_eq!(loaded.loaded_from().len(), 2);
    }

    #[test]
    fn test_plaintext_secret_warnings() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        fs::write(
            project.path().join("ostiary.toml"),
            format!(
                "[engine]\napi_secret = \"s3cr3t\"\n\n[session]\ncookie_key = \"{}\"\n",
                "k".repeat(64)
            ),
        )
        .unwrap();

        let loaded = discover(Some(project.path()), Some(user.path()), no_env).unwrap();

        assert_eq!(loaded.warnings.len(), 2);
        assert!(loaded.warnings[0].contains("plaintext api_secret"));
        assert!(loaded.warnings[1].contains("plaintext cookie_key"));
    }

    #[test]
    fn test_env_secret_is_not_a_plaintext_warning() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();

        let loaded = discover(Some(project.path()), Some(user.path()), |var| {
            (var == "OSTIARY_ENGINE_API_SECRET").then(|| "from-env".to_string())
        })
        .unwrap();

        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.config.engine().api_secret.as_deref(), Some("from-env"));
        assert_eq!(loaded.overrides.len(), 1);
    }

    #[test]
    fn test_short_cookie_key_warns() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();

        let loaded = discover(Some(project.path()), Some(user.path()), |var| {
            (var == "OSTIARY_COOKIE_KEY").then(|| "short".to_string())
        })
        .unwrap();

        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("shorter than 64 bytes"));
    }

    #[test]
    fn test_malformed_config_warns_but_continues() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        fs::write(project.path().join("ostiary.toml"), "not valid toml {{{{").unwrap();

        let loaded = discover(Some(project.path()), Some(user.path()), no_env).unwrap();

        assert!(loaded.warnings[0].contains("Failed to load"));
        assert!(loaded.loaded_from().is_empty());
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let err = load_config_from(Path::new("/nonexistent/ostiary.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[server]\nport = 4444\n").unwrap();

        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.config.server().port, 4444);
        assert_eq!(loaded.loaded_from(), vec![path.as_path()]);
    }
}
