//! Secret overrides from the environment.
//!
//! Environment variables take priority over config files:
//! - `OSTIARY_ENGINE_API_KEY` → `engine.api_key`
//! - `OSTIARY_ENGINE_API_SECRET` → `engine.api_secret`
//! - `OSTIARY_COOKIE_KEY` → `session.cookie_key`
//!
//! Empty values are ignored.

use crate::types::OstiaryConfig;

pub const ENGINE_API_KEY_ENV: &str = "OSTIARY_ENGINE_API_KEY";
pub const ENGINE_API_SECRET_ENV: &str = "OSTIARY_ENGINE_API_SECRET";
pub const COOKIE_KEY_ENV: &str = "OSTIARY_COOKIE_KEY";

/// A config field that was taken from an environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvOverride {
    pub var: &'static str,
    pub field: &'static str,
}

impl std::fmt::Display for EnvOverride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} from env var {}", self.field, self.var)
    }
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut OstiaryConfig) -> Vec<EnvOverride> {
    apply_overrides_from(config, |var| std::env::var(var).ok())
}

/// Apply overrides using `lookup` to read variables.
pub fn apply_overrides_from<F>(config: &mut OstiaryConfig, lookup: F) -> Vec<EnvOverride>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |var: &str| lookup(var).filter(|v| !v.is_empty());
    let mut applied = Vec::new();

    if let Some(key) = read(ENGINE_API_KEY_ENV) {
        config.engine.get_or_insert_with(Default::default).api_key = Some(key);
        applied.push(EnvOverride {
            var: ENGINE_API_KEY_ENV,
            field: "engine.api_key",
        });
    }

    if let Some(secret) = read(ENGINE_API_SECRET_ENV) {
        config.engine.get_or_insert_with(Default::default).api_secret = Some(secret);
        applied.push(EnvOverride {
            var: ENGINE_API_SECRET_ENV,
            field: "engine.api_secret",
        });
    }

    if let Some(key) = read(COOKIE_KEY_ENV) {
        config.session.get_or_insert_with(Default::default).cookie_key = Some(key);
        applied.push(EnvOverride {
            var: COOKIE_KEY_ENV,
            field: "session.cookie_key",
        });
    }

    applied
}
