//! Start command - launches the authorization front end.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::{info, warn};

use ostiary_config::OstiaryConfig;
use ostiary_engine::{EngineConfig, HttpEngine};
use ostiary_server::{AppState, Key, Server, ServerConfig};

use super::{Context, load_directory};

/// Arguments for the start command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    // ── Load configuration ──────────────────────────────────────────────

    let mut config = ctx.load_config()?.config;

    let server = config.server.get_or_insert_with(Default::default);
    if let Some(port) = args.port {
        server.port = port;
    }
    if let Some(bind) = args.bind {
        server.bind = bind;
    }

    config.validate()?;

    // ── Collaborators ───────────────────────────────────────────────────

    let engine = build_engine(&config)?;
    let directory = load_directory(&config.directory())?;
    let server_config = build_server_config(&config)?;
    let max_sessions = config.session().max_sessions;

    info!(
        engine = %engine.config().base_url,
        users = directory.len(),
        bind = %server_config.bind_address,
        "Starting ostiary"
    );
    if ctx.verbose {
        info!(config = ?server_config, "Server configuration");
    }

    // ── Serve ───────────────────────────────────────────────────────────

    let state = AppState::from_parts(Arc::new(engine), directory, max_sessions, server_config);
    Server::from_state(state).run().await?;

    Ok(())
}

fn build_engine(config: &OstiaryConfig) -> Result<HttpEngine> {
    let engine = config.engine();
    let engine_config = EngineConfig::new(
        engine.base_url()?,
        engine.api_key.clone().unwrap_or_default(),
        engine.api_secret.clone().unwrap_or_default(),
    )
    .with_timeout(Duration::from_secs(engine.timeout_secs));

    HttpEngine::new(engine_config)
        .context("engine.api_key is required (set it in the config file or OSTIARY_ENGINE_API_KEY)")
}

fn build_server_config(config: &OstiaryConfig) -> Result<ServerConfig> {
    let server = config.server();
    let session = config.session();

    let ip: IpAddr = server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", server.bind))?;

    let cookie_key = match session.usable_cookie_key() {
        Some(bytes) => Key::try_from(bytes).context("session.cookie_key is not a usable key")?,
        None => {
            if session.cookie_key.is_none() {
                warn!("No session.cookie_key configured; sessions will not survive a restart");
            }
            Key::generate()
        }
    };

    Ok(ServerConfig::new()
        .with_bind_address(SocketAddr::new(ip, server.port))
        .with_request_logging(server.request_logging)
        .with_paths(server.authorization_path, server.decision_path)
        .with_cookie_name(session.cookie_name)
        .with_session_ttl(Duration::from_secs(session.ttl_secs))
        .with_secure_cookies(session.secure_cookies)
        .with_cookie_key(cookie_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_from_defaults() {
        let config = build_server_config(&OstiaryConfig::new()).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.authorization_path, "/api/authorization");
        assert_eq!(config.cookie_name, "AuthorizationServerSession");
        assert!(config.secure_cookies);
    }

    #[test]
    fn test_server_config_rejects_bad_bind() {
        let config = OstiaryConfig::from_toml("[server]\nbind = \"not-an-ip\"\n").unwrap();
        let err = build_server_config(&config).unwrap_err();
        assert!(err.to_string().contains("not-an-ip"));
    }

    #[test]
    fn test_engine_requires_api_key() {
        assert!(build_engine(&OstiaryConfig::new()).is_err());

        let config = OstiaryConfig::from_toml(
            "[engine]\nbase_url = \"http://localhost:9000\"\napi_key = \"k\"\n",
        )
        .unwrap();
        let engine = build_engine(&config).unwrap();
        assert_eq!(engine.config().api_key, "k");
    }

    #[test]
    fn test_reserved_paths_match_server_routes() {
        use ostiary_server::routes;

        let mut served = vec![
            routes::HEALTH_PATH,
            routes::TOKEN_PATH,
            routes::INTROSPECTION_PATH,
            routes::REVOCATION_PATH,
            routes::JWKS_PATH,
            routes::DISCOVERY_PATH,
        ];
        let mut reserved = ostiary_config::defaults::RESERVED_PATHS.to_vec();
        served.sort_unstable();
        reserved.sort_unstable();
        assert_eq!(served, reserved);
    }
}
