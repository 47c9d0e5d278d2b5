//! Subscriber configuration, built once at startup and passed into [`Subscriber::new`].
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. Protocol code never reads the environment itself.
//!
//! [`Subscriber::new`]: crate::subscriber::Subscriber::new

use crate::NEW_PENDING_TRANSACTIONS;
use crate::error::ConfigError;

use common::RedactedSecret;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use log::{debug, info, warn};

pub const SECRET_KEY_VAR: &str = "SECRET_KEY";
pub const HOST_VAR: &str = "ETH_HOST";
pub const WS_PORT_VAR: &str = "WS_PORT";
pub const RPC_PORT_VAR: &str = "RPC_PORT";
pub const TOPIC_VAR: &str = "SUBSCRIPTION_TOPIC";
pub const REQUEST_TIMEOUT_VAR: &str = "REQUEST_TIMEOUT_SECS";

pub const DEFAULT_WS_PORT: u16 = 8546;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Hex-encoded HS256 key shared with the node.
    pub secret: RedactedSecret,
    pub host: String,
    pub ws_port: u16,
    /// When set, an `eth_syncing` check runs over HTTP before subscribing.
    pub rpc_port: Option<u16>,
    pub topic: String,
    /// Deadline for the WebSocket handshake and each request/response exchange.
    pub request_timeout: Duration,
}

impl SubscriberConfig {
    /// Config with defaults for everything but the two required values.
    pub fn new(secret: RedactedSecret, host: impl Into<String>) -> Self {
        Self {
            secret,
            host: host.into(),
            ws_port: DEFAULT_WS_PORT,
            rpc_port: None,
            topic: NEW_PENDING_TRANSACTIONS.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Load from `.env` (if any) and the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if `SECRET_KEY` or `ETH_HOST` is absent, and
    /// [`ConfigError::Invalid`] if a port or timeout does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        match try_load_dotenv() {
            Some(path) => info!("Loaded .env from: {}", path.display()),
            None => debug!("No .env file found - using process environment only"),
        }

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let secret = read(SECRET_KEY_VAR).ok_or_else(|| ConfigError::missing(SECRET_KEY_VAR))?;
        let host = read(HOST_VAR).ok_or_else(|| ConfigError::missing(HOST_VAR))?;

        let mut config = Self::new(RedactedSecret::new(secret.trim()), host.trim());
        debug!("{SECRET_KEY_VAR} loaded ({} hex chars)", config.secret.len());

        if let Some(value) = read(WS_PORT_VAR) {
            config.ws_port = parse_var(WS_PORT_VAR, &value)?;
        }
        if let Some(value) = read(RPC_PORT_VAR) {
            config.rpc_port = Some(parse_var(RPC_PORT_VAR, &value)?);
        }
        if let Some(value) = read(TOPIC_VAR) {
            config.topic = value.trim().to_string();
        }
        if let Some(value) = read(REQUEST_TIMEOUT_VAR) {
            let secs: u64 = parse_var(REQUEST_TIMEOUT_VAR, &value)?;
            if secs == 0 {
                return Err(ConfigError::invalid(
                    REQUEST_TIMEOUT_VAR,
                    "timeout must be at least 1 second",
                ));
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_var<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(name, format!("'{}': {}", value.trim(), e)))
}

/// Attempts to load .env from the current directory, then the executable's directory.
fn try_load_dotenv() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        return Some(path);
    }

    let exe_dir = env::current_exe().ok()?.parent()?.to_path_buf();
    let env_path = exe_dir.join(".env");
    if !env_path.exists() {
        return None;
    }

    match dotenvy::from_path(&env_path) {
        Ok(()) => Some(env_path),
        Err(e) => {
            warn!("Failed to parse .env at {}: {}", env_path.display(), e);
            None
        }
    }
}
