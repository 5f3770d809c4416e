//! Gateway connection settings.
//!
//! Settings come from `IAG_*` environment variables and are read exactly once
//! at startup. The resulting [`IagConfig`] is passed by reference to the
//! client, nothing else reads the environment.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 8083;
const DEFAULT_USERNAME: &str = "admin@itential";
const DEFAULT_PASSWORD: &str = "admin";
const DEFAULT_PROTOCOL: &str = "http";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const API_PREFIX: &str = "/api/v2.0";

/// Username and password exchanged for a bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// Keep the password out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where the gateway lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub protocol: String,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }

    pub fn login_url(&self) -> String {
        format!("{}{API_PREFIX}/login", self.base_url())
    }

    pub fn devices_url(&self) -> String {
        format!("{}{API_PREFIX}/devices", self.base_url())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IagConfig {
    pub endpoint: Endpoint,
    pub credentials: Credentials,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl Default for IagConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint {
                protocol: DEFAULT_PROTOCOL.to_string(),
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
            credentials: Credentials {
                username: DEFAULT_USERNAME.to_string(),
                password: DEFAULT_PASSWORD.to_string(),
            },
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

impl IagConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Unset variables fall back to their defaults. `IAG_PORT` and
    /// `IAG_TIMEOUT` must be integers when set; a timeout of `0` disables it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = match lookup("IAG_PORT") {
            Some(raw) => parse_number::<u16>("IAG_PORT", &raw)?,
            None => defaults.endpoint.port,
        };

        let timeout = match lookup("IAG_TIMEOUT") {
            Some(raw) => match parse_number::<u64>("IAG_TIMEOUT", &raw)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => defaults.timeout,
        };

        let config = Self {
            endpoint: Endpoint {
                protocol: get("IAG_PROTOCOL", DEFAULT_PROTOCOL),
                host: get("IAG_HOST", DEFAULT_HOST),
                port,
            },
            credentials: Credentials {
                username: get("IAG_USERNAME", DEFAULT_USERNAME),
                password: get("IAG_PASSWORD", DEFAULT_PASSWORD),
            },
            timeout,
        };

        debug!(
            base_url = %config.endpoint.base_url(),
            username = %config.credentials.username,
            timeout = ?config.timeout,
            "Loaded gateway configuration"
        );
        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} must be an integer, got {raw:?}")))
}
