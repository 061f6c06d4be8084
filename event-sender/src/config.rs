//! Configuration module for environment variable parsing.
//!
//! Broker parameters are read from `CENTRAL_`-prefixed variables, optionally
//! seeded from a `.env` file in the working directory.

use std::env;
use std::fmt;

use thiserror::Error;
use url::Url;

/// Prefix shared by every configuration variable.
pub const ENV_PREFIX: &str = "CENTRAL_";

/// File loaded into the environment before configuration is read.
pub const ENV_FILE: &str = ".env";

const DEFAULT_PORT: u16 = 5672;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot load {path} file: {source}")]
    EnvFile {
        path: String,
        #[source]
        source: dotenvy::Error,
    },

    #[error("invalid value {value:?} for {var}: expected a port between 1 and 65535")]
    InvalidPort { var: String, value: String },

    #[error("cannot build broker URI: {0}")]
    InvalidUri(#[from] url::ParseError),

    #[error("cannot build broker URI: host {0:?} does not accept credentials or a vhost")]
    InvalidHost(String),
}

/// Broker connection parameters.
///
/// Loaded once at startup and passed by reference to every component.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// RabbitMQ host name or address
    pub rabbit_host: String,

    /// RabbitMQ port
    pub rabbit_port: u16,

    /// Authentication user
    pub rabbit_user: String,

    /// Authentication password
    pub rabbit_pass: String,

    /// Virtual host to open the connection on
    pub rabbit_vhost: String,

    /// Direct exchange the event is published to
    pub rabbit_exchange: String,

    /// Routing key binding the queue to the exchange
    pub rabbit_exchange_key: String,

    /// Durable queue bound to the exchange
    pub rabbit_queue: String,
}

impl Config {
    /// Load `.env` and then read configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        load_env_file(ENV_FILE)?;
        Self::from_env()
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let string = |name: &str| var(name).unwrap_or_default();

        let rabbit_port = match var("RABBITPORT") {
            None => DEFAULT_PORT,
            Some(raw) => parse_port(&raw).ok_or_else(|| ConfigError::InvalidPort {
                var: format!("{ENV_PREFIX}RABBITPORT"),
                value: raw,
            })?,
        };

        Ok(Config {
            rabbit_host: string("RABBITHOST"),
            rabbit_port,
            rabbit_user: string("RABBITUSER"),
            rabbit_pass: string("RABBITPASS"),
            rabbit_vhost: string("RABBITVHOST"),
            rabbit_exchange: string("RABBITEXCHANGE"),
            rabbit_exchange_key: string("RABBITEXCHANGEKEY"),
            rabbit_queue: string("RABBITQUEUE"),
        })
    }

    /// Build the `amqp://` URI for this configuration.
    ///
    /// Credentials and vhost are percent-encoded, so the default vhost `/`
    /// is sent as `%2F`. An empty vhost leaves the path empty and the broker
    /// default applies.
    pub fn amqp_uri(&self) -> Result<String, ConfigError> {
        let mut url = Url::parse(&format!("amqp://{}:{}", self.rabbit_host, self.rabbit_port))?;

        let invalid = || ConfigError::InvalidHost(self.rabbit_host.clone());

        url.set_username(&self.rabbit_user).map_err(|_| invalid())?;
        if !self.rabbit_pass.is_empty() {
            url.set_password(Some(&self.rabbit_pass))
                .map_err(|_| invalid())?;
        }

        if !self.rabbit_vhost.is_empty() {
            url.path_segments_mut()
                .map_err(|_| invalid())?
                .clear()
                .push(&self.rabbit_vhost);
        }

        Ok(url.to_string())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("rabbit_host", &self.rabbit_host)
            .field("rabbit_port", &self.rabbit_port)
            .field("rabbit_user", &self.rabbit_user)
            .field("rabbit_pass", &"<redacted>")
            .field("rabbit_vhost", &self.rabbit_vhost)
            .field("rabbit_exchange", &self.rabbit_exchange)
            .field("rabbit_exchange_key", &self.rabbit_exchange_key)
            .field("rabbit_queue", &self.rabbit_queue)
            .finish()
    }
}

/// Load a dotenv file into the process environment.
///
/// Variables already set in the process environment are left untouched.
fn load_env_file(path: &str) -> Result<(), ConfigError> {
    dotenvy::from_path(path).map_err(|source| ConfigError::EnvFile {
        path: path.to_string(),
        source,
    })
}

fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse::<u16>().ok().filter(|port| *port != 0)
}
