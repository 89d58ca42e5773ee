//! Application configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

/// Configuration built once at startup and handed to the server and the
/// remote client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Timeout for remote requests that do not set their own.
    pub remote_timeout: Duration,
    /// Skip TLS certificate verification on remote requests.
    pub ignore_ssl_errors: bool,
    /// Whether to serve `/_health`.
    pub enable_health: bool,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Username to password map checked by the basic authenticator.
    pub api_users: HashMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            remote_timeout: Duration::from_secs(10),
            ignore_ssl_errors: false,
            enable_health: true,
            max_body_size: 10 * 1024 * 1024, // 10MB
            api_users: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by environment variables.
    ///
    /// Reads `PDNSCONTROL_HOST`, `PDNSCONTROL_PORT`, `REMOTE_TIMEOUT`
    /// (seconds), `IGNORE_SSL_ERRORS` and `PDNSCONTROL_API_USERS`
    /// (`user:password` pairs separated by commas). Unparseable values are
    /// logged and ignored.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Same as [`AppConfig::from_env`] over an explicit set of variables.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            let value = value.as_ref().trim();
            match key.as_ref() {
                "PDNSCONTROL_HOST" => config.host = value.to_string(),
                "PDNSCONTROL_PORT" => match value.parse() {
                    Ok(port) => config.port = port,
                    Err(_) => warn!("Ignoring invalid PDNSCONTROL_PORT {:?}", value),
                },
                "REMOTE_TIMEOUT" => match value
                    .parse::<f64>()
                    .ok()
                    .filter(|secs| *secs > 0.0)
                    .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                {
                    Some(timeout) => config.remote_timeout = timeout,
                    None => warn!("Ignoring invalid REMOTE_TIMEOUT {:?}", value),
                },
                "IGNORE_SSL_ERRORS" => config.ignore_ssl_errors = parse_flag(value),
                "PDNSCONTROL_API_USERS" => {
                    for pair in value.split(',').filter(|p| !p.is_empty()) {
                        match pair.split_once(':') {
                            Some((user, password)) => {
                                config.api_users.insert(user.to_string(), password.to_string());
                            }
                            None => warn!("Ignoring API user entry without a password"),
                        }
                    }
                }
                _ => {}
            }
        }

        config
    }

    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the default remote timeout.
    pub fn remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// Enable or disable TLS certificate verification on remote requests.
    pub fn ignore_ssl_errors(mut self, ignore: bool) -> Self {
        self.ignore_ssl_errors = ignore;
        self
    }

    /// Set the largest request body the server buffers.
    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    /// Allow an API user.
    pub fn api_user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.api_users.insert(username.into(), password.into());
        self
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
