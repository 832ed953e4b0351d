//! Process-level settings read from the environment.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Bind host (default: 0.0.0.0)
    pub host: String,
    /// Bind port (default: 9000)
    pub port: u16,
    /// Base path every route is nested under; empty means the root
    pub endpoint: String,
    /// Fallback language when a request has no usable `Accept-Language`
    pub language: String,
    /// TOML repository configuration; overrides the env-based selection
    pub repository_config: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
            endpoint: String::new(),
            language: "en".to_string(),
            repository_config: None,
        }
    }
}

impl ServiceConfig {
    /// Load from `HOST`, `PORT`, `ENDPOINT`, `LANGUAGE` and `REPOSITORY_CONFIG`.
    ///
    /// # Errors
    /// Returns an error if `PORT` is set but not a port number.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .map_err(|_| format!("PORT must be a valid port number, got '{}'", raw))?,
            _ => defaults.port,
        };

        Ok(Self {
            host: non_empty_var("HOST").unwrap_or(defaults.host),
            port,
            endpoint: non_empty_var("ENDPOINT").unwrap_or(defaults.endpoint),
            language: non_empty_var("LANGUAGE").unwrap_or(defaults.language),
            repository_config: non_empty_var("REPOSITORY_CONFIG").map(PathBuf::from),
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("invalid bind address {}:{}: {}", self.host, self.port, e))
    }

    /// The base path in router form (`/api/v1`), or `None` for the root.
    pub fn base_path(&self) -> Option<String> {
        let trimmed = self.endpoint.trim().trim_matches('/');
        if trimmed.is_empty() {
            None
        } else {
            Some(format!("/{}", trimmed))
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
