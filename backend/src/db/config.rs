//! Database connection parameters and environment variable handling.

use std::env;

/// Database connection parameters loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Postgres hostname
    pub host: String,
    /// Postgres port (default: 5432)
    pub port: u16,
    /// Role used to connect
    pub user: String,
    /// Password for the role
    pub password: String,
    /// Database name
    pub database: String,
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DB_HOST` (required): Postgres hostname
    /// - `DB_PORT` (optional, default: 5432): Postgres port
    /// - `DB_USER` (required): Role name
    /// - `DB_PASS` (optional, default: empty): Role password
    /// - `DB_NAME` (required): Database name
    ///
    /// # Errors
    /// Returns an error if required variables are not set.
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("DB_HOST")
            .map_err(|_| "DB_HOST environment variable not set".to_string())?;
        let user = env::var("DB_USER")
            .map_err(|_| "DB_USER environment variable not set".to_string())?;
        let database = env::var("DB_NAME")
            .map_err(|_| "DB_NAME environment variable not set".to_string())?;
        let password = env::var("DB_PASS").unwrap_or_default();
        let port = env::var("DB_PORT")
            .unwrap_or_else(|_| "5432".to_string())
            .parse()
            .map_err(|_| "DB_PORT must be a valid port number".to_string())?;

        Ok(Self {
            host,
            port,
            user,
            password,
            database,
        })
    }

    /// libpq keyword/value connection string.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={} sslmode=disable",
            quote(&self.host),
            self.port,
            quote(&self.user),
            quote(&self.password),
            quote(&self.database),
        )
    }
}

// libpq wants empty values and values with spaces single-quoted.
fn quote(value: &str) -> String {
    if !value.is_empty() && !value.contains([' ', '\'', '\\']) {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}
