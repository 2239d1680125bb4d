use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use clap::ValueEnum;

use crate::error::{BoxError, PgHelperError};

/// Supplies short-lived authentication tokens (e.g. IAM database auth).
///
/// Token signing lives entirely behind this trait; the crate only asks for a
/// token when the pool is built.
pub trait TokenProvider: Send + Sync {
    /// Produce a token usable as the connection password.
    ///
    /// # Errors
    ///
    /// Implementations report signing failures through the boxed error.
    fn fetch_token(&self) -> Result<String, BoxError>;
}

/// How the connection authenticates: a static password or a token provider.
#[derive(Clone)]
pub enum Credentials {
    Password(String),
    TokenProvider(Arc<dyn TokenProvider>),
}

impl Credentials {
    pub(crate) fn resolve(&self) -> Result<String, PgHelperError> {
        match self {
            Credentials::Password(password) => Ok(password.clone()),
            Credentials::TokenProvider(provider) => provider.fetch_token().map_err(|e| {
                PgHelperError::ConfigError(format!("token provider failed: {e}"))
            }),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Password(_) => f.write_str("Password(<redacted>)"),
            Credentials::TokenProvider(_) => f.write_str("TokenProvider(..)"),
        }
    }
}

/// TLS policy plumbed through to the driver configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum SslMode {
    /// Never use TLS.
    Disable,
    /// Use TLS if the server supports it.
    #[default]
    Prefer,
    /// Refuse to connect without TLS.
    Require,
}

impl FromStr for SslMode {
    type Err = PgHelperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disable" => Ok(SslMode::Disable),
            "prefer" => Ok(SslMode::Prefer),
            "require" => Ok(SslMode::Require),
            other => Err(PgHelperError::ConfigError(format!(
                "unrecognized ssl mode {other:?} (expected disable, prefer, or require)"
            ))),
        }
    }
}

/// Connection target and pool sizing, validated at construction.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub credentials: Credentials,
    pub dbname: String,
    pub ssl_mode: SslMode,
    pub pool_size: usize,
}

const DEFAULT_PORT: u16 = 5432;
const DEFAULT_POOL_SIZE: usize = 16;

impl DbConfig {
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        credentials: Credentials,
        dbname: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            user: user.into(),
            credentials,
            dbname: dbname.into(),
            ssl_mode: SslMode::default(),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_ssl_mode(mut self, ssl_mode: SslMode) -> Self {
        self.ssl_mode = ssl_mode;
        self
    }

    #[must_use]
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Build a configuration from `DB_HOST`, `DB_PORT`, `DB_USER`,
    /// `DB_PASSWORD`, `DB_NAME`, `DB_SSL_MODE`, and `DB_POOL_SIZE`.
    /// Port, ssl mode, and pool size fall back to defaults when unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, PgHelperError> {
        let host = required_env("DB_HOST")?;
        let user = required_env("DB_USER")?;
        let password = required_env("DB_PASSWORD")?;
        let dbname = required_env("DB_NAME")?;

        let port = match env::var("DB_PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|e| {
                PgHelperError::ConfigError(format!("DB_PORT {raw:?} is not a port number: {e}"))
            })?,
            Err(_) => DEFAULT_PORT,
        };
        let ssl_mode = match env::var("DB_SSL_MODE") {
            Ok(raw) => raw.parse::<SslMode>()?,
            Err(_) => SslMode::default(),
        };
        let pool_size = match env::var("DB_POOL_SIZE") {
            Ok(raw) => raw.parse::<usize>().map_err(|e| {
                PgHelperError::ConfigError(format!("DB_POOL_SIZE {raw:?} is not a count: {e}"))
            })?,
            Err(_) => DEFAULT_POOL_SIZE,
        };

        let config = Self {
            host,
            port,
            user,
            credentials: Credentials::Password(password),
            dbname,
            ssl_mode,
            pool_size,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that every required field is usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` naming the first missing or invalid field.
    pub fn validate(&self) -> Result<(), PgHelperError> {
        if self.host.is_empty() {
            return Err(PgHelperError::ConfigError("host is required".to_string()));
        }
        if self.port == 0 {
            return Err(PgHelperError::ConfigError("port is required".to_string()));
        }
        if self.user.is_empty() {
            return Err(PgHelperError::ConfigError("user is required".to_string()));
        }
        if self.dbname.is_empty() {
            return Err(PgHelperError::ConfigError("dbname is required".to_string()));
        }
        if self.pool_size == 0 {
            return Err(PgHelperError::ConfigError(
                "pool_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn required_env(key: &str) -> Result<String, PgHelperError> {
    env::var(key).map_err(|_| PgHelperError::ConfigError(format!("{key} is required")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> DbConfig {
        DbConfig::new(
            "localhost",
            "app",
            Credentials::Password("secret".into()),
            "app_db",
        )
    }

    #[test]
    fn defaults_are_filled_in() {
        let config = base_config();
        assert_eq!(config.port, 5432);
        assert_eq!(config.ssl_mode, SslMode::Prefer);
        assert_eq!(config.pool_size, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_host_is_rejected() {
        let mut config = base_config();
        config.host = String::new();
        assert!(matches!(
            config.validate(),
            Err(PgHelperError::ConfigError(msg)) if msg.contains("host")
        ));
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let config = base_config().with_pool_size(0);
        assert!(matches!(
            config.validate(),
            Err(PgHelperError::ConfigError(msg)) if msg.contains("pool_size")
        ));
    }

    #[test]
    fn ssl_mode_parses_case_insensitively() {
        assert_eq!("REQUIRE".parse::<SslMode>().unwrap(), SslMode::Require);
        assert_eq!("disable".parse::<SslMode>().unwrap(), SslMode::Disable);
        assert!("mystery".parse::<SslMode>().is_err());
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let rendered = format!("{:?}", base_config());
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("redacted"));
    }
}
