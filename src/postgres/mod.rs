// PostgreSQL binding - the one place driver types appear.
//
// Split into sub-modules:
// - params: binding DbValue as tokio-postgres parameters
// - rows: decoding driver rows into Row values
// This file holds the pool wrapper and the pooled-connection handle.

pub mod params;
pub mod rows;

pub use params::PgParams;
pub use rows::build_rows;

use async_trait::async_trait;
use deadpool::managed::PoolConfig;
use deadpool_postgres::{Config as DriverConfig, Object, Runtime, SslMode as DriverSslMode};
use tokio_postgres::NoTls;

use crate::config::{DbConfig, SslMode};
use crate::error::PgHelperError;
use crate::results::Row;
use crate::source::{ConnectionHandle, ConnectionSource};
use crate::types::DbValue;

/// Connection pool for Postgres, wrapping deadpool-postgres.
#[derive(Clone)]
pub struct PgPool {
    pool: deadpool_postgres::Pool,
}

impl PgPool {
    /// Validate the configuration and build the pool.
    ///
    /// The pool enforces the concurrency bound and queues excess acquires;
    /// this crate only checks connections out and returns them.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unusable configuration (including a failing
    /// token provider) or `ConnectionError` if pool creation fails.
    pub fn new(config: &DbConfig) -> Result<Self, PgHelperError> {
        config.validate()?;

        let mut cfg = DriverConfig::new();
        cfg.host = Some(config.host.clone());
        cfg.port = Some(config.port);
        cfg.user = Some(config.user.clone());
        cfg.password = Some(config.credentials.resolve()?);
        cfg.dbname = Some(config.dbname.clone());
        cfg.ssl_mode = Some(match config.ssl_mode {
            SslMode::Disable => DriverSslMode::Disable,
            SslMode::Prefer => DriverSslMode::Prefer,
            SslMode::Require => DriverSslMode::Require,
        });
        cfg.pool = Some(PoolConfig::new(config.pool_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| {
                PgHelperError::ConnectionError(format!("failed to create Postgres pool: {e}"))
            })?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl ConnectionSource for PgPool {
    type Handle = PgConnection;

    async fn acquire(&self) -> Result<PgConnection, PgHelperError> {
        let client = self.pool.get().await.map_err(|e| {
            PgHelperError::ConnectionAcquisitionFailed {
                source: Box::new(PgHelperError::from(e)),
            }
        })?;
        Ok(PgConnection { client })
    }
}

/// A pooled Postgres connection. Dropping it returns the connection to the
/// pool.
pub struct PgConnection {
    client: Object,
}

#[async_trait]
impl ConnectionHandle for PgConnection {
    async fn run(
        &mut self,
        query: &str,
        params: &[DbValue],
    ) -> Result<Vec<Row>, PgHelperError> {
        let stmt = self.client.prepare(query).await?;
        let converted = PgParams::convert(params)?;
        let pg_rows = self.client.query(&stmt, converted.as_refs()).await?;
        build_rows(&stmt, &pg_rows)
    }

    async fn batch(&mut self, sql: &str) -> Result<(), PgHelperError> {
        self.client.batch_execute(sql).await?;
        Ok(())
    }
}
