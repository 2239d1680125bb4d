use thiserror::Error;

use crate::types::DbValue;

/// Boxed error type used at collaborator seams (token providers, test sources).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by pg-helper.
///
/// Nothing is recovered locally: every failure is logged with context and then
/// re-raised so callers can branch on the original cause via
/// [`std::error::Error::source`].
#[derive(Debug, Error)]
pub enum PgHelperError {
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[error(transparent)]
    PoolError(#[from] deadpool::managed::PoolError<tokio_postgres::Error>),

    /// A named parameter key did not start with `$`. Fatal, raised before any
    /// database interaction.
    #[error("invalid parameter name {name:?}: named parameters must start with '$'")]
    InvalidParameterName { name: String },

    /// The connection source could not yield a connection (pool exhausted or
    /// backend unreachable). No retry is attempted.
    #[error("failed to acquire a database connection")]
    ConnectionAcquisitionFailed {
        #[source]
        source: Box<PgHelperError>,
    },

    /// The database rejected or failed the statement. Carries the transformed
    /// query and its positional parameters for diagnosability.
    #[error("query execution failed: {query}")]
    QueryExecutionFailed {
        query: String,
        params: Vec<DbValue>,
        #[source]
        source: Box<PgHelperError>,
    },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}
