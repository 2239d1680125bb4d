use tracing::{debug, error};

use crate::config::DbConfig;
use crate::error::PgHelperError;
use crate::postgres::PgPool;
use crate::results::Row;
use crate::source::{ConnectionHandle, ConnectionSource};
use crate::transform::transform;
use crate::types::{DbValue, QueryParams};

/// Query executor over an explicitly owned connection source.
///
/// Every operation takes an optional connection handle. With `None`, the call
/// checks a connection out, uses it, and returns it on every exit path. With
/// `Some(handle)` (a transaction's connection), the handle stays with the
/// caller and is never released here.
///
/// ```rust,no_run
/// use pg_helper::prelude::*;
///
/// # async fn example() -> Result<(), PgHelperError> {
/// let config = DbConfig::from_env()?;
/// let client = DbClient::connect(&config)?;
///
/// let params = NamedParams::new().set("$name", DbValue::Text("alice".into()));
/// let user = client
///     .query_single(
///         "SELECT id, email FROM users WHERE name = $name",
///         QueryParams::named(params),
///         None,
///     )
///     .await?;
/// # let _ = user;
/// # Ok(())
/// # }
/// ```
pub struct DbClient<S: ConnectionSource> {
    source: S,
}

impl DbClient<PgPool> {
    /// Build a client over a fresh Postgres pool.
    ///
    /// # Errors
    ///
    /// Returns configuration or pool-creation failures from [`PgPool::new`].
    pub fn connect(config: &DbConfig) -> Result<Self, PgHelperError> {
        Ok(Self::new(PgPool::new(config)?))
    }
}

impl<S: ConnectionSource> DbClient<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Execute and return all rows, in driver order.
    ///
    /// # Errors
    ///
    /// See [`DbClient::execute`].
    pub async fn query_multiple(
        &self,
        query: &str,
        params: QueryParams,
        conn: Option<&mut S::Handle>,
    ) -> Result<Vec<Row>, PgHelperError> {
        self.execute(query, params, conn).await
    }

    /// Execute for effect, discarding any returned rows.
    ///
    /// # Errors
    ///
    /// See [`DbClient::execute`].
    pub async fn query(
        &self,
        query: &str,
        params: QueryParams,
        conn: Option<&mut S::Handle>,
    ) -> Result<(), PgHelperError> {
        self.execute(query, params, conn).await.map(|_| ())
    }

    /// Execute and return the first row, or `None` on an empty result.
    /// An empty result is not an error.
    ///
    /// # Errors
    ///
    /// See [`DbClient::execute`].
    pub async fn query_single(
        &self,
        query: &str,
        params: QueryParams,
        conn: Option<&mut S::Handle>,
    ) -> Result<Option<Row>, PgHelperError> {
        let rows = self.execute(query, params, conn).await?;
        Ok(rows.into_iter().next())
    }

    /// Execute and return the first column of the first row, in the driver's
    /// column-declaration order. `None` means no row came back; a SQL NULL in
    /// the first column is `Some(DbValue::Null)`.
    ///
    /// # Errors
    ///
    /// See [`DbClient::execute`].
    pub async fn query_scalar(
        &self,
        query: &str,
        params: QueryParams,
        conn: Option<&mut S::Handle>,
    ) -> Result<Option<DbValue>, PgHelperError> {
        let rows = self.execute(query, params, conn).await?;
        Ok(rows
            .first()
            .map(|row| row.get_by_index(0).cloned().unwrap_or(DbValue::Null)))
    }

    /// The shared execution path: transform, then run on the given or an
    /// acquired connection.
    ///
    /// The transformer runs first, before any database interaction, so an
    /// invalid parameter name never touches the pool.
    ///
    /// # Errors
    ///
    /// [`PgHelperError::InvalidParameterName`] from the transformer,
    /// [`PgHelperError::ConnectionAcquisitionFailed`] when no handle was
    /// supplied and checkout fails, or [`PgHelperError::QueryExecutionFailed`]
    /// carrying the transformed query and parameters when the statement fails.
    pub async fn execute(
        &self,
        query: &str,
        params: QueryParams,
        conn: Option<&mut S::Handle>,
    ) -> Result<Vec<Row>, PgHelperError> {
        let (sql, positional) = transform(query, params)?;
        debug!(query = %sql, params = positional.len(), "executing query");

        match conn {
            Some(handle) => run_query(handle, sql, positional).await,
            None => {
                let mut handle = self.acquire().await?;
                // Returned to the source when `handle` drops, error or not.
                run_query(&mut handle, sql, positional).await
            }
        }
    }

    /// Run a multi-statement script with no parameters, with the same
    /// connection-ownership semantics as [`DbClient::execute`].
    ///
    /// # Errors
    ///
    /// Acquisition or execution failures, as for [`DbClient::execute`].
    pub async fn execute_batch(
        &self,
        sql: &str,
        conn: Option<&mut S::Handle>,
    ) -> Result<(), PgHelperError> {
        match conn {
            Some(handle) => run_batch(handle, sql).await,
            None => {
                let mut handle = self.acquire().await?;
                run_batch(&mut handle, sql).await
            }
        }
    }

    pub(crate) async fn acquire(&self) -> Result<S::Handle, PgHelperError> {
        self.source.acquire().await.map_err(|e| {
            error!(error = %e, "connection acquisition failed");
            e
        })
    }
}

async fn run_query<H: ConnectionHandle>(
    handle: &mut H,
    sql: String,
    params: Vec<DbValue>,
) -> Result<Vec<Row>, PgHelperError> {
    match handle.run(&sql, &params).await {
        Ok(rows) => Ok(rows),
        Err(source) => {
            error!(query = %sql, error = %source, "query execution failed");
            Err(PgHelperError::QueryExecutionFailed {
                query: sql,
                params,
                source: Box::new(source),
            })
        }
    }
}

async fn run_batch<H: ConnectionHandle>(
    handle: &mut H,
    sql: &str,
) -> Result<(), PgHelperError> {
    match handle.batch(sql).await {
        Ok(()) => Ok(()),
        Err(source) => {
            error!(query = %sql, error = %source, "batch execution failed");
            Err(PgHelperError::QueryExecutionFailed {
                query: sql.to_owned(),
                params: Vec::new(),
                source: Box::new(source),
            })
        }
    }
}
