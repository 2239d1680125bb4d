use tracing::error;

use crate::error::PgHelperError;
use crate::executor::DbClient;
use crate::source::{ConnectionHandle, ConnectionSource};

/// One open database transaction: a connection handle checked out for the
/// duration, plus the statements bracketing it.
///
/// Every query issued inside the transaction must be passed
/// [`TransactionSession::handle_mut`] explicitly; there is no ambient
/// transaction context. [`commit`](TransactionSession::commit) and
/// [`rollback`](TransactionSession::rollback) consume the session, so a
/// committed or rolled-back session cannot be used again (it no longer
/// exists). Rolling back on failure between begin and commit is the caller's
/// decision; nothing here rolls back implicitly.
pub struct TransactionSession<H: ConnectionHandle> {
    handle: H,
}

impl<S: ConnectionSource> DbClient<S> {
    /// Check out a connection and open a transaction on it.
    ///
    /// # Errors
    ///
    /// Acquisition or `BEGIN` failures surface as their respective errors; in
    /// both cases no session exists and no connection is leaked (an acquired
    /// handle is returned to the source by drop).
    pub async fn begin_transaction(
        &self,
    ) -> Result<TransactionSession<S::Handle>, PgHelperError> {
        let mut handle = self.acquire().await?;
        tx_statement(&mut handle, "BEGIN").await?;
        Ok(TransactionSession { handle })
    }
}

impl<H: ConnectionHandle> TransactionSession<H> {
    /// The transaction's connection, to be passed to each query issued within
    /// it so all statements share one physical connection.
    pub fn handle_mut(&mut self) -> &mut H {
        &mut self.handle
    }

    /// Issue `COMMIT`, then release the connection back to its source.
    ///
    /// # Errors
    ///
    /// A failing `COMMIT` is surfaced as [`PgHelperError::QueryExecutionFailed`];
    /// the connection is released regardless.
    pub async fn commit(mut self) -> Result<(), PgHelperError> {
        tx_statement(&mut self.handle, "COMMIT").await
    }

    /// Issue `ROLLBACK`, then release the connection back to its source.
    ///
    /// # Errors
    ///
    /// A failing `ROLLBACK` is surfaced as [`PgHelperError::QueryExecutionFailed`];
    /// the connection is released regardless.
    pub async fn rollback(mut self) -> Result<(), PgHelperError> {
        tx_statement(&mut self.handle, "ROLLBACK").await
    }
}

async fn tx_statement<H: ConnectionHandle>(
    handle: &mut H,
    sql: &str,
) -> Result<(), PgHelperError> {
    match handle.batch(sql).await {
        Ok(()) => Ok(()),
        Err(source) => {
            error!(statement = sql, error = %source, "transaction statement failed");
            Err(PgHelperError::QueryExecutionFailed {
                query: sql.to_owned(),
                params: Vec::new(),
                source: Box::new(source),
            })
        }
    }
}
