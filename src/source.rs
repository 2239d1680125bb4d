use async_trait::async_trait;

use crate::error::PgHelperError;
use crate::results::Row;
use crate::types::DbValue;

/// One checked-out connection: an exclusive borrow from a [`ConnectionSource`].
///
/// Dropping the handle returns the connection to its source. That is the whole
/// release contract: release happens exactly once, on every exit path, without
/// any cleanup code at call sites.
#[async_trait]
pub trait ConnectionHandle: Send {
    /// Run a single statement with positional parameters and return its rows
    /// in driver order. DML statements return an empty row list.
    async fn run(
        &mut self,
        query: &str,
        params: &[DbValue],
    ) -> Result<Vec<Row>, PgHelperError>;

    /// Run a multi-statement script with no parameters.
    async fn batch(&mut self, sql: &str) -> Result<(), PgHelperError>;
}

/// The pool contract this crate consumes. Pooling policy (maximum size,
/// queueing of excess acquires, timeouts) belongs to the implementation, not
/// to the callers of this trait.
#[async_trait]
pub trait ConnectionSource: Send + Sync {
    type Handle: ConnectionHandle + Send;

    /// Check out a connection.
    ///
    /// # Errors
    ///
    /// Returns [`PgHelperError::ConnectionAcquisitionFailed`] when the source
    /// cannot yield a connection.
    async fn acquire(&self) -> Result<Self::Handle, PgHelperError>;
}
