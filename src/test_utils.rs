//! In-memory connection source for exercising executor and transaction
//! semantics without a running server. Enabled with the `test-utils` feature.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::PgHelperError;
use crate::results::Row;
use crate::source::{ConnectionHandle, ConnectionSource};
use crate::types::DbValue;

/// One statement as it reached a connection: which connection ran it, the SQL
/// after transformation, and the positional parameters it was bound with.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStatement {
    pub connection: usize,
    pub query: String,
    pub params: Vec<DbValue>,
}

#[derive(Default)]
struct MemoryState {
    scripted: Mutex<VecDeque<Vec<Row>>>,
    statements: Mutex<Vec<RecordedStatement>>,
    acquired: AtomicUsize,
    released: AtomicUsize,
    fail_acquire: AtomicBool,
    fail_queries: AtomicBool,
}

/// A scripted [`ConnectionSource`]: hands out numbered connections, records
/// every statement, and counts checkouts and returns.
///
/// Results are scripted with [`push_rows`](MemorySource::push_rows) and
/// consumed first-in-first-out; a statement with nothing scripted returns an
/// empty row list.
#[derive(Clone, Default)]
pub struct MemorySource {
    state: Arc<MemoryState>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the row list the next statement will return.
    pub fn push_rows(&self, rows: Vec<Row>) {
        self.state
            .scripted
            .lock()
            .expect("scripted lock poisoned")
            .push_back(rows);
    }

    /// Make subsequent acquisitions fail (pool exhausted / backend down).
    pub fn fail_acquire(&self, fail: bool) {
        self.state.fail_acquire.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent statements fail after being recorded.
    pub fn fail_queries(&self, fail: bool) {
        self.state.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Every statement run so far, in issuance order.
    #[must_use]
    pub fn statements(&self) -> Vec<RecordedStatement> {
        self.state
            .statements
            .lock()
            .expect("statements lock poisoned")
            .clone()
    }

    #[must_use]
    pub fn acquired_count(&self) -> usize {
        self.state.acquired.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn released_count(&self) -> usize {
        self.state.released.load(Ordering::SeqCst)
    }

    /// Connections currently checked out (acquired minus released).
    #[must_use]
    pub fn open_connections(&self) -> usize {
        self.acquired_count() - self.released_count()
    }
}

#[async_trait]
impl ConnectionSource for MemorySource {
    type Handle = MemoryConnection;

    async fn acquire(&self) -> Result<MemoryConnection, PgHelperError> {
        if self.state.fail_acquire.load(Ordering::SeqCst) {
            return Err(PgHelperError::ConnectionAcquisitionFailed {
                source: Box::new(PgHelperError::ConnectionError(
                    "memory source: acquisition disabled".to_string(),
                )),
            });
        }
        let id = self.state.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryConnection {
            id,
            state: Arc::clone(&self.state),
        })
    }
}

/// A checked-out memory connection. Dropping it counts as the release.
pub struct MemoryConnection {
    id: usize,
    state: Arc<MemoryState>,
}

impl MemoryConnection {
    /// The connection's checkout number, stable for its lifetime.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    fn record(&self, query: &str, params: &[DbValue]) {
        self.state
            .statements
            .lock()
            .expect("statements lock poisoned")
            .push(RecordedStatement {
                connection: self.id,
                query: query.to_owned(),
                params: params.to_vec(),
            });
    }
}

#[async_trait]
impl ConnectionHandle for MemoryConnection {
    async fn run(
        &mut self,
        query: &str,
        params: &[DbValue],
    ) -> Result<Vec<Row>, PgHelperError> {
        self.record(query, params);
        if self.state.fail_queries.load(Ordering::SeqCst) {
            return Err(PgHelperError::ExecutionError(
                "memory source: statement failure requested".to_string(),
            ));
        }
        Ok(self
            .state
            .scripted
            .lock()
            .expect("scripted lock poisoned")
            .pop_front()
            .unwrap_or_default())
    }

    async fn batch(&mut self, sql: &str) -> Result<(), PgHelperError> {
        self.record(sql, &[]);
        if self.state.fail_queries.load(Ordering::SeqCst) {
            return Err(PgHelperError::ExecutionError(
                "memory source: statement failure requested".to_string(),
            ));
        }
        Ok(())
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.state.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Build a row for expected-value assertions.
#[must_use]
pub fn create_test_row(column_names: Vec<String>, values: Vec<DbValue>) -> Row {
    Row::new(Arc::new(column_names), values)
}
