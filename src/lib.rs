//! Named-parameter query helper for tokio-postgres.
//!
//! Write SQL with `$name`-style placeholders and bind them by name; the query
//! is rewritten into the positional form the driver understands, including
//! spreading list values into `IN (...)` runs. Results come back in four
//! shapes (all rows, first row, first scalar, or discarded), and connections
//! are checked out of a deadpool pool and returned on every exit path,
//! including across an explicit transaction session.
//!
//! ```rust,no_run
//! use pg_helper::prelude::*;
//!
//! # async fn example() -> Result<(), PgHelperError> {
//! let client = DbClient::connect(&DbConfig::from_env()?)?;
//!
//! let params = NamedParams::new()
//!     .set("$status", DbValue::Text("active".into()))
//!     .set("$ids", vec![DbValue::Int(1), DbValue::Int(2), DbValue::Int(3)]);
//! let rows = client
//!     .query_multiple(
//!         "SELECT * FROM accounts WHERE status = $status AND id IN ($ids)",
//!         QueryParams::named(params),
//!         None,
//!     )
//!     .await?;
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod postgres;
pub mod prelude;
pub mod results;
pub mod source;
pub mod transaction;
pub mod transform;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use config::{Credentials, DbConfig, SslMode, TokenProvider};
pub use error::{BoxError, PgHelperError};
pub use executor::DbClient;
pub use postgres::{PgConnection, PgPool};
pub use results::Row;
pub use source::{ConnectionHandle, ConnectionSource};
pub use transaction::TransactionSession;
pub use transform::transform;
pub use types::{DbValue, NamedParams, ParamValue, QueryParams};
