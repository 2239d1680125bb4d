//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::{Credentials, DbConfig, SslMode, TokenProvider};
pub use crate::error::PgHelperError;
pub use crate::executor::DbClient;
pub use crate::postgres::{PgConnection, PgPool};
pub use crate::results::Row;
pub use crate::source::{ConnectionHandle, ConnectionSource};
pub use crate::transaction::TransactionSession;
pub use crate::transform::transform;
pub use crate::types::{DbValue, NamedParams, ParamValue, QueryParams};
