use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value;
use tokio_postgres::Statement;

use crate::error::PgHelperError;
use crate::results::Row;
use crate::types::DbValue;

/// Decode driver rows into [`Row`] values, using statement metadata for the
/// column names so zero-row results still carry them.
///
/// Column order is the driver's declaration order and is preserved as-is.
///
/// # Errors
///
/// Returns errors from row value extraction.
pub fn build_rows(
    stmt: &Statement,
    rows: &[tokio_postgres::Row],
) -> Result<Vec<Row>, PgHelperError> {
    let column_names: Arc<Vec<String>> = Arc::new(
        stmt.columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect(),
    );
    let column_count = column_names.len();

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mut values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            values.push(extract_value(row, idx)?);
        }
        out.push(Row::new(Arc::clone(&column_names), values));
    }

    Ok(out)
}

/// Extracts a [`DbValue`] from a `tokio_postgres` row at the given index.
///
/// # Errors
///
/// Returns `PgHelperError` if the column cannot be retrieved.
pub fn extract_value(
    row: &tokio_postgres::Row,
    idx: usize,
) -> Result<DbValue, PgHelperError> {
    let type_info = row.columns()[idx].type_();

    // Dispatch on the column's declared type name. Common types are handled;
    // anything else falls back to text.
    if type_info.name() == "int2" {
        let val: Option<i16> = row.try_get(idx)?;
        Ok(val.map_or(DbValue::Null, |v| DbValue::Int(i64::from(v))))
    } else if type_info.name() == "int4" {
        let val: Option<i32> = row.try_get(idx)?;
        Ok(val.map_or(DbValue::Null, |v| DbValue::Int(i64::from(v))))
    } else if type_info.name() == "int8" {
        let val: Option<i64> = row.try_get(idx)?;
        Ok(val.map_or(DbValue::Null, DbValue::Int))
    } else if type_info.name() == "float4" || type_info.name() == "float8" {
        let val: Option<f64> = row.try_get(idx)?;
        Ok(val.map_or(DbValue::Null, DbValue::Float))
    } else if type_info.name() == "bool" {
        let val: Option<bool> = row.try_get(idx)?;
        Ok(val.map_or(DbValue::Null, DbValue::Bool))
    } else if type_info.name() == "timestamp" || type_info.name() == "timestamptz" {
        let val: Option<NaiveDateTime> = row.try_get(idx)?;
        Ok(val.map_or(DbValue::Null, DbValue::Timestamp))
    } else if type_info.name() == "json" || type_info.name() == "jsonb" {
        let val: Option<Value> = row.try_get(idx)?;
        Ok(val.map_or(DbValue::Null, DbValue::Json))
    } else if type_info.name() == "bytea" {
        let val: Option<Vec<u8>> = row.try_get(idx)?;
        Ok(val.map_or(DbValue::Null, DbValue::Blob))
    } else if type_info.name() == "text"
        || type_info.name() == "varchar"
        || type_info.name() == "char"
    {
        let val: Option<String> = row.try_get(idx)?;
        Ok(val.map_or(DbValue::Null, DbValue::Text))
    } else {
        // For other types, attempt to get as string
        let val: Option<String> = row.try_get(idx)?;
        Ok(val.map_or(DbValue::Null, DbValue::Text))
    }
}
