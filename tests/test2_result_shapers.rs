use pg_helper::prelude::*;
use pg_helper::test_utils::{MemorySource, create_test_row};

use tokio::runtime::Runtime;

fn client_and_source() -> (DbClient<MemorySource>, MemorySource) {
    let source = MemorySource::new();
    (DbClient::new(source.clone()), source)
}

fn user_row(id: i64, name: &str) -> Row {
    create_test_row(
        vec!["id".to_string(), "name".to_string()],
        vec![DbValue::Int(id), DbValue::Text(name.to_string())],
    )
}

#[test]
fn test2_query_multiple_returns_rows_as_is() -> Result<(), Box<dyn std::error::Error>> {
    let (client, source) = client_and_source();
    source.push_rows(vec![user_row(1, "alice"), user_row(2, "bob")]);

    let rt = Runtime::new().unwrap();
    let rows = rt.block_on(async {
        client
            .query_multiple("SELECT id, name FROM users", QueryParams::None, None)
            .await
    })?;

    assert_eq!(rows, vec![user_row(1, "alice"), user_row(2, "bob")]);
    Ok(())
}

#[test]
fn test2_query_single_returns_first_row() -> Result<(), Box<dyn std::error::Error>> {
    let (client, source) = client_and_source();
    source.push_rows(vec![user_row(1, "alice"), user_row(2, "bob")]);

    let rt = Runtime::new().unwrap();
    let row = rt.block_on(async {
        client
            .query_single("SELECT id, name FROM users", QueryParams::None, None)
            .await
    })?;

    assert_eq!(row, Some(user_row(1, "alice")));
    Ok(())
}

#[test]
fn test2_query_single_on_empty_result_is_none_not_error()
-> Result<(), Box<dyn std::error::Error>> {
    let (client, _source) = client_and_source();

    let rt = Runtime::new().unwrap();
    let row = rt.block_on(async {
        client
            .query_single(
                "SELECT id, name FROM users WHERE id = $id",
                QueryParams::named(NamedParams::new().set("$id", DbValue::Int(999))),
                None,
            )
            .await
    })?;

    assert_eq!(row, None);
    Ok(())
}

#[test]
fn test2_query_scalar_takes_first_column_of_first_row()
-> Result<(), Box<dyn std::error::Error>> {
    let (client, source) = client_and_source();
    // Column order is the driver's declaration order, not alphabetical: the
    // scalar must come from "total", the first declared column.
    source.push_rows(vec![create_test_row(
        vec!["total".to_string(), "average".to_string()],
        vec![DbValue::Int(42), DbValue::Float(3.5)],
    )]);

    let rt = Runtime::new().unwrap();
    let value = rt.block_on(async {
        client
            .query_scalar(
                "SELECT count(*) AS total, avg(age) AS average FROM users",
                QueryParams::None,
                None,
            )
            .await
    })?;

    assert_eq!(value, Some(DbValue::Int(42)));
    Ok(())
}

#[test]
fn test2_query_scalar_on_empty_result_is_none() -> Result<(), Box<dyn std::error::Error>> {
    let (client, _source) = client_and_source();

    let rt = Runtime::new().unwrap();
    let value = rt.block_on(async {
        client
            .query_scalar("SELECT id FROM users WHERE false", QueryParams::None, None)
            .await
    })?;

    assert_eq!(value, None);
    Ok(())
}

#[test]
fn test2_query_scalar_preserves_sql_null() -> Result<(), Box<dyn std::error::Error>> {
    let (client, source) = client_and_source();
    source.push_rows(vec![create_test_row(
        vec!["value".to_string()],
        vec![DbValue::Null],
    )]);

    let rt = Runtime::new().unwrap();
    let value = rt.block_on(async {
        client
            .query_scalar("SELECT value FROM settings", QueryParams::None, None)
            .await
    })?;

    // A row came back; its first column happened to be NULL.
    assert_eq!(value, Some(DbValue::Null));
    Ok(())
}

#[test]
fn test2_query_discards_rows() -> Result<(), Box<dyn std::error::Error>> {
    let (client, source) = client_and_source();
    source.push_rows(vec![user_row(1, "alice")]);

    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        client
            .query("DELETE FROM users RETURNING id, name", QueryParams::None, None)
            .await
    })?;

    // The statement still ran exactly once.
    assert_eq!(source.statements().len(), 1);
    Ok(())
}

#[test]
fn test2_row_lookup_by_name_and_index() -> Result<(), Box<dyn std::error::Error>> {
    let row = user_row(7, "carol");
    assert_eq!(row.get("id"), Some(&DbValue::Int(7)));
    assert_eq!(row.get("name"), Some(&DbValue::Text("carol".into())));
    assert_eq!(row.get("missing"), None);
    assert_eq!(row.get_by_index(0), Some(&DbValue::Int(7)));
    assert_eq!(row.get_by_index(5), None);
    assert_eq!(row.column_names(), &["id", "name"][..]);
    Ok(())
}
