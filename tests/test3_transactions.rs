use pg_helper::prelude::*;
use pg_helper::test_utils::MemorySource;

use tokio::runtime::Runtime;

fn client_and_source() -> (DbClient<MemorySource>, MemorySource) {
    let source = MemorySource::new();
    (DbClient::new(source.clone()), source)
}

#[test]
fn test3_commit_brackets_statements_on_one_connection()
-> Result<(), Box<dyn std::error::Error>> {
    let (client, source) = client_and_source();

    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let mut session = client.begin_transaction().await?;
        client
            .query(
                "INSERT INTO accounts (name) VALUES ($name)",
                QueryParams::named(NamedParams::new().set("$name", DbValue::Text("a".into()))),
                Some(session.handle_mut()),
            )
            .await?;
        client
            .query(
                "UPDATE accounts SET name = $1",
                QueryParams::positional(vec![DbValue::Text("b".into())]),
                Some(session.handle_mut()),
            )
            .await?;

        // Still open: the session's connection has not been returned.
        assert_eq!(source.released_count(), 0);

        session.commit().await?;
        Ok::<(), PgHelperError>(())
    })?;

    let statements = source.statements();
    let queries: Vec<&str> = statements.iter().map(|s| s.query.as_str()).collect();
    assert_eq!(
        queries,
        vec![
            "BEGIN",
            "INSERT INTO accounts (name) VALUES ($1)",
            "UPDATE accounts SET name = $1",
            "COMMIT",
        ]
    );
    // One physical connection for the whole transaction, released exactly once.
    assert!(statements.iter().all(|s| s.connection == statements[0].connection));
    assert_eq!(source.acquired_count(), 1);
    assert_eq!(source.released_count(), 1);
    Ok(())
}

#[test]
fn test3_rollback_releases_the_connection() -> Result<(), Box<dyn std::error::Error>> {
    let (client, source) = client_and_source();

    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let mut session = client.begin_transaction().await?;
        client
            .query(
                "DELETE FROM accounts",
                QueryParams::None,
                Some(session.handle_mut()),
            )
            .await?;
        session.rollback().await?;
        Ok::<(), PgHelperError>(())
    })?;

    let queries: Vec<String> = source.statements().into_iter().map(|s| s.query).collect();
    assert_eq!(queries, vec!["BEGIN", "DELETE FROM accounts", "ROLLBACK"]);
    assert_eq!(source.acquired_count(), 1);
    assert_eq!(source.released_count(), 1);
    Ok(())
}

#[test]
fn test3_failed_acquisition_leaves_no_session() -> Result<(), Box<dyn std::error::Error>> {
    let (client, source) = client_and_source();
    source.fail_acquire(true);

    let rt = Runtime::new().unwrap();
    let err = rt
        .block_on(async { client.begin_transaction().await })
        .map(|_| ())
        .unwrap_err();

    assert!(matches!(
        err,
        PgHelperError::ConnectionAcquisitionFailed { .. }
    ));
    assert_eq!(source.acquired_count(), 0);
    assert_eq!(source.open_connections(), 0);
    assert!(source.statements().is_empty());
    Ok(())
}

#[test]
fn test3_failed_begin_releases_the_connection() -> Result<(), Box<dyn std::error::Error>> {
    let (client, source) = client_and_source();
    source.fail_queries(true);

    let rt = Runtime::new().unwrap();
    let err = rt
        .block_on(async { client.begin_transaction().await })
        .map(|_| ())
        .unwrap_err();

    assert!(matches!(err, PgHelperError::QueryExecutionFailed { .. }));
    // The checkout happened, BEGIN failed, and the handle went straight back.
    assert_eq!(source.acquired_count(), 1);
    assert_eq!(source.released_count(), 1);
    Ok(())
}

#[test]
fn test3_failed_commit_still_releases() -> Result<(), Box<dyn std::error::Error>> {
    let (client, source) = client_and_source();

    let rt = Runtime::new().unwrap();
    let result = rt.block_on(async {
        let session = client.begin_transaction().await?;
        source.fail_queries(true);
        session.commit().await
    });

    assert!(matches!(
        result,
        Err(PgHelperError::QueryExecutionFailed { .. })
    ));
    assert_eq!(source.acquired_count(), 1);
    assert_eq!(source.released_count(), 1);
    Ok(())
}

#[test]
fn test3_queries_inside_a_session_never_release_it() -> Result<(), Box<dyn std::error::Error>> {
    let (client, source) = client_and_source();

    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let mut session = client.begin_transaction().await?;
        for _ in 0..5 {
            client
                .query("SELECT 1", QueryParams::None, Some(session.handle_mut()))
                .await?;
        }
        assert_eq!(source.acquired_count(), 1);
        assert_eq!(source.released_count(), 0);
        session.commit().await?;
        Ok::<(), PgHelperError>(())
    })?;

    assert_eq!(source.released_count(), 1);
    Ok(())
}
